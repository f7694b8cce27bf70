//! Task-local propagation of the request context.
//!
//! Code running inside [`scope`] can reach the request's logger without the
//! context being passed down explicitly. Spawned tasks do not inherit the
//! scope; wrap their future in [`scope`] again to carry it over.

use std::future::Future;

use crate::context::RequestContext;
use crate::logging::{Logger, LoggerRegistry, DEFAULT_SUBSYSTEM};

tokio::task_local! {
    static CURRENT: RequestContext;
}

/// Run `fut` with `ctx` as the current request context.
pub async fn scope<F: Future>(ctx: RequestContext, fut: F) -> F::Output {
    CURRENT.scope(ctx, fut).await
}

/// The current request context, if running inside [`scope`].
pub fn current() -> Option<RequestContext> {
    CURRENT.try_with(RequestContext::clone).ok()
}

/// The current request's logger, or the global default logger.
pub fn current_logger() -> Logger {
    match current() {
        Some(ctx) => ctx.logger(),
        None => LoggerRegistry::global().get_logger(DEFAULT_SUBSYSTEM, Default::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{MemorySink, Severity};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_scope_exposes_logger() {
        let registry = LoggerRegistry::new(Arc::new(MemorySink::new()));
        let ctx = RequestContext::new().attach(
            registry
                .get_logger("nexus", Severity::Debug)
                .with_correlation_id("scoped-1"),
        );

        let seen = scope(ctx, async {
            tokio::task::yield_now().await;
            current_logger().correlation_id().map(str::to_string)
        })
        .await;

        assert_eq!(seen.as_deref(), Some("scoped-1"));
    }

    #[tokio::test]
    async fn test_outside_scope_falls_back() {
        assert!(current().is_none());
        let logger = current_logger();
        assert_eq!(logger.subsystem(), DEFAULT_SUBSYSTEM);
        assert_eq!(logger.correlation_id(), None);
    }

    #[tokio::test]
    async fn test_nested_scopes() {
        let registry = LoggerRegistry::new(Arc::new(MemorySink::new()));
        let outer = RequestContext::new()
            .attach(registry.get_logger("nexus", Severity::Info).with_correlation_id("outer"));
        let inner = outer
            .attach(registry.get_logger("nexus", Severity::Info).with_correlation_id("inner"));

        scope(outer, async move {
            let nested = scope(inner, async { current_logger().correlation_id().map(str::to_string) }).await;
            assert_eq!(nested.as_deref(), Some("inner"));
            assert_eq!(current_logger().correlation_id(), Some("outer"));
        })
        .await;
    }
}
