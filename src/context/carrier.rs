//! Immutable request-scoped value carrier.

use std::fmt;
use std::sync::Arc;

use axum::http::Extensions;

use crate::logging::{
    Logger, LoggerRegistry, LoggingError, Severity, DEFAULT_SUBSYSTEM,
};

/// Private key type: only this module can bind or read the request logger.
#[derive(Clone)]
struct BoundLogger(Logger);

/// Typed, chainable association of values with one request.
///
/// Values are keyed by type. Adding a value returns a new carrier that
/// inherits everything from its parent; the parent is never modified.
#[derive(Clone, Default)]
pub struct RequestContext {
    values: Arc<Extensions>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a child carrying `value`, replacing any value of the same type.
    pub fn with_value<T: Clone + Send + Sync + 'static>(&self, value: T) -> Self {
        let mut values = Extensions::clone(&self.values);
        values.insert(value);
        Self {
            values: Arc::new(values),
        }
    }

    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.values.get::<T>()
    }

    /// Derive a child with `logger` bound as the request logger.
    pub fn attach(&self, logger: Logger) -> Self {
        self.with_value(BoundLogger(logger))
    }

    /// The bound request logger, if any.
    pub fn retrieve(&self) -> Option<&Logger> {
        self.get::<BoundLogger>().map(|bound| &bound.0)
    }

    /// Like [`RequestContext::retrieve`], reporting absence as an error.
    pub fn try_logger(&self) -> Result<&Logger, LoggingError> {
        self.retrieve().ok_or(LoggingError::ContextMissingLogger)
    }

    /// The bound logger, or `subsystem`'s logger from `registry` when none is
    /// bound. Never fails.
    pub fn logger_or(&self, registry: &LoggerRegistry, subsystem: &str) -> Logger {
        match self.try_logger() {
            Ok(logger) => logger.clone(),
            Err(e) => {
                tracing::debug!(error = %e, subsystem, "Falling back to registry logger");
                registry.get_logger(subsystem, Severity::Info)
            }
        }
    }

    /// The bound logger, or the global default logger.
    pub fn logger(&self) -> Logger {
        self.logger_or(&LoggerRegistry::global(), DEFAULT_SUBSYSTEM)
    }

    /// Correlation identifier of the bound logger.
    pub fn correlation_id(&self) -> Option<&str> {
        self.retrieve().and_then(Logger::correlation_id)
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("logger", &self.retrieve())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::MemorySink;

    #[derive(Clone, Debug, PartialEq)]
    struct Tenant(&'static str);

    fn registry() -> LoggerRegistry {
        LoggerRegistry::new(Arc::new(MemorySink::new()))
    }

    #[test]
    fn test_attach_does_not_mutate_parent() {
        let registry = registry();
        let parent = RequestContext::new();
        let child = parent.attach(
            registry
                .get_logger("nexus", Severity::Info)
                .with_correlation_id("abc-123"),
        );
        assert!(parent.retrieve().is_none());
        assert_eq!(child.correlation_id(), Some("abc-123"));
    }

    #[test]
    fn test_children_inherit_values() {
        let registry = registry();
        let root = RequestContext::new().with_value(Tenant("acme"));
        let child = root.attach(registry.get_logger("nexus", Severity::Info));
        let grandchild = child.with_value(42u32);
        assert_eq!(grandchild.get::<Tenant>(), Some(&Tenant("acme")));
        assert!(grandchild.retrieve().is_some());
        assert_eq!(grandchild.get::<u32>(), Some(&42));
        assert!(child.get::<u32>().is_none());
    }

    #[test]
    fn test_missing_logger_reported_and_recovered() {
        let registry = registry();
        let ctx = RequestContext::new();
        assert_eq!(
            ctx.try_logger().unwrap_err(),
            LoggingError::ContextMissingLogger
        );
        let fallback = ctx.logger_or(&registry, "nexus");
        assert_eq!(fallback.subsystem(), "nexus");
        assert_eq!(fallback.correlation_id(), None);
        assert!(fallback.same_subsystem_state(&registry.get_logger("nexus", Severity::Debug)));
    }

    #[test]
    fn test_global_fallback() {
        let logger = RequestContext::new().logger();
        assert_eq!(logger.subsystem(), DEFAULT_SUBSYSTEM);
    }
}
