//! Correlation middleware.
//!
//! Per request: resolve the correlation identifier, bind a request-local
//! logger carrying it, attach the logger to the request context, dispatch.
//! Nothing in here can fail the request, and nothing in here logs through the
//! request logger.

use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, Request},
    middleware::Next,
    response::Response,
};

use crate::config::LoggingConfig;
use crate::context::{self, RequestContext};
use crate::http::request::resolve_correlation_id;
use crate::logging::{Logger, LoggerRegistry, Severity};
use crate::observability::metrics;

/// Subsystem and threshold request loggers are bound with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerBinding {
    pub subsystem: String,
    pub level: Severity,
}

impl LoggerBinding {
    pub fn new(subsystem: impl Into<String>, level: Severity) -> Self {
        Self {
            subsystem: subsystem.into(),
            level,
        }
    }

    /// Resolve the binding from configuration; a bad level becomes `Info`.
    pub fn from_config(config: &LoggingConfig) -> Self {
        Self::new(config.subsystem.clone(), Severity::parse_or_default(&config.level))
    }
}

/// State shared by every invocation of [`correlation_middleware`].
#[derive(Clone)]
pub struct CorrelationState {
    registry: LoggerRegistry,
    header: HeaderName,
    binding: Arc<ArcSwap<LoggerBinding>>,
}

impl CorrelationState {
    pub fn new(
        registry: LoggerRegistry,
        header: HeaderName,
        binding: Arc<ArcSwap<LoggerBinding>>,
    ) -> Self {
        Self {
            registry,
            header,
            binding,
        }
    }

    pub fn header(&self) -> &HeaderName {
        &self.header
    }

    /// Acquire the subsystem logger, apply the configured threshold and give
    /// this request its own copy carrying `correlation_id`.
    ///
    /// The binding is re-read after applying it, so a concurrent admin change
    /// or reload cannot be overwritten with a stale threshold.
    pub fn bind_logger(&self, correlation_id: &str) -> Logger {
        let mut binding = self.binding.load_full();
        loop {
            let logger = self.registry.get_logger(&binding.subsystem, binding.level);
            if logger.level() != binding.level {
                logger.set_level(binding.level);
            }
            let current = self.binding.load_full();
            if Arc::ptr_eq(&current, &binding) {
                return logger.with_correlation_id(correlation_id);
            }
            binding = current;
        }
    }
}

/// Resolve, bind, attach, dispatch.
pub async fn correlation_middleware(
    State(state): State<CorrelationState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let (correlation_id, source) = resolve_correlation_id(request.headers_mut(), &state.header);
    metrics::record_correlation_id(source.as_str());

    let logger = state.bind_logger(&correlation_id);
    let ctx = request
        .extensions()
        .get::<RequestContext>()
        .cloned()
        .unwrap_or_default()
        .attach(logger);
    request.extensions_mut().insert(ctx.clone());

    context::scope(ctx, next.run(request)).await
}
