//! Failure modes of the logging core.
//!
//! None of these ever reaches the operation being logged. Each has a fixed
//! recovery applied at the point where it is detected.

use thiserror::Error;

/// Errors produced inside the logging core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoggingError {
    /// A configured severity name did not match any known level.
    /// Recovered by falling back to `Info`.
    #[error("invalid log level {0:?} (expected DEBUG, INFO, WARN or ERROR)")]
    InvalidLevel(String),

    /// No logger was bound to the request context.
    /// Recovered by using the registry's default logger.
    #[error("no logger bound to the request context")]
    ContextMissingLogger,

    /// Placeholder count and argument count disagree.
    /// Recovered by emitting the raw template with a failure marker.
    #[error("template expects {expected} argument(s), {supplied} supplied")]
    TemplateRender { expected: usize, supplied: usize },
}
