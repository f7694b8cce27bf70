//! Structured logging core.
//!
//! # Data Flow
//! ```text
//! call site
//!     → FieldBag (fields.rs) + message template
//!     → Logger (logger.rs): threshold check, base fields merged on top
//!     → Record (sink.rs)
//!     → Sink: TracingSink (process subscriber) | MemorySink (tests)
//!
//! acquisition:
//!     LoggerRegistry (registry.rs): subsystem name → shared state
//!     → per-request clone carries the correlation identifier
//! ```
//!
//! # Design Decisions
//! - Threshold is shared per subsystem; correlation identifier is per value
//! - Disabled levels do no rendering or merging
//! - Logging failures degrade to a best-effort record, never an error

pub mod error;
pub mod fields;
pub mod level;
pub mod logger;
pub mod registry;
pub mod sink;
pub mod template;

pub use error::LoggingError;
pub use fields::{FieldBag, FieldValue};
pub use level::Severity;
pub use logger::Logger;
pub use registry::LoggerRegistry;
pub use sink::{MemorySink, Record, Sink, TracingSink};

/// Field name of the subsystem base field.
pub const SUBSYSTEM_KEY: &str = "subsystem";

/// Field name of the correlation identifier base field.
pub const CORRELATION_ID_KEY: &str = "correlation_id";

/// Subsystem used when no logger is bound to a request.
pub const DEFAULT_SUBSYSTEM: &str = "nexus";

/// Emit through a logger at `level`, building fields and formatting only when
/// the level is enabled.
///
/// ```
/// use std::sync::Arc;
/// use request_logger::logging::{Logger, MemorySink, Severity};
///
/// let sink = MemorySink::new();
/// let log = Logger::new("nexus", Severity::Info, Arc::new(sink.clone()));
/// request_logger::log_at!(log, Severity::Info, { "iter" => 1 }, "call {} done", 1);
/// request_logger::log_at!(log, Severity::Debug, "never rendered");
/// assert_eq!(sink.len(), 1);
/// ```
#[macro_export]
macro_rules! log_at {
    ($logger:expr, $level:expr, { $($key:expr => $value:expr),* $(,)? }, $($arg:tt)+) => {{
        let logger = &$logger;
        let level = $level;
        if logger.enabled(level) {
            logger.emit_fmt(level, $crate::fields! { $($key => $value),* }, format_args!($($arg)+));
        }
    }};
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $crate::log_at!($logger, $level, {}, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log_at!($logger, $crate::logging::Severity::Debug, $($rest)+)
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log_at!($logger, $crate::logging::Severity::Info, $($rest)+)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log_at!($logger, $crate::logging::Severity::Warn, $($rest)+)
    };
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log_at!($logger, $crate::logging::Severity::Error, $($rest)+)
    };
}
