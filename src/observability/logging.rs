//! Process log subscriber setup.
//!
//! # Responsibilities
//! - Install the global `tracing` subscriber
//! - Derive the default filter from the configured request log level
//! - Select pretty or JSON output
//!
//! Request records reach the subscriber through `TracingSink` under the
//! `request_log` target. Their threshold is enforced by the loggers
//! themselves, so that target is always let through at debug.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};
use crate::logging::Severity;

/// Filter directives used when `RUST_LOG` is not set.
pub fn default_directives(level: Severity) -> String {
    let level = level.as_str().to_ascii_lowercase();
    format!("request_log=debug,request_logger={level},tower_http={level}")
}

/// Install the global subscriber.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    let level = Severity::parse_or_default(&config.level);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    let (json, pretty) = match config.format {
        LogFormat::Json => (Some(fmt::layer().json()), None),
        LogFormat::Pretty => (None, Some(fmt::layer())),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .try_init()
}
