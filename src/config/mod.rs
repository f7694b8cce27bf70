//! Service configuration: TOML schema, validation and hot reload.
//!
//! ```text
//! service.toml ──▶ loader (toml + serde defaults) ──▶ validation ──▶ ServiceConfig
//!
//! file modified ──▶ watcher::reload ──▶ [logging] changed? ──▶ mpsc ──▶ HttpServer::apply_config
//! ```
//!
//! Every section has defaults, so an empty file is a valid config. A reload
//! that fails to parse or validate is logged and dropped.

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AdminConfig, ListenerConfig, LogFormat, LoggingConfig, ObservabilityConfig, ServiceConfig,
    TimeoutConfig, UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
