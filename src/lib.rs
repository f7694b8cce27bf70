//! Request-scoped structured logging for HTTP services.
//!
//! Every inbound request gets a correlation identifier and a logger carrying
//! it; any code running on behalf of that request can emit structured records
//! annotated with the identifier and call-site fields.
//!
//! ```
//! use std::sync::Arc;
//! use request_logger::context::RequestContext;
//! use request_logger::fields;
//! use request_logger::logging::{LoggerRegistry, MemorySink, Severity};
//!
//! let sink = MemorySink::new();
//! let registry = LoggerRegistry::new(Arc::new(sink.clone()));
//! let logger = registry
//!     .get_logger("nexus", Severity::Info)
//!     .with_correlation_id("abc-123");
//! let ctx = RequestContext::new().attach(logger);
//!
//! ctx.logger().info(fields! { "data" => "payload" }, "processing {}", &[&"payload"]);
//! assert_eq!(sink.records()[0].correlation_id.as_deref(), Some("abc-123"));
//! ```

// Logging core
pub mod context;
pub mod logging;

// Service glue
pub mod admin;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::ServiceConfig;
pub use context::RequestContext;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use logging::{FieldBag, Logger, LoggerRegistry, Severity};
