//! Request-scoped context propagation.
//!
//! # Data Flow
//! ```text
//! correlation middleware
//!     → RequestContext::attach(logger)     (carrier.rs)
//!     → request extensions                 (handlers: RequestLog extractor)
//!     → task-local scope around dispatch   (scope.rs: current_logger())
//! ```
//!
//! # Design Decisions
//! - The carrier is immutable; deriving a child never touches the parent
//! - The logger lives under a private key type, not a string key
//! - Absence is explicit and always recoverable through the registry

pub mod carrier;
pub mod scope;

pub use carrier::RequestContext;
pub use scope::{current, current_logger, scope};
