//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → middleware/correlation.rs (resolve id, bind logger, attach context)
//!     → handlers.rs (demo routes; RequestLog via extract.rs)
//!     → upstream.rs (outbound call carrying the correlation header)
//!     → response echoes the correlation header
//! ```

pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod request;
pub mod server;
pub mod upstream;

pub use extract::RequestLog;
pub use request::{resolve_correlation_id, IdSource, X_REQUEST_ID};
pub use server::{HttpServer, ServerError};
