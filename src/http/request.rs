//! Correlation identifier resolution.
//!
//! # Responsibilities
//! - Reuse an inbound identifier verbatim when present and non-empty
//! - Otherwise generate a UUID v4 and write it back onto the request headers
//!
//! # Design Decisions
//! - Inbound values are never validated or normalised
//! - Only an empty or non-UTF-8 value counts as absent and is replaced

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use uuid::Uuid;

/// Default correlation header.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Where a correlation identifier came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdSource {
    Inbound,
    Generated,
}

impl IdSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdSource::Inbound => "inbound",
            IdSource::Generated => "generated",
        }
    }
}

/// Generate a fresh correlation identifier.
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Resolve the correlation identifier for a request, recording a generated
/// one into `headers` under `header`.
pub fn resolve_correlation_id(headers: &mut HeaderMap, header: &HeaderName) -> (String, IdSource) {
    let inbound = headers
        .get(header)
        .and_then(|v| std::str::from_utf8(v.as_bytes()).ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string);
    if let Some(id) = inbound {
        return (id, IdSource::Inbound);
    }

    let generated = generate_correlation_id();
    match HeaderValue::from_str(&generated) {
        Ok(value) => {
            headers.insert(header.clone(), value);
        }
        Err(e) => {
            tracing::warn!(error = %e, header = %header, "Generated correlation id is not a valid header value");
        }
    }
    (generated, IdSource::Generated)
}
