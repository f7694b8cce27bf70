//! Demo routes exercising request-scoped logging.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use uuid::Uuid;

use crate::context;
use crate::fields;
use crate::http::extract::RequestLog;
use crate::http::upstream::UpstreamClient;
use crate::log_debug;
use crate::logging::FieldValue;

/// State injected into the demo handlers.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<UpstreamClient>,
    pub calls_per_request: u32,
}

/// Call the upstream API a few times, logging every attempt.
pub async fn fetch_handler(State(state): State<AppState>, log: RequestLog) -> impl IntoResponse {
    for i in 0..state.calls_per_request {
        let unique_id = Uuid::new_v4().to_string();

        match state.upstream.fetch(log.correlation_id()).await {
            Ok(response) => {
                log_debug!(
                    log,
                    {
                        "key1" => "Value1",
                        "iter" => i,
                        "unique_id" => &unique_id,
                        "status" => response.status,
                        "bytes" => response.body_len,
                    },
                    "API response: {}",
                    response.status
                );
            }
            Err(e) => {
                log.error(
                    fields! {
                        "key1" => "Value1",
                        "iter" => i,
                        "unique_id" => &unique_id,
                        "err" => FieldValue::error(&e),
                    },
                    "API call failed: {}",
                    &[&e],
                );
            }
        }

        process_data("customFunction");
    }

    (StatusCode::OK, "API calls and custom function completed")
}

/// Nested work that reaches the request logger through the task scope.
pub fn process_data(data: &str) {
    let log = context::current_logger();
    log.info(
        fields! { "custom_key" => "customValue", "data" => data },
        "Custom function processing data",
        &[],
    );
}

/// Liveness probe.
pub async fn health() -> &'static str {
    "ok"
}
