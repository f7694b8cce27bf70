use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::admin::AdminState;
use crate::http::middleware::LoggerBinding;
use crate::logging::Severity;
use crate::observability::metrics;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LevelEntry {
    pub subsystem: String,
    pub level: Severity,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetLevelRequest {
    pub level: String,
}

pub async fn get_status() -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    })
}

pub async fn list_levels(State(state): State<AdminState>) -> Json<Vec<LevelEntry>> {
    Json(
        state
            .registry
            .levels()
            .into_iter()
            .map(|(subsystem, level)| LevelEntry { subsystem, level })
            .collect(),
    )
}

pub async fn set_level(
    State(state): State<AdminState>,
    Path(subsystem): Path<String>,
    Json(body): Json<SetLevelRequest>,
) -> Result<Json<LevelEntry>, (StatusCode, String)> {
    let level = Severity::parse(&body.level).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    if !state.registry.contains(&subsystem) {
        return Err((
            StatusCode::NOT_FOUND,
            format!("unknown subsystem {:?}", subsystem),
        ));
    }

    // Binding first: requests re-apply it, and re-check it after doing so.
    if state.binding.load().subsystem == subsystem {
        state
            .binding
            .store(Arc::new(LoggerBinding::new(subsystem.clone(), level)));
    }
    state.registry.set_level(&subsystem, level);

    metrics::record_level_change(&subsystem);
    tracing::info!(subsystem = %subsystem, level = %level, "Log level changed via admin API");

    Ok(Json(LevelEntry { subsystem, level }))
}
