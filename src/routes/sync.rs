use std::path::PathBuf;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;
use crate::types::sync::{SyncEvent, SyncOptions, SyncState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/sync", post(start_sync))
        .route("/api/sync/stop", post(stop_sync))
        .route("/api/sync/status", get(sync_status))
}

#[derive(Deserialize, Serialize)]
struct SyncRequest {
    #[serde(default)]
    root_dir: Option<PathBuf>,
    #[serde(flatten)]
    options: SyncOptions,
}

#[derive(Deserialize, Serialize)]
struct SyncStarted {
    pass_id: Uuid,
}

#[derive(Deserialize, Serialize)]
struct StopResponse {
    stopping: bool,
}

#[derive(Deserialize, Serialize)]
struct StatusResponse {
    state: SyncState,
    events: Vec<SyncEvent>,
}

async fn start_sync(
    State(state): State<AppState>,
    Json(request): Json<SyncRequest>,
) -> Result<(StatusCode, Json<SyncStarted>), AppError> {
    let root = request
        .root_dir
        .or_else(|| state.config.default_root.clone())
        .ok_or_else(|| AppError::BadRequest("No root_dir given and no default configured".to_string()))?;

    if !root.is_dir() {
        return Err(AppError::BadRequest(format!("{} is not a directory", root.display())));
    }

    // Events are kept on the syncer; the live channel is not needed here.
    let handle = state.syncer.sync(root, request.options)?;

    Ok((
        StatusCode::ACCEPTED,
        Json(SyncStarted {
            pass_id: handle.pass_id,
        }),
    ))
}

async fn stop_sync(State(state): State<AppState>) -> Json<StopResponse> {
    Json(StopResponse {
        stopping: state.syncer.stop(),
    })
}

async fn sync_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        state: state.syncer.state(),
        events: state.syncer.last_pass(),
    })
}
