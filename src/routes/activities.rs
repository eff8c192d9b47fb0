use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::state::AppState;
use crate::types::activity::{CanonicalActivity, StreamSet};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/activities", get(list_activities))
        .route("/api/activities/:id/streams", get(activity_streams))
}

async fn list_activities(State(state): State<AppState>) -> Json<Vec<CanonicalActivity>> {
    Json(state.store.activities())
}

async fn activity_streams(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StreamSet>, StatusCode> {
    state
        .store
        .get(&id)
        .map(|stored| Json(stored.streams))
        .ok_or(StatusCode::NOT_FOUND)
}
