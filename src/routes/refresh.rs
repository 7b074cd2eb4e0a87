use axum::{extract::State, Json};
use serde::Deserialize;

use crate::refresh::RefreshStatus;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UpdateRefreshRequest {
    pub paused: bool,
}

pub async fn get_refresh_status(State(state): State<AppState>) -> Json<RefreshStatus> {
    Json(state.refresh.status().await)
}

pub async fn update_refresh(
    State(state): State<AppState>,
    Json(payload): Json<UpdateRefreshRequest>,
) -> Json<RefreshStatus> {
    state.refresh.set_paused(payload.paused);
    Json(state.refresh.status().await)
}
