use axum::{Json, extract::State};
use serde::Serialize;
use tracing::warn;
use vod_cache::store::ChunkStore;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// `"up"` or `"down"`. A down store only disables caching.
    pub store: &'static str,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = match state.cache.store().ping().await {
        Ok(()) => "up",
        Err(e) => {
            warn!(error = %e, "Chunk store health check failed");
            "down"
        }
    };
    Json(HealthResponse { status: "ok", store })
}
