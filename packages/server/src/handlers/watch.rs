use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
};
use tracing::{instrument, warn};

use super::media::cached_response;
use crate::error::AppError;
use crate::extractors::RawVideoName;
use crate::pages;
use crate::state::AppState;

/// Cached videos are served directly; anything else gets a player page
/// backed by the stream endpoint.
#[instrument(skip_all, fields(name = %name))]
pub async fn watch(
    State(state): State<AppState>,
    RawVideoName(name): RawVideoName,
) -> Result<Response, AppError> {
    match state.cache.read_complete(&name).await {
        Ok(Some(video)) => return cached_response(&name, video),
        Ok(None) => {}
        Err(e) if e.is_retryable() => {
            warn!(error = %e, "Cache lookup failed, serving player page");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(Html(pages::player_page(&name)).into_response())
}
