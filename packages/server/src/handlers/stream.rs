use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, header},
    response::Response,
};
use tracing::instrument;
use vod_cache::VideoSource;

use super::media::{DEFAULT_CONTENT_TYPE, X_CACHE, cached_response};
use crate::error::AppError;
use crate::extractors::RawVideoName;
use crate::state::AppState;

/// Serve from cache when complete, otherwise proxy origin while caching.
///
/// Byte ranges are not supported, so `Accept-Ranges` is never sent. An origin
/// failure mid-body aborts the response.
#[instrument(skip_all, fields(name = %name))]
pub async fn stream(
    State(state): State<AppState>,
    RawVideoName(name): RawVideoName,
) -> Result<Response, AppError> {
    let video = match state.cache.open(&name).await? {
        VideoSource::Cached(video) => return cached_response(&name, video),
        VideoSource::Origin(video) => video,
    };

    let content_type = video
        .content_type
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

    let mut response = Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CACHE_CONTROL, "no-cache")
        .header(X_CACHE, HeaderValue::from_static("MISS"));
    if let Some(length) = video.content_length {
        response = response.header(header::CONTENT_LENGTH, length);
    }

    response
        .body(Body::from_stream(video.body))
        .map_err(|e| AppError::Internal(e.to_string()))
}
