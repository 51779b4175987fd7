use axum::body::Body;
use axum::http::{HeaderValue, header};
use axum::response::Response;
use vod_cache::{CachedVideo, VideoName};

use crate::error::AppError;

pub const DEFAULT_CONTENT_TYPE: &str = "video/mp4";
pub const X_CACHE: &str = "x-cache";

/// Stored content type, else one guessed from the extension, else `video/mp4`.
pub fn cached_content_type(name: &VideoName, video: &CachedVideo) -> String {
    video
        .metadata
        .content_type
        .clone()
        .or_else(|| {
            mime_guess::from_path(name.decoded())
                .first()
                .map(|mime| mime.to_string())
        })
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string())
}

/// Full cached payload as a direct media response.
pub fn cached_response(name: &VideoName, video: CachedVideo) -> Result<Response, AppError> {
    let content_type = cached_content_type(name, &video);
    Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, video.payload.len())
        .header(header::CACHE_CONTROL, "no-cache")
        .header(X_CACHE, HeaderValue::from_static("HIT"))
        .body(Body::from(video.payload))
        .map_err(|e| AppError::Internal(e.to_string()))
}
