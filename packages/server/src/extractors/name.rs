use axum::{extract::FromRequestParts, http::request::Parts};
use vod_cache::VideoName;

use crate::error::AppError;

/// Video name taken from the path tail after the route prefix
/// (`/watch/<name>`, `/stream/<name>`), still percent-encoded.
///
/// `axum::extract::Path` decodes its captures, and [`VideoName::parse`]
/// decodes again, so this reads the raw URI path instead.
pub struct RawVideoName(pub VideoName);

impl<S> FromRequestParts<S> for RawVideoName
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = raw_tail(parts.uri.path())
            .ok_or_else(|| AppError::Validation("Video name is required".into()))?;

        let name = VideoName::parse(raw)?;
        Ok(RawVideoName(name))
    }
}

/// Everything after the first path segment, or `None` if that is empty.
fn raw_tail(path: &str) -> Option<&str> {
    path.trim_start_matches('/')
        .split_once('/')
        .map(|(_, tail)| tail)
        .filter(|tail| !tail.is_empty())
}
