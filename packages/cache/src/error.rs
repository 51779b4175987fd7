use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum CacheError {
    /// The video identifier cannot be turned into a cache key.
    #[error("Malformed video name '{name}': {reason}")]
    MalformedName { name: String, reason: &'static str },

    /// A complete-looking entry could not be assembled, usually because a
    /// write for the same key raced the read. Callers should fall back to origin.
    #[error("Corrupt cache entry '{key}': {reason}")]
    CorruptCache { key: String, reason: String },

    #[error("Origin unreachable at {url}: {source}")]
    OriginUnreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Origin returned {status} for {url}")]
    OriginNotFound { url: String, status: u16 },

    #[error("Chunk store error: {0}")]
    Store(#[from] StoreError),
}

impl CacheError {
    pub(crate) fn malformed(name: &str, reason: &'static str) -> Self {
        Self::MalformedName {
            name: name.to_string(),
            reason,
        }
    }

    pub(crate) fn corrupt(key: impl ToString, reason: impl Into<String>) -> Self {
        Self::CorruptCache {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether retrying the request against origin is the right reaction.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::CorruptCache { .. } | Self::Store(_))
    }
}
