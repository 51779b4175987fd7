//! Decides whether a cache entry is complete.
//!
//! An entry is complete iff its metadata record exists, declares a parsable
//! `total_chunks`, and exactly that many chunk records are present.

use tracing::debug;

use crate::metadata::VideoMetadata;
use crate::name::CacheKey;
use crate::store::{ChunkStore, StoreError};

/// Return the entry's metadata if the entry is complete, `None` otherwise.
pub async fn check(
    store: &dyn ChunkStore,
    key: &CacheKey,
) -> Result<Option<VideoMetadata>, StoreError> {
    let Some(fields) = store.get_metadata(key).await? else {
        return Ok(None);
    };

    let Some(metadata) = VideoMetadata::from_fields(&fields) else {
        debug!(key = %key, "Metadata present but total_chunks is missing or unparsable");
        return Ok(None);
    };

    let present = store.chunk_count(key).await?;
    if present != metadata.total_chunks {
        debug!(
            key = %key,
            present,
            declared = metadata.total_chunks,
            "Chunk count does not match metadata"
        );
        return Ok(None);
    }

    Ok(Some(metadata))
}

pub async fn is_complete(store: &dyn ChunkStore, key: &CacheKey) -> Result<bool, StoreError> {
    Ok(check(store, key).await?.is_some())
}
