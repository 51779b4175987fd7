use bytes::{Bytes, BytesMut};
use tracing::debug;

use crate::error::CacheError;
use crate::metadata::VideoMetadata;
use crate::name::CacheKey;
use crate::oracle;
use crate::store::ChunkStore;

/// A fully cached video, reassembled from its chunks.
#[derive(Debug, Clone)]
pub struct CachedVideo {
    pub metadata: VideoMetadata,
    pub payload: Bytes,
}

/// Assemble a complete entry into a single payload.
///
/// Returns `Ok(None)` when the entry is not complete. A chunk that goes missing
/// between the completeness check and the read (a concurrent rewrite) is a
/// [`CacheError::CorruptCache`], never a silently shortened payload.
pub async fn read_complete(
    store: &dyn ChunkStore,
    key: &CacheKey,
) -> Result<Option<CachedVideo>, CacheError> {
    let Some(metadata) = oracle::check(store, key).await? else {
        return Ok(None);
    };

    let mut indices = store.chunk_indices(key).await?;
    indices.sort_unstable();
    indices.dedup();

    for expected in 0..metadata.total_chunks {
        if indices.get(expected as usize) != Some(&expected) {
            return Err(CacheError::corrupt(
                key,
                format!(
                    "chunk {expected} of {} is missing",
                    metadata.total_chunks
                ),
            ));
        }
    }

    let mut chunks = Vec::with_capacity(indices.len());
    for index in 0..metadata.total_chunks {
        let chunk = store.get_chunk(key, index).await?.ok_or_else(|| {
            CacheError::corrupt(key, format!("chunk {index} vanished during read"))
        })?;
        chunks.push(chunk);
    }

    // Sized from what was read; stored totals are only compared against.
    let mut payload = BytesMut::with_capacity(chunks.iter().map(Bytes::len).sum());
    for chunk in &chunks {
        payload.extend_from_slice(chunk);
    }

    if let Some(expected) = metadata.total_bytes
        && payload.len() as u64 != expected
    {
        return Err(CacheError::corrupt(
            key,
            format!("assembled {} bytes, expected {expected}", payload.len()),
        ));
    }

    debug!(
        key = %key,
        chunks = metadata.total_chunks,
        bytes = payload.len(),
        "Assembled cached video"
    );

    Ok(Some(CachedVideo {
        metadata,
        payload: payload.freeze(),
    }))
}
