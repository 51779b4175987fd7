use async_trait::async_trait;
use bytes::Bytes;

use super::error::StoreError;
use crate::metadata::MetadataFields;
use crate::name::CacheKey;

/// Key-value backing store for per-video chunks and metadata.
///
/// Implementations must support concurrent operations on different keys. No
/// ordering is promised between concurrent writers of the same key.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Write (or overwrite) one chunk.
    async fn put_chunk(&self, key: &CacheKey, index: u64, data: Bytes) -> Result<(), StoreError>;

    /// Read one chunk, `None` if it is not present.
    async fn get_chunk(&self, key: &CacheKey, index: u64) -> Result<Option<Bytes>, StoreError>;

    /// Indices of all chunks present for `key`, in no particular order.
    async fn chunk_indices(&self, key: &CacheKey) -> Result<Vec<u64>, StoreError>;

    /// Number of chunk records present, observed at a single point in time.
    async fn chunk_count(&self, key: &CacheKey) -> Result<u64, StoreError>;

    /// The metadata record, `None` if no record exists.
    async fn get_metadata(&self, key: &CacheKey) -> Result<Option<MetadataFields>, StoreError>;

    async fn put_metadata(&self, key: &CacheKey, fields: &MetadataFields)
    -> Result<(), StoreError>;

    /// Remove every chunk and the metadata record of `key`.
    async fn clear(&self, key: &CacheKey) -> Result<(), StoreError>;

    /// Check connectivity.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Release the underlying connection. Later operations fail with [`StoreError::Closed`].
    async fn close(&self) {}
}
