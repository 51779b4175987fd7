use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use super::error::StoreError;
use super::traits::ChunkStore;
use crate::metadata::MetadataFields;
use crate::name::CacheKey;

/// Process-local chunk store with the same record layout as the Redis backend.
#[derive(Default)]
pub struct MemoryChunkStore {
    chunks: DashMap<CacheKey, HashMap<u64, Bytes>>,
    metadata: DashMap<CacheKey, MetadataFields>,
    closed: AtomicBool,
}

impl MemoryChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::Acquire) {
            Err(StoreError::Closed)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ChunkStore for MemoryChunkStore {
    async fn put_chunk(&self, key: &CacheKey, index: u64, data: Bytes) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.chunks
            .entry(key.clone())
            .or_default()
            .insert(index, data);
        Ok(())
    }

    async fn get_chunk(&self, key: &CacheKey, index: u64) -> Result<Option<Bytes>, StoreError> {
        self.ensure_open()?;
        Ok(self
            .chunks
            .get(key)
            .and_then(|chunks| chunks.value().get(&index).cloned()))
    }

    async fn chunk_indices(&self, key: &CacheKey) -> Result<Vec<u64>, StoreError> {
        self.ensure_open()?;
        Ok(self
            .chunks
            .get(key)
            .map(|chunks| chunks.value().keys().copied().collect())
            .unwrap_or_default())
    }

    async fn chunk_count(&self, key: &CacheKey) -> Result<u64, StoreError> {
        self.ensure_open()?;
        Ok(self
            .chunks
            .get(key)
            .map(|chunks| chunks.value().len() as u64)
            .unwrap_or(0))
    }

    async fn get_metadata(&self, key: &CacheKey) -> Result<Option<MetadataFields>, StoreError> {
        self.ensure_open()?;
        Ok(self
            .metadata
            .get(key)
            .map(|fields| fields.value().clone())
            .filter(|fields| !fields.is_empty()))
    }

    async fn put_metadata(
        &self,
        key: &CacheKey,
        fields: &MetadataFields,
    ) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.metadata
            .entry(key.clone())
            .or_default()
            .extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(())
    }

    async fn clear(&self, key: &CacheKey) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.metadata.remove(key);
        self.chunks.remove(key);
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.ensure_open()
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}
