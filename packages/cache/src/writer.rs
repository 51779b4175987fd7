use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use tracing::{debug, info, warn};

use crate::metadata::VideoMetadata;
use crate::name::CacheKey;
use crate::population::PopulationClaim;
use crate::store::ChunkStore;

/// Re-buffers an arbitrary fragment sequence into fixed-size chunk records.
///
/// Chunk indices are assigned in arrival order starting at 0. The metadata
/// record is written by [`ChunkWriter::finish`] only after the last chunk, and
/// never after a failed write: the first store error turns the writer into a
/// no-op for the rest of the stream.
pub struct ChunkWriter {
    store: Arc<dyn ChunkStore>,
    claim: PopulationClaim,
    original_name: String,
    content_type: Option<String>,
    chunk_size: usize,
    buffer: BytesMut,
    next_index: u64,
    total_bytes: u64,
    active: bool,
    finished: bool,
}

impl ChunkWriter {
    /// Start a population attempt, clearing whatever an earlier attempt left behind.
    ///
    /// If the store cannot be cleared the writer starts inactive and nothing is written.
    pub async fn begin(
        store: Arc<dyn ChunkStore>,
        claim: PopulationClaim,
        original_name: impl Into<String>,
        content_type: Option<String>,
        chunk_size: usize,
    ) -> Self {
        let active = match store.clear(claim.key()).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    key = %claim.key(),
                    error = %e,
                    "Chunk store unavailable, streaming without caching"
                );
                false
            }
        };

        let chunk_size = chunk_size.max(1);
        Self {
            store,
            claim,
            original_name: original_name.into(),
            content_type,
            chunk_size,
            buffer: BytesMut::with_capacity(if active { chunk_size } else { 0 }),
            next_index: 0,
            total_bytes: 0,
            active,
            finished: false,
        }
    }

    pub fn key(&self) -> &CacheKey {
        self.claim.key()
    }

    /// Whether this writer is still persisting chunks.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Accumulate a fragment, writing every full chunk it completes.
    pub async fn push(&mut self, fragment: &[u8]) {
        if !self.active {
            return;
        }

        self.total_bytes += fragment.len() as u64;
        self.buffer.extend_from_slice(fragment);

        while self.buffer.len() >= self.chunk_size {
            let chunk = self.buffer.split_to(self.chunk_size).freeze();
            if !self.write_chunk(chunk).await {
                return;
            }
        }
    }

    /// Flush the trailing partial chunk, then write the metadata record.
    ///
    /// Returns the written metadata, or `None` if the entry was left incomplete.
    pub async fn finish(mut self) -> Option<VideoMetadata> {
        self.finished = true;
        if !self.active {
            return None;
        }

        if !self.buffer.is_empty() {
            let chunk = self.buffer.split().freeze();
            if !self.write_chunk(chunk).await {
                return None;
            }
        }

        let metadata = VideoMetadata {
            total_chunks: self.next_index,
            original_name: self.original_name.clone(),
            content_type: self.content_type.clone(),
            total_bytes: Some(self.total_bytes),
            complete: true,
        };

        match self
            .store
            .put_metadata(self.claim.key(), &metadata.to_fields())
            .await
        {
            Ok(()) => {
                info!(
                    key = %self.claim.key(),
                    chunks = metadata.total_chunks,
                    bytes = self.total_bytes,
                    "Video cached"
                );
                Some(metadata)
            }
            Err(e) => {
                warn!(
                    key = %self.claim.key(),
                    error = %e,
                    "Failed to write metadata, entry left incomplete"
                );
                None
            }
        }
    }

    /// Stop without finalizing. Chunks already written stay behind as an
    /// incomplete entry and are cleared by the next attempt.
    pub fn abandon(mut self, reason: &str) {
        self.finished = true;
        if self.active {
            warn!(
                key = %self.claim.key(),
                chunks = self.next_index,
                reason,
                "Population abandoned, entry left incomplete"
            );
        }
    }

    async fn write_chunk(&mut self, chunk: Bytes) -> bool {
        let len = chunk.len();
        match self
            .store
            .put_chunk(self.claim.key(), self.next_index, chunk)
            .await
        {
            Ok(()) => {
                debug!(
                    key = %self.claim.key(),
                    chunk = self.next_index,
                    bytes = len,
                    "Stored chunk"
                );
                self.next_index += 1;
                true
            }
            Err(e) => {
                warn!(
                    key = %self.claim.key(),
                    chunk = self.next_index,
                    error = %e,
                    "Chunk write failed, giving up on caching this stream"
                );
                self.active = false;
                self.buffer = BytesMut::new();
                false
            }
        }
    }
}

impl Drop for ChunkWriter {
    fn drop(&mut self) {
        if !self.finished && self.active {
            warn!(
                key = %self.claim.key(),
                chunks = self.next_index,
                "Stream dropped before completion, entry left incomplete"
            );
        }
    }
}
