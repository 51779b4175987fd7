use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use ::redis::AsyncCommands;
use ::redis::aio::ConnectionManager;
use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use super::error::StoreError;
use super::traits::ChunkStore;
use crate::metadata::MetadataFields;
use crate::name::CacheKey;

/// Redis-backed chunk store.
///
/// Layout:
/// - `video:{key}:chunks`: hash of decimal chunk index to raw chunk bytes
/// - `video:{key}:meta`: hash of metadata fields
///
/// The connection is established on first use, so an unreachable Redis never
/// prevents startup; every operation fails with [`StoreError::Unavailable`]
/// until it comes back. After a failed connect, operations fail fast for
/// [`RECONNECT_BACKOFF`] before another connect is attempted.
pub struct RedisChunkStore {
    client: ::redis::Client,
    connection: OnceCell<ConnectionManager>,
    connect_timeout: Duration,
    last_failure: Mutex<Option<Instant>>,
    closed: AtomicBool,
}

pub const RECONNECT_BACKOFF: Duration = Duration::from_secs(2);

impl RedisChunkStore {
    /// Create a handle for the given `redis://` URL without connecting.
    pub fn open(url: &str, connect_timeout: Duration) -> Result<Self, StoreError> {
        let client = ::redis::Client::open(url)
            .map_err(|e| StoreError::Backend(format!("invalid Redis URL: {e}")))?;

        Ok(Self {
            client,
            connection: OnceCell::new(),
            connect_timeout,
            last_failure: Mutex::new(None),
            closed: AtomicBool::new(false),
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, StoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }
        if let Some(manager) = self.connection.get() {
            return Ok(manager.clone());
        }
        self.check_backoff()?;

        let manager = self
            .connection
            .get_or_try_init(|| async {
                // Waiters queued behind a failed attempt must not retry at once.
                self.check_backoff()?;
                let connected = match tokio::time::timeout(
                    self.connect_timeout,
                    ConnectionManager::new(self.client.clone()),
                )
                .await
                {
                    Ok(Ok(manager)) => Ok(manager),
                    Ok(Err(e)) => Err(StoreError::from(e)),
                    Err(_) => Err(StoreError::Unavailable(format!(
                        "connect timed out after {}ms",
                        self.connect_timeout.as_millis()
                    ))),
                };
                match connected {
                    Ok(manager) => {
                        info!("Connected to Redis chunk store");
                        Ok(manager)
                    }
                    Err(e) => {
                        warn!(error = %e, "Redis connect failed, backing off");
                        self.record_failure();
                        Err(e)
                    }
                }
            })
            .await?;

        Ok(manager.clone())
    }

    fn check_backoff(&self) -> Result<(), StoreError> {
        let last_failure = *self
            .last_failure
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match last_failure {
            Some(at) if at.elapsed() < RECONNECT_BACKOFF => Err(StoreError::Unavailable(
                "connect failed recently, backing off".into(),
            )),
            _ => Ok(()),
        }
    }

    fn record_failure(&self) {
        *self
            .last_failure
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(Instant::now());
    }
}

pub(crate) fn chunks_key(key: &CacheKey) -> String {
    format!("video:{key}:chunks")
}

pub(crate) fn meta_key(key: &CacheKey) -> String {
    format!("video:{key}:meta")
}

#[async_trait]
impl ChunkStore for RedisChunkStore {
    async fn put_chunk(&self, key: &CacheKey, index: u64, data: Bytes) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        let _: () = conn.hset(chunks_key(key), index, data.as_ref()).await?;
        Ok(())
    }

    async fn get_chunk(&self, key: &CacheKey, index: u64) -> Result<Option<Bytes>, StoreError> {
        let mut conn = self.connection().await?;
        let data: Option<Vec<u8>> = conn.hget(chunks_key(key), index).await?;
        Ok(data.map(Bytes::from))
    }

    async fn chunk_indices(&self, key: &CacheKey) -> Result<Vec<u64>, StoreError> {
        let mut conn = self.connection().await?;
        let fields: Vec<String> = conn.hkeys(chunks_key(key)).await?;

        Ok(fields
            .into_iter()
            .filter_map(|field| match field.parse() {
                Ok(index) => Some(index),
                Err(_) => {
                    warn!(key = %key, field = %field, "Ignoring non-numeric chunk field");
                    None
                }
            })
            .collect())
    }

    async fn chunk_count(&self, key: &CacheKey) -> Result<u64, StoreError> {
        let mut conn = self.connection().await?;
        let count: u64 = conn.hlen(chunks_key(key)).await?;
        Ok(count)
    }

    async fn get_metadata(&self, key: &CacheKey) -> Result<Option<MetadataFields>, StoreError> {
        let mut conn = self.connection().await?;
        let fields: HashMap<String, String> = conn.hgetall(meta_key(key)).await?;
        Ok(if fields.is_empty() { None } else { Some(fields) })
    }

    async fn put_metadata(
        &self,
        key: &CacheKey,
        fields: &MetadataFields,
    ) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        let items: Vec<(&str, &str)> = fields
            .iter()
            .map(|(field, value)| (field.as_str(), value.as_str()))
            .collect();
        let _: () = conn.hset_multiple(meta_key(key), &items).await?;
        Ok(())
    }

    async fn clear(&self, key: &CacheKey) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        let _: () = conn.del(vec![meta_key(key), chunks_key(key)]).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        let _pong: String = ::redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    async fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            info!("Redis chunk store closed");
        }
    }
}
