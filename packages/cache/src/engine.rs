use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::error::CacheError;
use crate::name::VideoName;
use crate::oracle;
use crate::origin::OriginClient;
use crate::population::PopulationRegistry;
use crate::reader::{self, CachedVideo};
use crate::store::ChunkStore;
use crate::tee::{self, ByteStream};
use crate::writer::ChunkWriter;

/// A video body coming from origin, possibly being cached as it is read.
pub struct VideoStream {
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    /// Whether this stream is populating the cache.
    pub populating: bool,
    pub body: ByteStream,
}

pub enum VideoSource {
    Cached(CachedVideo),
    Origin(VideoStream),
}

/// Read-through video cache in front of the origin store.
pub struct VideoCache {
    store: Arc<dyn ChunkStore>,
    origin: OriginClient,
    chunk_size: usize,
    populations: PopulationRegistry,
}

impl VideoCache {
    pub fn new(store: Arc<dyn ChunkStore>, origin: OriginClient, chunk_size: usize) -> Self {
        Self {
            store,
            origin,
            chunk_size: chunk_size.max(1),
            populations: PopulationRegistry::new(),
        }
    }

    pub fn store(&self) -> &Arc<dyn ChunkStore> {
        &self.store
    }

    pub fn origin(&self) -> &OriginClient {
        &self.origin
    }

    pub fn populations(&self) -> &PopulationRegistry {
        &self.populations
    }

    pub async fn is_complete(&self, name: &VideoName) -> Result<bool, CacheError> {
        Ok(oracle::is_complete(self.store.as_ref(), name.cache_key()).await?)
    }

    /// The complete cached payload, or `None` if the entry is not complete.
    #[instrument(skip_all, fields(name = %name, key = %name.cache_key()))]
    pub async fn read_complete(&self, name: &VideoName) -> Result<Option<CachedVideo>, CacheError> {
        reader::read_complete(self.store.as_ref(), name.cache_key()).await
    }

    /// Stream the video from origin, caching it if no other request is already
    /// doing so for the same key.
    ///
    /// Fails before any body byte is produced if the origin cannot be reached
    /// or does not have the object.
    #[instrument(skip_all, fields(name = %name, key = %name.cache_key()))]
    pub async fn stream_and_cache(&self, name: &VideoName) -> Result<VideoStream, CacheError> {
        self.stream_from_origin(name, true).await
    }

    async fn stream_from_origin(
        &self,
        name: &VideoName,
        cache: bool,
    ) -> Result<VideoStream, CacheError> {
        let object = self.origin.fetch(name).await?;

        let claim = if cache {
            self.populations.try_claim(name.cache_key())
        } else {
            None
        };
        let writer = match claim {
            Some(claim) => {
                let writer = ChunkWriter::begin(
                    Arc::clone(&self.store),
                    claim,
                    name.decoded(),
                    object.content_type.clone(),
                    self.chunk_size,
                )
                .await;
                writer.is_active().then_some(writer)
            }
            None if cache => {
                debug!("Population already in progress, streaming without caching");
                None
            }
            None => None,
        };

        let populating = writer.is_some();
        if populating {
            info!(url = %object.url, "Caching video from origin");
        }

        Ok(VideoStream {
            content_type: object.content_type,
            content_length: object.content_length,
            populating,
            body: tee::tee(object.body, writer, object.content_length),
        })
    }

    /// Serve from cache when complete, from origin otherwise.
    ///
    /// Store failures and corrupt entries degrade to an origin stream. A store
    /// failure also skips population, so nothing is written to that store.
    #[instrument(skip_all, fields(name = %name, key = %name.cache_key()))]
    pub async fn open(&self, name: &VideoName) -> Result<VideoSource, CacheError> {
        let cache = match self.read_complete(name).await {
            Ok(Some(video)) => {
                debug!(bytes = video.payload.len(), "Cache hit");
                return Ok(VideoSource::Cached(video));
            }
            Ok(None) => {
                debug!("Cache miss");
                true
            }
            Err(CacheError::Store(e)) => {
                warn!(error = %e, "Cache store unavailable, streaming from origin uncached");
                false
            }
            Err(e) if e.is_retryable() => {
                warn!(error = %e, "Cache read failed, falling back to origin");
                true
            }
            Err(e) => return Err(e),
        };

        self.stream_from_origin(name, cache).await.map(VideoSource::Origin)
    }
}
