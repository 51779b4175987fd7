use std::io;
use std::time::Duration;

use futures::{StreamExt, TryStreamExt};
use reqwest::header::CONTENT_TYPE;
use tokio_util::io::{ReaderStream, StreamReader};
use tracing::{debug, instrument};

use crate::config::OriginConfig;
use crate::error::CacheError;
use crate::name::VideoName;
use crate::tee::ByteStream;

/// HTTP client for the origin object store.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Debug, Clone)]
pub struct OriginClient {
    http: reqwest::Client,
    base_url: String,
    read_buffer: usize,
}

/// An origin response whose body has not been read yet.
pub struct OriginObject {
    pub url: String,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub body: ByteStream,
}

impl OriginClient {
    pub fn new(config: &OriginConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;
        Ok(Self::with_client(
            http,
            &config.base_url,
            config.read_buffer_bytes,
        ))
    }

    pub fn with_client(http: reqwest::Client, base_url: &str, read_buffer: usize) -> Self {
        let base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        Self {
            http,
            base_url,
            read_buffer: read_buffer.max(1),
        }
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Base URL, always ending in `/`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of an object, from its still-encoded name.
    pub fn object_url(&self, encoded_name: &str) -> String {
        format!("{}{}", self.base_url, encoded_name.trim_start_matches('/'))
    }

    /// Open the object's body as a stream of `read_buffer`-sized fragments.
    ///
    /// Nothing past the response headers is read here.
    #[instrument(skip_all, fields(name = %name))]
    pub async fn fetch(&self, name: &VideoName) -> Result<OriginObject, CacheError> {
        let url = self.object_url(name.encoded());

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| CacheError::OriginUnreachable {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CacheError::OriginNotFound {
                url,
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let content_length = response.content_length();
        debug!(%url, ?content_type, ?content_length, "Origin responded");

        let reader = StreamReader::new(response.bytes_stream().map_err(io::Error::other));
        let body = ReaderStream::with_capacity(reader, self.read_buffer).boxed();

        Ok(OriginObject {
            url,
            content_type,
            content_length,
            body,
        })
    }
}
