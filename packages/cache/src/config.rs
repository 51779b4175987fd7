use serde::Deserialize;

use crate::{DEFAULT_CHUNK_SIZE, DEFAULT_READ_BUFFER};

/// Origin object store settings.
#[derive(Debug, Deserialize, Clone)]
pub struct OriginConfig {
    /// Base URL that object names are appended to. Required.
    pub base_url: String,
    /// Size of the fragments forwarded to clients. Default: 64 KiB.
    #[serde(default = "default_read_buffer_bytes")]
    pub read_buffer_bytes: usize,
    /// TCP connect timeout for origin requests. Default: 10.
    #[serde(default = "default_origin_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Upper bound on bucket listing pages fetched for one listing. Default: 20.
    #[serde(default = "default_listing_max_pages")]
    pub listing_max_pages: u32,
}

fn default_read_buffer_bytes() -> usize {
    DEFAULT_READ_BUFFER
}
fn default_origin_connect_timeout_secs() -> u64 {
    10
}
fn default_listing_max_pages() -> u32 {
    20
}

impl OriginConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            read_buffer_bytes: default_read_buffer_bytes(),
            connect_timeout_secs: default_origin_connect_timeout_secs(),
            listing_max_pages: default_listing_max_pages(),
        }
    }
}

/// Redis chunk store settings.
#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// Redis host. Required.
    pub host: String,
    /// Default: 6379.
    #[serde(default = "default_store_port")]
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Logical database index. Default: 0.
    #[serde(default)]
    pub db: u32,
    /// Default: 5.
    #[serde(default = "default_store_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_store_port() -> u16 {
    6379
}
fn default_store_connect_timeout_secs() -> u64 {
    5
}

impl StoreConfig {
    /// Connection URL in `redis://[user[:password]@]host:port/db` form.
    pub fn url(&self) -> String {
        let credentials = match (&self.username, &self.password) {
            (Some(user), Some(password)) => format!(
                "{}:{}@",
                urlencoding::encode(user),
                urlencoding::encode(password)
            ),
            (None, Some(password)) => format!(":{}@", urlencoding::encode(password)),
            (Some(user), None) => format!("{}@", urlencoding::encode(user)),
            (None, None) => String::new(),
        };
        format!("redis://{credentials}{}:{}/{}", self.host, self.port, self.db)
    }
}

/// Chunking settings.
#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// Nominal chunk size. Default: 1 MiB.
    #[serde(default = "default_chunk_size_bytes")]
    pub chunk_size_bytes: usize,
}

fn default_chunk_size_bytes() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            chunk_size_bytes: default_chunk_size_bytes(),
        }
    }
}
