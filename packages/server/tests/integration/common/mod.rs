use std::net::SocketAddr;
use std::sync::Arc;

use reqwest::Client;
use reqwest::header::HeaderMap;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::MockServer;

use vod_cache::VideoCache;
use vod_cache::config::{CacheConfig, OriginConfig, StoreConfig};
use vod_cache::origin::OriginClient;
use vod_cache::store::ChunkStore;
use vod_cache::store::memory::MemoryChunkStore;
use vod_server::config::{AppConfig, ServerConfig};
use vod_server::state::AppState;

pub mod routes {
    pub const INDEX: &str = "/";
    pub const HEALTH: &str = "/health";

    pub fn watch(encoded: &str) -> String {
        format!("/watch/{encoded}")
    }

    pub fn stream(encoded: &str) -> String {
        format!("/stream/{encoded}")
    }
}

/// A running test server in front of a mock origin.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub origin: MockServer,
    pub store: Arc<dyn ChunkStore>,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    pub headers: HeaderMap,
    /// Raw response body.
    pub bytes: Vec<u8>,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(Arc::new(MemoryChunkStore::new()), 4).await
    }

    /// Spawn against a mock origin with the given store and chunk size.
    pub async fn spawn_with(store: Arc<dyn ChunkStore>, chunk_size: usize) -> Self {
        let origin = MockServer::start().await;
        let base_url = format!("{}/", origin.uri());
        let addr = serve(store.clone(), &base_url, chunk_size).await;

        Self {
            addr,
            client: Client::new(),
            origin,
            store,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }
}

/// Build the router over `store` and an origin at `base_url`, and serve it on
/// an ephemeral port.
pub async fn serve(store: Arc<dyn ChunkStore>, base_url: &str, chunk_size: usize) -> SocketAddr {
    let app_config = AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        origin: OriginConfig {
            read_buffer_bytes: 3,
            ..OriginConfig::new(base_url)
        },
        store: StoreConfig {
            host: "unused".to_string(),
            port: 6379,
            username: None,
            password: None,
            db: 0,
            connect_timeout_secs: 1,
        },
        cache: CacheConfig {
            chunk_size_bytes: chunk_size,
        },
    };

    let origin = OriginClient::new(&app_config.origin).expect("Failed to build origin client");
    let cache = Arc::new(VideoCache::new(store, origin, chunk_size));
    let state = AppState {
        config: Arc::new(app_config),
        cache,
    };

    let app = vod_server::build_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}

/// Origin that declares `declared` body bytes without a content type, sends
/// `sent`, then hangs up.
pub async fn truncating_origin(declared: usize, sent: &'static [u8]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind truncating origin");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut request = [0u8; 2048];
            let _ = socket.read(&mut request).await;
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {declared}\r\n\r\n"
            );
            let _ = socket.write_all(head.as_bytes()).await;
            let _ = socket.write_all(sent).await;
            let _ = socket.shutdown().await;
        }
    });

    format!("http://{addr}/")
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let headers = res.headers().clone();
        let bytes = res
            .bytes()
            .await
            .expect("Failed to read response body")
            .to_vec();
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        Self {
            status,
            headers,
            bytes,
            text,
            body,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
