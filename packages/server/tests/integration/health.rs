use std::sync::Arc;

use vod_cache::store::ChunkStore;
use vod_cache::store::memory::MemoryChunkStore;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn reports_store_up() {
    let app = TestApp::spawn().await;

    let res = app.get(routes::HEALTH).await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body["status"], "ok");
    assert_eq!(res.body["store"], "up");
}

#[tokio::test]
async fn closed_store_is_down_but_healthy() {
    let store = Arc::new(MemoryChunkStore::new());
    store.close().await;
    let app = TestApp::spawn_with(store, 4).await;

    let res = app.get(routes::HEALTH).await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body["status"], "ok");
    assert_eq!(res.body["store"], "down");
}
