use std::sync::Arc;

use vod_cache::VideoName;
use vod_cache::store::memory::MemoryChunkStore;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{TestApp, routes, serve, truncating_origin};

async fn serve_object(app: &TestApp, object_path: &str, body: &'static [u8], hits: u64) {
    Mock::given(method("GET"))
        .and(path(object_path))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "video/webm"))
        .expect(hits)
        .mount(&app.origin)
        .await;
}

mod cache_population {
    use super::*;

    #[tokio::test]
    async fn first_request_misses_and_second_hits() {
        let app = TestApp::spawn_with(Arc::new(MemoryChunkStore::new()), 2).await;
        serve_object(&app, "/clip%20one.mp4", b"ABCDE", 1).await;

        let first = app.get(&routes::stream("clip%20one.mp4")).await;
        assert_eq!(first.status, 200);
        assert_eq!(first.bytes, b"ABCDE");
        assert_eq!(first.header("x-cache"), Some("MISS"));
        assert_eq!(first.header("content-type"), Some("video/webm"));
        assert_eq!(first.header("content-length"), Some("5"));
        assert_eq!(first.header("cache-control"), Some("no-cache"));
        assert_eq!(first.header("accept-ranges"), None);

        let key = VideoName::parse("clip%20one.mp4").unwrap();
        let key = key.cache_key();
        assert_eq!(key.as_str(), "clip_one.mp4");
        assert_eq!(app.store.get_chunk(key, 0).await.unwrap().unwrap(), "AB");
        assert_eq!(app.store.get_chunk(key, 1).await.unwrap().unwrap(), "CD");
        assert_eq!(app.store.get_chunk(key, 2).await.unwrap().unwrap(), "E");

        let second = app.get(&routes::stream("clip%20one.mp4")).await;
        assert_eq!(second.status, 200);
        assert_eq!(second.bytes, b"ABCDE");
        assert_eq!(second.header("x-cache"), Some("HIT"));
        assert_eq!(second.header("content-type"), Some("video/webm"));
        assert_eq!(second.header("accept-ranges"), None);
    }
}

mod failures {
    use super::*;

    #[tokio::test]
    async fn missing_object_is_not_found() {
        let app = TestApp::spawn().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&app.origin)
            .await;

        let res = app.get(&routes::stream("missing.mp4")).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn forbidden_object_is_bad_gateway() {
        let app = TestApp::spawn().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&app.origin)
            .await;

        let res = app.get(&routes::stream("secret.mp4")).await;

        assert_eq!(res.status, 502);
        assert_eq!(res.body["code"], "BAD_GATEWAY");
    }

    #[tokio::test]
    async fn malformed_name_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::stream("no_extension")).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn dot_segment_never_reaches_origin() {
        let app = TestApp::spawn().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&app.origin)
            .await;

        let res = app.get(&routes::stream("..%2Fsecret.mp4")).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn truncated_origin_aborts_response_and_is_not_cached() {
        let store = Arc::new(MemoryChunkStore::new());
        let base = truncating_origin(100, b"0123456789").await;
        let addr = serve(store.clone(), &base, 4).await;
        let url = format!("http://{addr}{}", routes::stream("cut.mp4"));

        let res = reqwest::get(&url).await.unwrap();
        assert_eq!(res.status(), 200);
        assert_eq!(
            res.headers().get("content-type").and_then(|v| v.to_str().ok()),
            Some("video/mp4")
        );
        assert!(res.bytes().await.is_err(), "truncated body must not end cleanly");

        let name = VideoName::parse("cut.mp4").unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(
            !vod_cache::oracle::is_complete(store.as_ref(), name.cache_key())
                .await
                .unwrap()
        );

        let retry = reqwest::get(&url).await.unwrap();
        assert_eq!(
            retry.headers().get("x-cache").and_then(|v| v.to_str().ok()),
            Some("MISS")
        );
    }
}
