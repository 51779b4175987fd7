use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{TestApp, routes};

mod player_page {
    use super::*;

    #[tokio::test]
    async fn uncached_video_gets_player_pointing_at_stream() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::watch("clip%20one.mp4")).await;

        assert_eq!(res.status, 200);
        assert!(res.header("content-type").unwrap().starts_with("text/html"));
        assert!(res.text.contains(r#"src="/stream/clip%20one.mp4""#));
        assert!(res.text.contains("clip one.mp4"));
    }

    #[tokio::test]
    async fn malformed_name_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::watch("README")).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod cached_video {
    use super::*;

    #[tokio::test]
    async fn complete_entry_is_served_directly() {
        let app = TestApp::spawn().await;
        Mock::given(method("GET"))
            .and(path("/movie.mkv"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(b"0123456789".to_vec(), "video/x-matroska"),
            )
            .expect(1)
            .mount(&app.origin)
            .await;

        let streamed = app.get(&routes::stream("movie.mkv")).await;
        assert_eq!(streamed.header("x-cache"), Some("MISS"));

        let res = app.get(&routes::watch("movie.mkv")).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.bytes, b"0123456789");
        assert_eq!(res.header("content-type"), Some("video/x-matroska"));
        assert_eq!(res.header("x-cache"), Some("HIT"));
    }
}

mod link_round_trip {
    use super::*;

    /// A key with a literal `%` must survive listing link, watch page, stream
    /// URL and origin request without being decoded twice.
    #[tokio::test]
    async fn listing_link_reaches_the_right_origin_object() {
        let app = TestApp::spawn().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"<ListBucketResult><IsTruncated>false</IsTruncated><Contents><Key>100% real.mp4</Key><Size>4</Size></Contents></ListBucketResult>"#,
                "application/xml",
            ))
            .mount(&app.origin)
            .await;
        Mock::given(method("GET"))
            .and(path("/100%25%20real.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(b"real".to_vec(), "video/mp4"))
            .expect(1)
            .mount(&app.origin)
            .await;

        let listing = app.get(routes::INDEX).await;
        let watch_link = "/watch/100%25%20real.mp4";
        assert!(listing.text.contains(watch_link));
        assert!(listing.text.contains("key 100_real.mp4"));

        let watch = app.get(watch_link).await;
        let stream_link = "/stream/100%25%20real.mp4";
        assert!(watch.text.contains(stream_link));
        assert!(watch.text.contains("100% real.mp4"));

        let stream = app.get(stream_link).await;
        assert_eq!(stream.status, 200);
        assert_eq!(stream.bytes, b"real");
    }
}
