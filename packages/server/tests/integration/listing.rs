use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{TestApp, routes};

fn bucket_page(truncated: bool, next_marker: Option<&str>, entries: &[(&str, u64)]) -> String {
    let contents: String = entries
        .iter()
        .map(|(key, size)| format!("<Contents><Key>{key}</Key><Size>{size}</Size></Contents>"))
        .collect();
    let marker = next_marker
        .map(|m| format!("<NextMarker>{m}</NextMarker>"))
        .unwrap_or_default();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/"><Name>videos</Name><IsTruncated>{truncated}</IsTruncated>{marker}{contents}</ListBucketResult>"#
    )
}

mod bucket_listing {
    use super::*;

    #[tokio::test]
    async fn lists_media_objects_with_sizes() {
        let app = TestApp::spawn().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                bucket_page(
                    false,
                    None,
                    &[("a.mp4", 1_048_576), ("b.txt", 12), ("c d.mkv", 2_097_152)],
                ),
                "application/xml",
            ))
            .mount(&app.origin)
            .await;

        let res = app.get(routes::INDEX).await;

        assert_eq!(res.status, 200);
        assert!(res.text.contains(r#"href="/watch/a.mp4""#));
        assert!(res.text.contains("1.00 MB"));
        assert!(res.text.contains(r#"href="/watch/c%20d.mkv""#));
        assert!(res.text.contains("2.00 MB"));
        assert!(res.text.contains("key c_d.mkv"));
        assert!(!res.text.contains("b.txt"));
    }

    #[tokio::test]
    async fn follows_truncated_pages() {
        let app = TestApp::spawn().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("marker", "b.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                bucket_page(false, None, &[("c.webm", 10)]),
                "application/xml",
            ))
            .expect(1)
            .mount(&app.origin)
            .await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                bucket_page(true, Some("b.mp4"), &[("a.mp4", 10), ("b.mp4", 10)]),
                "application/xml",
            ))
            .expect(1)
            .mount(&app.origin)
            .await;

        let res = app.get(routes::INDEX).await;

        assert_eq!(res.status, 200);
        for link in ["/watch/a.mp4", "/watch/b.mp4", "/watch/c.webm"] {
            assert!(res.text.contains(link), "missing {link}");
        }
    }
}

mod directory_index {
    use super::*;

    #[tokio::test]
    async fn lists_anchor_targets_without_sizes() {
        let app = TestApp::spawn().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"<html><body><a href="../">..</a><a href="Trip%202024.MOV">Trip 2024.MOV</a><a href="readme.txt">readme</a></body></html>"#,
                "text/html",
            ))
            .mount(&app.origin)
            .await;

        let res = app.get(routes::INDEX).await;

        assert_eq!(res.status, 200);
        assert!(res.text.contains(r#"href="/watch/Trip%202024.MOV""#));
        assert!(res.text.contains("unknown size"));
        assert!(res.text.contains("key Trip_2024.MOV"));
        assert!(!res.text.contains("readme.txt"));
    }
}

mod origin_failures {
    use super::*;

    #[tokio::test]
    async fn origin_error_is_bad_gateway() {
        let app = TestApp::spawn().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&app.origin)
            .await;

        let res = app.get(routes::INDEX).await;

        assert_eq!(res.status, 502);
        assert_eq!(res.body["code"], "BAD_GATEWAY");
    }
}
