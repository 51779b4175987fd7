//! Enumerates the media objects an origin exposes.
//!
//! The origin root is either an S3-style bucket listing (`ListBucketResult`
//! XML) or an HTML directory index. Both are reduced to [`MediaObject`]s
//! whose extension is a known media type.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use vod_cache::CacheKey;
use vod_cache::name::{encode_path, normalize};
use vod_cache::origin::OriginClient;

/// Extensions (lower-case, without the dot) that are listed.
pub const MEDIA_EXTENSIONS: &[&str] = &["mp4", "mkv", "mov", "webm", "mp3", "wav", "avi"];

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

static ANCHOR_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\s[^>]*?href\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("anchor pattern is valid")
});

#[derive(Debug, Error)]
pub enum ListingError {
    #[error("Origin unreachable at {url}: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Origin returned {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Malformed bucket listing: {0}")]
    Malformed(#[from] quick_xml::DeError),
}

/// One listed object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaObject {
    /// Object key, decoded.
    pub key: String,
    pub size_bytes: Option<u64>,
}

impl MediaObject {
    pub fn display_size(&self) -> String {
        match self.size_bytes {
            Some(bytes) => human_size(bytes),
            None => "unknown size".to_string(),
        }
    }

    /// Path of the watch page for this object.
    pub fn watch_link(&self) -> String {
        format!("/watch/{}", encode_path(&self.key))
    }

    pub fn cache_key(&self) -> Option<CacheKey> {
        normalize(&encode_path(&self.key)).ok()
    }
}

/// Size in binary megabytes with two decimals, e.g. `"2.00 MB"`.
pub fn human_size(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / BYTES_PER_MB)
}

pub fn is_media(key: &str) -> bool {
    key.rsplit_once('.').is_some_and(|(_, extension)| {
        MEDIA_EXTENSIONS.contains(&extension.to_ascii_lowercase().as_str())
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListBucketResult {
    #[serde(default)]
    is_truncated: bool,
    #[serde(default)]
    next_marker: Option<String>,
    #[serde(default)]
    contents: Vec<Contents>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Contents {
    key: String,
    #[serde(default)]
    size: Option<u64>,
}

/// All media objects at the origin root.
#[instrument(skip(origin), fields(base_url = %origin.base_url()))]
pub async fn list_origin_objects(
    origin: &OriginClient,
    max_pages: u32,
) -> Result<Vec<MediaObject>, ListingError> {
    let first = fetch_text(origin, origin.base_url()).await?;
    if !is_bucket_listing(&first) {
        let objects = parse_html_index(&first, origin.base_url());
        debug!(count = objects.len(), "Parsed HTML directory index");
        return Ok(objects);
    }

    let mut objects = Vec::new();
    let mut page = parse_bucket_page(&first)?;
    let mut pages = 1;
    loop {
        let marker = page
            .next_marker
            .take()
            .or_else(|| page.contents.last().map(|last| last.key.clone()));
        let truncated = page.is_truncated;
        objects.extend(
            page.contents
                .into_iter()
                .filter(|entry| is_media(&entry.key))
                .map(|entry| MediaObject {
                    key: entry.key,
                    size_bytes: entry.size,
                }),
        );

        let Some(marker) = marker.filter(|_| truncated) else {
            break;
        };
        if pages >= max_pages.max(1) {
            warn!(pages, "Bucket listing truncated at page limit");
            break;
        }

        let url = format!(
            "{}?marker={}",
            origin.base_url(),
            urlencoding::encode(&marker)
        );
        page = parse_bucket_page(&fetch_text(origin, &url).await?)?;
        pages += 1;
    }

    debug!(count = objects.len(), pages, "Parsed bucket listing");
    Ok(objects)
}

async fn fetch_text(origin: &OriginClient, url: &str) -> Result<String, ListingError> {
    let unreachable = |source| ListingError::Unreachable {
        url: url.to_string(),
        source,
    };

    let response = origin.http().get(url).send().await.map_err(unreachable)?;
    let status = response.status();
    if !status.is_success() {
        return Err(ListingError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    response.text().await.map_err(unreachable)
}

fn is_bucket_listing(body: &str) -> bool {
    body.contains("<ListBucketResult")
}

fn parse_bucket_page(body: &str) -> Result<ListBucketResult, ListingError> {
    Ok(quick_xml::de::from_str(body)?)
}

/// Collect anchor targets that name media files under `base_url`.
fn parse_html_index(body: &str, base_url: &str) -> Vec<MediaObject> {
    let base_path = base_url
        .split_once("://")
        .and_then(|(_, rest)| rest.find('/').map(|at| &rest[at..]))
        .unwrap_or("/");

    let mut objects: Vec<MediaObject> = Vec::new();
    for captures in ANCHOR_HREF.captures_iter(body) {
        let Some(href) = captures.get(1).or_else(|| captures.get(2)) else {
            continue;
        };
        let href = href.as_str().trim().replace("&amp;", "&");

        let relative = if let Some(rest) = href.strip_prefix(base_url) {
            rest
        } else if href.contains("://") || href.starts_with("//") {
            continue;
        } else if href.starts_with('/') {
            match href.strip_prefix(base_path) {
                Some(inside) => inside,
                None => continue,
            }
        } else {
            href.as_str()
        };

        let relative = relative.split(['?', '#']).next().unwrap_or_default();
        if relative.is_empty() || relative.ends_with('/') || relative.starts_with("..") {
            continue;
        }

        let Ok(key) = urlencoding::decode(relative) else {
            continue;
        };
        if is_media(&key) && !objects.iter().any(|o| o.key == key) {
            objects.push(MediaObject {
                key: key.into_owned(),
                size_bytes: None,
            });
        }
    }
    objects
}
