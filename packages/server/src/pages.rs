use std::fmt::Write;

use vod_cache::VideoName;
use vod_cache::name::encode_path;

use crate::listing::MediaObject;

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
body {{ font-family: sans-serif; margin: 2rem auto; max-width: 960px; padding: 0 1rem; }}
li {{ margin: 0.4rem 0; }}
.meta {{ color: #666; font-size: 0.9em; }}
video {{ width: 100%; background: #000; }}
</style>
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape(title),
    )
}

/// Index page listing every media object with its size and cache key.
pub fn listing_page(objects: &[MediaObject]) -> String {
    let mut body = String::from("<h1>Videos</h1>\n");
    if objects.is_empty() {
        body.push_str("<p>No videos found.</p>\n");
        return layout("Videos", &body);
    }

    body.push_str("<ul>\n");
    for object in objects {
        let cache_key = object
            .cache_key()
            .map(|key| key.to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            body,
            r#"<li><a href="{link}">{name}</a> <span class="meta">({size}, key {key})</span></li>"#,
            link = escape(&object.watch_link()),
            name = escape(&object.key),
            size = escape(&object.display_size()),
            key = escape(&cache_key),
        );
    }
    body.push_str("</ul>\n");
    layout("Videos", &body)
}

/// Player page whose source is the stream endpoint for `name`.
pub fn player_page(name: &VideoName) -> String {
    let source = format!("/stream/{}", encode_path(name.decoded()));
    let body = format!(
        r#"<p><a href="/">All videos</a></p>
<h1>{title}</h1>
<video controls autoplay preload="metadata" src="{source}"></video>
"#,
        title = escape(name.decoded()),
        source = escape(&source),
    );
    layout(name.decoded(), &body)
}
