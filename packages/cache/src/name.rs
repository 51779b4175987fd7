use std::fmt;

use crate::error::CacheError;

/// Normalized identifier that namespaces the chunk and metadata records of one video.
///
/// Every maximal run of characters outside `[A-Za-z0-9_]` in the base name is
/// collapsed to a single `_`; the extension is kept verbatim. Distinct names may
/// collide (`"a b.mp4"` and `"a-b.mp4"` share `a_b.mp4`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A video identifier as received from a client, decoded exactly once.
#[derive(Debug, Clone)]
pub struct VideoName {
    encoded: String,
    decoded: String,
    key: CacheKey,
}

impl VideoName {
    /// Parse a raw, percent-encoded object name.
    ///
    /// The name is percent-decoded once; any `%XX` left after that is a literal
    /// part of the name.
    pub fn parse(raw: &str) -> Result<Self, CacheError> {
        let decoded = decode(raw)?;

        // Keeps the origin URL inside the configured base path.
        if decoded.split('/').any(|segment| segment == "." || segment == "..") {
            return Err(CacheError::malformed(raw, "path contains a dot segment"));
        }

        let key = normalize_decoded(&decoded)?;

        Ok(Self {
            encoded: raw.to_string(),
            decoded,
            key,
        })
    }

    /// The name exactly as supplied, still percent-encoded.
    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    /// The object name after a single percent-decode.
    pub fn decoded(&self) -> &str {
        &self.decoded
    }

    pub fn cache_key(&self) -> &CacheKey {
        &self.key
    }
}

impl fmt::Display for VideoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.decoded)
    }
}

/// Map a raw, percent-encoded object name to its cache key.
pub fn normalize(raw_name: &str) -> Result<CacheKey, CacheError> {
    normalize_decoded(&decode(raw_name)?)
}

/// Percent-encode an object key for use as a URL path tail, keeping `/` separators.
///
/// [`VideoName::parse`] on the result yields the original key again.
pub fn encode_path(object_key: &str) -> String {
    object_key
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn decode(raw: &str) -> Result<String, CacheError> {
    if raw.is_empty() {
        return Err(CacheError::malformed(raw, "name is empty"));
    }

    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| CacheError::malformed(raw, "not valid UTF-8 after percent-decoding"))
}

fn normalize_decoded(name: &str) -> Result<CacheKey, CacheError> {
    let (base, extension) = name
        .rsplit_once('.')
        .ok_or_else(|| CacheError::malformed(name, "missing extension separator"))?;

    // A dot in a directory component is not an extension.
    if extension.contains('/') {
        return Err(CacheError::malformed(name, "missing extension separator"));
    }

    let mut normalized = String::with_capacity(name.len());
    let mut in_run = false;
    for c in base.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            normalized.push(c);
            in_run = false;
        } else if !in_run {
            normalized.push('_');
            in_run = true;
        }
    }
    normalized.push('.');
    normalized.push_str(extension);

    Ok(CacheKey(normalized))
}
