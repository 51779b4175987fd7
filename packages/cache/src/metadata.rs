use std::collections::HashMap;

/// Raw field/value pairs of a metadata record as held by the chunk store.
pub type MetadataFields = HashMap<String, String>;

pub const TOTAL_CHUNKS: &str = "total_chunks";
pub const ORIGINAL_NAME: &str = "original_name";
pub const END_MARKER: &str = "end_marker";
pub const CONTENT_TYPE: &str = "content_type";
pub const TOTAL_BYTES: &str = "total_bytes";

/// Finalized description of a fully cached video.
///
/// Written strictly after the last chunk; its presence is what makes an entry
/// eligible to be served from cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMetadata {
    pub total_chunks: u64,
    pub original_name: String,
    pub content_type: Option<String>,
    pub total_bytes: Option<u64>,
    pub complete: bool,
}

impl VideoMetadata {
    /// Decode a stored record. Returns `None` when `total_chunks` is absent or
    /// not a non-negative integer.
    pub fn from_fields(fields: &MetadataFields) -> Option<Self> {
        let total_chunks = parse_total_chunks(fields)?;

        Some(Self {
            total_chunks,
            original_name: fields.get(ORIGINAL_NAME).cloned().unwrap_or_default(),
            content_type: fields
                .get(CONTENT_TYPE)
                .filter(|value| !value.is_empty())
                .cloned(),
            total_bytes: fields
                .get(TOTAL_BYTES)
                .and_then(|value| value.trim().parse().ok()),
            complete: fields.get(END_MARKER).is_some_and(|value| value == "true"),
        })
    }

    pub fn to_fields(&self) -> MetadataFields {
        let mut fields = MetadataFields::new();
        fields.insert(TOTAL_CHUNKS.into(), self.total_chunks.to_string());
        fields.insert(ORIGINAL_NAME.into(), self.original_name.clone());
        fields.insert(END_MARKER.into(), self.complete.to_string());
        if let Some(content_type) = &self.content_type {
            fields.insert(CONTENT_TYPE.into(), content_type.clone());
        }
        if let Some(total_bytes) = self.total_bytes {
            fields.insert(TOTAL_BYTES.into(), total_bytes.to_string());
        }
        fields
    }
}

/// Parse the declared chunk count, never failing.
pub fn parse_total_chunks(fields: &MetadataFields) -> Option<u64> {
    fields.get(TOTAL_CHUNKS)?.trim().parse().ok()
}
