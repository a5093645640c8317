//! Core data models for ingested documents, their chunks, and the index.
//!
//! The serde shapes here are the on-disk layout: a storage unit is a
//! serialized [`Document`] and `document_index.json` is a serialized
//! [`DocumentIndex`]. Field order matches the files written by existing
//! stores, and metadata keeps insertion order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Free-form metadata attached to documents and chunks.
pub type Metadata = serde_json::Map<String, Value>;

pub const META_FILENAME: &str = "filename";
pub const META_FILEPATH: &str = "filepath";
pub const META_EXTENSION: &str = "extension";
pub const META_SIZE_BYTES: &str = "size_bytes";
pub const META_PROCESSED_AT: &str = "processed_at";
pub const META_TEXT_LENGTH: &str = "text_length";
pub const META_WORD_COUNT: &str = "word_count";
pub const META_CONTENT_HASH: &str = "content_hash";

/// A word window over a document's text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub chunk_index: usize,
    pub word_count: usize,
    pub char_count: usize,
    pub metadata: Metadata,
}

/// One ingested source file with its full text and chunks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Not part of the storage unit; the index key is authoritative.
    #[serde(skip)]
    pub content_hash: String,
    pub metadata: Metadata,
    pub text: String,
    pub chunks: Vec<Chunk>,
    pub chunk_count: usize,
}

impl Document {
    pub fn filename(&self) -> &str {
        meta_str(&self.metadata, META_FILENAME).unwrap_or_default()
    }
}

/// Index record for one stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub metadata: Metadata,
    pub storage_file: String,
    pub added_at: String,
}

/// The durable catalog of everything in the store.
///
/// `documents` preserves insertion order, which is also the enumeration
/// order used by search before ranking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentIndex {
    #[serde(default)]
    pub documents: IndexMap<String, IndexEntry>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// Row returned by [`DocumentStore::list_documents`](crate::store::DocumentStore::list_documents).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSummary {
    pub content_hash: String,
    pub filename: String,
    pub size_bytes: u64,
    pub word_count: u64,
    pub added_at: String,
}

/// A matching chunk with its relevance score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub document_hash: String,
    pub filename: String,
    pub chunk_index: usize,
    pub text: String,
    pub relevance: f64,
    pub metadata: Metadata,
}

pub fn meta_str<'a>(metadata: &'a Metadata, key: &str) -> Option<&'a str> {
    metadata.get(key).and_then(Value::as_str)
}

pub fn meta_u64(metadata: &Metadata, key: &str) -> Option<u64> {
    metadata.get(key).and_then(Value::as_u64)
}

/// Local ISO-8601 timestamp with microseconds, e.g. `2024-05-01T09:30:12.123456`.
pub fn timestamp_now() -> String {
    chrono::Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_index_serializes_with_null_timestamp() {
        let index = DocumentIndex::default();
        let value = serde_json::to_value(&index).unwrap();
        assert_eq!(value, json!({"documents": {}, "last_updated": null}));
    }

    #[test]
    fn document_round_trips_without_hash_field() {
        let mut metadata = Metadata::new();
        metadata.insert(META_FILENAME.into(), json!("a.txt"));
        let doc = Document {
            content_hash: "deadbeef".into(),
            metadata: metadata.clone(),
            text: "hello".into(),
            chunks: vec![Chunk {
                text: "hello".into(),
                chunk_index: 0,
                word_count: 1,
                char_count: 5,
                metadata,
            }],
            chunk_count: 1,
        };
        let json = serde_json::to_string(&doc).unwrap();
        assert!(!json.contains("deadbeef"));
        assert!(json.starts_with(r#"{"metadata":"#));

        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back.content_hash, "");
        assert_eq!(back.filename(), "a.txt");
        assert_eq!(back.chunks, doc.chunks);
    }

    #[test]
    fn timestamp_is_iso_like() {
        let ts = timestamp_now();
        assert_eq!(ts.len(), "2024-05-01T09:30:12.123456".len());
        assert_eq!(&ts[10..11], "T");
    }
}
