//! Turns a file on disk into a [`Document`]: extract, describe, chunk, hash.
//!
//! [`DocumentProcessor`] holds no durable state. The content hash depends
//! only on the extracted text, so the same content under a different name
//! or path always produces the same hash.

use std::path::Path;

use serde_json::json;
use md5::{Digest, Md5};

use crate::chunk::WordChunker;
use crate::config::Config;
use crate::encoding::{TextEncoding, DEFAULT_ENCODINGS};
use crate::error::{Error, Result};
use crate::extract;
use crate::models::{
    Chunk, Document, Metadata, META_CONTENT_HASH, META_EXTENSION, META_FILENAME, META_FILEPATH,
    META_PROCESSED_AT, META_SIZE_BYTES, META_TEXT_LENGTH, META_WORD_COUNT,
};

/// Extraction and chunking pipeline.
#[derive(Debug, Clone)]
pub struct DocumentProcessor {
    chunker: WordChunker,
    encodings: Vec<TextEncoding>,
}

impl Default for DocumentProcessor {
    fn default() -> Self {
        Self {
            chunker: WordChunker::default(),
            encodings: DEFAULT_ENCODINGS.to_vec(),
        }
    }
}

impl DocumentProcessor {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        Ok(Self {
            chunker: WordChunker::new(chunk_size, chunk_overlap)?,
            encodings: DEFAULT_ENCODINGS.to_vec(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.chunking.chunk_size, config.chunking.chunk_overlap)?
            .with_encodings(config.extraction.encodings.clone()))
    }

    /// Replace the ordered list of encodings tried for plain-text files.
    pub fn with_encodings(mut self, encodings: Vec<TextEncoding>) -> Self {
        self.encodings = encodings;
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunker.chunk_size()
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunker.chunk_overlap()
    }

    pub fn encodings(&self) -> &[TextEncoding] {
        &self.encodings
    }

    pub fn supported_formats(&self) -> Vec<&'static str> {
        extract::supported_formats()
    }

    /// Extract text from `path`, tagging any failure with the file name.
    pub fn extract_text(&self, path: &Path) -> Result<String> {
        extract::extract_text(path, &self.encodings).map_err(|source| Error::Extraction {
            filename: display_name(path),
            source,
        })
    }

    pub fn chunk(&self, text: &str, metadata: &Metadata) -> Vec<Chunk> {
        self.chunker.chunk(text, metadata)
    }

    /// Run the full pipeline for one file.
    ///
    /// Caller-supplied `extra` metadata overrides the generated keys. Chunks
    /// carry the merged metadata; the document's own metadata additionally
    /// records `content_hash`.
    pub fn process_document(&self, path: &Path, extra: Option<&Metadata>) -> Result<Document> {
        let text = self.extract_text(path)?;
        let size_bytes = std::fs::metadata(path)
            .map_err(|e| Error::io(path, e))?
            .len();

        let mut metadata = Metadata::new();
        metadata.insert(META_FILENAME.into(), json!(display_name(path)));
        metadata.insert(META_FILEPATH.into(), json!(path.display().to_string()));
        metadata.insert(META_EXTENSION.into(), json!(extract::extension_of(path)));
        metadata.insert(META_SIZE_BYTES.into(), json!(size_bytes));
        metadata.insert(META_PROCESSED_AT.into(), json!(crate::models::timestamp_now()));
        metadata.insert(META_TEXT_LENGTH.into(), json!(text.chars().count()));
        metadata.insert(META_WORD_COUNT.into(), json!(text.split_whitespace().count()));
        if let Some(extra) = extra {
            for (key, value) in extra {
                metadata.insert(key.clone(), value.clone());
            }
        }

        let chunks = self.chunk(&text, &metadata);
        let hash = content_hash(&text);
        metadata.insert(META_CONTENT_HASH.into(), json!(hash));

        tracing::debug!(
            file = %path.display(),
            chunks = chunks.len(),
            hash = %hash,
            "processed document"
        );

        Ok(Document {
            content_hash: hash,
            metadata,
            text,
            chunk_count: chunks.len(),
            chunks,
        })
    }
}

/// Lowercase hex MD5 of the extracted text's UTF-8 bytes.
///
/// Stores written by earlier installations are keyed the same way, so
/// content already in them is recognised as a duplicate.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn hash_depends_only_on_text() {
        assert_eq!(content_hash("same"), content_hash("same"));
        assert_ne!(content_hash("same"), content_hash("Same"));
        assert_eq!(content_hash(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(content_hash("hello world"), "5eb63bbbe01eeed093cb22bb8f5acdc3");
    }

    #[test]
    fn process_builds_metadata_and_chunks() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("Notes.TXT");
        fs::write(&path, "alpha beta  gamma\ndelta").unwrap();

        let processor = DocumentProcessor::new(3, 1).unwrap();
        let doc = processor.process_document(&path, None).unwrap();

        assert_eq!(doc.text, "alpha beta  gamma\ndelta");
        assert_eq!(doc.filename(), "Notes.TXT");
        assert_eq!(doc.metadata[META_EXTENSION], json!(".txt"));
        assert_eq!(doc.metadata[META_SIZE_BYTES], json!(23));
        assert_eq!(doc.metadata[META_TEXT_LENGTH], json!(23));
        assert_eq!(doc.metadata[META_WORD_COUNT], json!(4));
        assert_eq!(doc.metadata[META_CONTENT_HASH], json!(doc.content_hash));
        assert_eq!(doc.content_hash, content_hash(&doc.text));

        assert_eq!(doc.chunk_count, 2);
        assert_eq!(doc.chunks[0].text, "alpha beta gamma");
        assert_eq!(doc.chunks[1].text, "gamma delta");
        // Chunks carry the base metadata, not the hash.
        assert!(!doc.chunks[0].metadata.contains_key(META_CONTENT_HASH));
        assert_eq!(doc.chunks[0].metadata[META_FILENAME], json!("Notes.TXT"));
    }

    #[test]
    fn caller_metadata_wins_on_collision() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.md");
        fs::write(&path, "# Title").unwrap();

        let mut extra = Metadata::new();
        extra.insert("filename".into(), json!("renamed.md"));
        extra.insert("source".into(), json!("upload"));
        let doc = DocumentProcessor::default()
            .process_document(&path, Some(&extra))
            .unwrap();

        assert_eq!(doc.filename(), "renamed.md");
        assert_eq!(doc.metadata["source"], json!("upload"));
        assert_eq!(doc.chunks[0].metadata["source"], json!("upload"));
    }

    #[test]
    fn whitespace_file_has_no_chunks() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("blank.txt");
        fs::write(&path, "  \n\n ").unwrap();
        let doc = DocumentProcessor::default().process_document(&path, None).unwrap();
        assert_eq!(doc.chunk_count, 0);
        assert!(doc.chunks.is_empty());
    }

    #[test]
    fn extraction_errors_carry_filename() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("image.png");
        fs::write(&path, [0u8, 1, 2]).unwrap();
        let err = DocumentProcessor::default()
            .process_document(&path, None)
            .unwrap_err();
        assert!(err.is_unsupported_format());
        assert!(err.to_string().contains("image.png"));
    }

    #[test]
    fn missing_file_is_extraction_error() {
        let err = DocumentProcessor::default()
            .extract_text(Path::new("/definitely/not/here.txt"))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Extraction {
                source: crate::error::ExtractError::Io(_),
                ..
            }
        ));
    }

    #[test]
    fn restricted_encodings_surface_undecodable_text() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.txt");
        fs::write(&path, [0xFFu8, 0xFE, 0x00]).unwrap();
        let processor = DocumentProcessor::default().with_encodings(vec![TextEncoding::Utf8]);
        let err = processor.process_document(&path, None).unwrap_err();
        assert!(err.is_undecodable_text());
    }
}
