//! Error types for the ingestion and retrieval core.
//!
//! Extraction failures are described by [`ExtractError`] and always reach
//! callers wrapped in [`Error::Extraction`] together with the offending
//! filename. "Not found" is never an error here: lookups return `Option`
//! or `bool` instead.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Why text could not be extracted from a single file.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The extension is unknown, or its parser was not compiled in.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// None of the configured text encodings could decode the file.
    #[error("could not decode file with any supported encoding ({tried})")]
    UndecodableText { tried: String },

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("OOXML extraction failed: {0}")]
    Ooxml(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by [`DocumentStore`](crate::store::DocumentStore) and
/// [`DocumentProcessor`](crate::processor::DocumentProcessor).
#[derive(Debug, Error)]
pub enum Error {
    #[error("error extracting text from {filename}: {source}")]
    Extraction {
        filename: String,
        #[source]
        source: ExtractError,
    },

    #[error("document already exists: {existing_filename}")]
    DuplicateDocument {
        content_hash: String,
        existing_filename: String,
    },

    #[error("invalid chunking parameters: chunk_overlap ({overlap}) must be smaller than chunk_size ({size})")]
    InvalidChunking { size: usize, overlap: usize },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// The extraction failure kind, when this error came from extraction.
    pub fn extract_kind(&self) -> Option<&ExtractError> {
        match self {
            Error::Extraction { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn is_unsupported_format(&self) -> bool {
        matches!(self.extract_kind(), Some(ExtractError::UnsupportedFormat(_)))
    }

    pub fn is_undecodable_text(&self) -> bool {
        matches!(self.extract_kind(), Some(ExtractError::UndecodableText { .. }))
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Error::DuplicateDocument { .. })
    }
}
