//! On-disk persistence for the index and per-document storage units.
//!
//! All writes go to a temporary file in the destination directory which is
//! then renamed over the target, so readers only ever see a complete file.

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::models::{timestamp_now, DocumentIndex};

pub const INDEX_FILE_NAME: &str = "document_index.json";

/// Load the index at `path`, or an empty one if it is missing or unreadable.
pub fn load_index(path: &Path) -> DocumentIndex {
    if !path.exists() {
        return DocumentIndex::default();
    }
    let loaded = std::fs::read(path)
        .map_err(|e| Error::io(path, e))
        .and_then(|bytes| serde_json::from_slice(&bytes).map_err(Error::from));
    match loaded {
        Ok(index) => index,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "error loading document index; starting empty");
            DocumentIndex::default()
        }
    }
}

/// Stamp `last_updated` and write the index. Failures are logged and
/// reported as `false`; the in-memory index stays authoritative.
pub fn save_index(path: &Path, index: &mut DocumentIndex) -> bool {
    index.last_updated = Some(timestamp_now());
    match write_json_atomic(path, index) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), documents = index.documents.len(), "saved document index");
            true
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "error saving document index");
            false
        }
    }
}

/// Serialize `value` as two-space-indented JSON and atomically replace `path`.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let bytes = serde_json::to_vec_pretty(value)?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
    tmp.write_all(&bytes).map_err(|e| Error::io(tmp.path(), e))?;
    tmp.as_file().sync_all().map_err(|e| Error::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| Error::io(path, e.error))?;
    Ok(())
}
