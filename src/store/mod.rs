//! Content-addressed document store.
//!
//! [`DocumentStore`] owns a storage directory holding one `<hash>.json`
//! storage unit per document plus `document_index.json`, the catalog of
//! everything stored. The index is kept in memory for the store's lifetime
//! and rewritten after every mutation; storage units are read on demand.
//!
//! The store assumes a single writer. Mutating methods take `&mut self`,
//! and the type is `Send`, so it can be handed to a background thread.
//!
//! # Operations
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`add_document`](DocumentStore::add_document) | Ingest a file, rejecting duplicate content |
//! | [`get_document`](DocumentStore::get_document) | Load a full document by hash |
//! | [`remove_document`](DocumentStore::remove_document) | Delete a document and its index entry |
//! | [`list_documents`](DocumentStore::list_documents) | Summaries, newest first |
//! | [`search_documents`](DocumentStore::search_documents) | Ranked matching chunks |
//! | [`get_context_for_query`](DocumentStore::get_context_for_query) | Prompt-ready context string |

pub mod index;

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::models::{
    meta_str, meta_u64, timestamp_now, Document, DocumentIndex, DocumentSummary, IndexEntry,
    Metadata, SearchResult, META_FILENAME, META_SIZE_BYTES, META_WORD_COUNT,
};
use crate::processor::DocumentProcessor;
use crate::search;

pub use index::INDEX_FILE_NAME;

pub const DEFAULT_MAX_RESULTS: usize = 5;
pub const DEFAULT_MAX_CHUNKS: usize = 3;

pub struct DocumentStore {
    storage_dir: PathBuf,
    index_path: PathBuf,
    processor: DocumentProcessor,
    index: DocumentIndex,
}

impl DocumentStore {
    /// Open (creating if needed) the store rooted at `storage_dir`.
    ///
    /// A missing or unreadable index starts the store empty.
    pub fn open(storage_dir: impl Into<PathBuf>, processor: DocumentProcessor) -> Result<Self> {
        let storage_dir = storage_dir.into();
        std::fs::create_dir_all(&storage_dir).map_err(|e| Error::io(&storage_dir, e))?;
        let index_path = storage_dir.join(INDEX_FILE_NAME);
        let index = index::load_index(&index_path);
        tracing::debug!(
            dir = %storage_dir.display(),
            documents = index.documents.len(),
            "opened document store"
        );
        Ok(Self {
            storage_dir,
            index_path,
            processor,
            index,
        })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    pub fn processor(&self) -> &DocumentProcessor {
        &self.processor
    }

    pub fn index(&self) -> &DocumentIndex {
        &self.index
    }

    pub fn has_documents(&self) -> bool {
        !self.index.documents.is_empty()
    }

    pub fn contains(&self, content_hash: &str) -> bool {
        self.index.documents.contains_key(content_hash)
    }

    /// Ingest the file at `path` and return its content hash.
    ///
    /// Content already in the store is rejected with
    /// [`Error::DuplicateDocument`] before anything is written.
    pub fn add_document(
        &mut self,
        path: impl AsRef<Path>,
        metadata: Option<&Metadata>,
    ) -> Result<String> {
        let path = path.as_ref();
        let doc = self.processor.process_document(path, metadata)?;
        let hash = doc.content_hash.clone();

        if let Some(existing) = self.index.documents.get(&hash) {
            return Err(Error::DuplicateDocument {
                existing_filename: meta_str(&existing.metadata, META_FILENAME)
                    .unwrap_or_default()
                    .to_string(),
                content_hash: hash,
            });
        }

        let doc_file = self.storage_dir.join(format!("{hash}.json"));
        index::write_json_atomic(&doc_file, &doc)?;

        self.index.documents.insert(
            hash.clone(),
            IndexEntry {
                metadata: doc.metadata,
                storage_file: doc_file.display().to_string(),
                added_at: timestamp_now(),
            },
        );
        self.save_index();

        tracing::debug!(file = %path.display(), hash = %hash, chunks = doc.chunk_count, "added document");
        Ok(hash)
    }

    /// Load a stored document. `None` if the hash is unknown or its storage
    /// unit cannot be read.
    pub fn get_document(&self, content_hash: &str) -> Option<Document> {
        let entry = self.index.documents.get(content_hash)?;
        let path = Path::new(&entry.storage_file);
        let loaded = std::fs::read(path)
            .map_err(|e| Error::io(path, e))
            .and_then(|bytes| serde_json::from_slice::<Document>(&bytes).map_err(Error::from));
        match loaded {
            Ok(mut doc) => {
                doc.content_hash = content_hash.to_string();
                Some(doc)
            }
            Err(e) => {
                tracing::warn!(hash = content_hash, error = %e, "error loading document");
                None
            }
        }
    }

    /// Delete a document. Returns `Ok(false)` if the hash is unknown.
    ///
    /// A storage unit that is already gone is not an error. Any other
    /// deletion failure is returned and the index is left untouched.
    pub fn remove_document(&mut self, content_hash: &str) -> Result<bool> {
        let Some(entry) = self.index.documents.get(content_hash) else {
            return Ok(false);
        };
        let path = PathBuf::from(&entry.storage_file);
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "storage unit already deleted");
            }
            Err(e) => return Err(Error::io(path, e)),
        }

        self.index.documents.shift_remove(content_hash);
        self.save_index();
        tracing::debug!(hash = content_hash, "removed document");
        Ok(true)
    }

    /// One summary per stored document, most recently added first.
    pub fn list_documents(&self) -> Vec<DocumentSummary> {
        let mut summaries: Vec<DocumentSummary> = self
            .index
            .documents
            .iter()
            .map(|(hash, entry)| DocumentSummary {
                content_hash: hash.clone(),
                filename: meta_str(&entry.metadata, META_FILENAME)
                    .unwrap_or_default()
                    .to_string(),
                size_bytes: meta_u64(&entry.metadata, META_SIZE_BYTES).unwrap_or_default(),
                word_count: meta_u64(&entry.metadata, META_WORD_COUNT).unwrap_or_default(),
                added_at: entry.added_at.clone(),
            })
            .collect();
        summaries.sort_by(|a, b| b.added_at.cmp(&a.added_at));
        summaries
    }

    /// Chunks containing `query` (case-insensitive), best first.
    pub fn search_documents(&self, query: &str, max_results: usize) -> Vec<SearchResult> {
        let query_lower = query.to_lowercase();
        if query_lower.is_empty() {
            return Vec::new();
        }
        let mut results = Vec::new();
        for hash in self.index.documents.keys() {
            if let Some(doc) = self.get_document(hash) {
                search::collect_matches(hash, &doc, &query_lower, &mut results);
            }
        }
        search::rank(results, max_results)
    }

    /// Context block for a chat prompt, or `""` when nothing matches.
    pub fn get_context_for_query(&self, query: &str, max_chunks: usize) -> String {
        let results = self.search_documents(query, max_chunks);
        search::format_context(&results)
    }

    fn save_index(&mut self) {
        index::save_index(&self.index_path, &mut self.index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn store_in(tmp: &TempDir) -> DocumentStore {
        DocumentStore::open(tmp.path().join("store"), DocumentProcessor::default()).unwrap()
    }

    fn assert_send<T: Send>() {}

    #[test]
    fn store_is_send() {
        assert_send::<DocumentStore>();
    }

    #[test]
    fn open_creates_directory_with_empty_index() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        assert!(store.storage_dir().is_dir());
        assert!(!store.has_documents());
        assert!(store.list_documents().is_empty());
        // Nothing is written until the first mutation.
        assert!(!store.index_path().exists());
    }

    #[test]
    fn add_writes_storage_unit_and_index() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a.txt");
        fs::write(&file, "hello store").unwrap();

        let mut store = store_in(&tmp);
        let hash = store.add_document(&file, None).unwrap();

        let unit = store.storage_dir().join(format!("{hash}.json"));
        assert!(unit.is_file());
        let index: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.index_path()).unwrap()).unwrap();
        assert_eq!(
            index["documents"][&hash]["storage_file"],
            serde_json::json!(unit.display().to_string())
        );
        assert!(index["last_updated"].is_string());
        assert!(store.contains(&hash));
    }

    #[test]
    fn unreadable_storage_unit_is_absent_and_skipped_by_search() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a.txt");
        fs::write(&file, "findable words").unwrap();
        let mut store = store_in(&tmp);
        let hash = store.add_document(&file, None).unwrap();

        fs::write(store.storage_dir().join(format!("{hash}.json")), "garbage").unwrap();
        assert!(store.get_document(&hash).is_none());
        assert!(store.search_documents("findable", 5).is_empty());
    }

    #[test]
    fn remove_tolerates_missing_storage_unit() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a.txt");
        fs::write(&file, "short lived").unwrap();
        let mut store = store_in(&tmp);
        let hash = store.add_document(&file, None).unwrap();

        fs::remove_file(store.storage_dir().join(format!("{hash}.json"))).unwrap();
        assert!(store.remove_document(&hash).unwrap());
        assert!(!store.has_documents());
    }

    #[test]
    fn empty_query_returns_nothing() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("a.txt");
        fs::write(&file, "anything at all").unwrap();
        let mut store = store_in(&tmp);
        store.add_document(&file, None).unwrap();
        assert!(store.search_documents("", 5).is_empty());
        assert_eq!(store.get_context_for_query("", 3), "");
    }

    #[test]
    fn corrupt_index_on_open_starts_empty() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("store");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(INDEX_FILE_NAME), "[1, 2").unwrap();
        let store = DocumentStore::open(&dir, DocumentProcessor::default()).unwrap();
        assert!(!store.has_documents());
    }
}
