//! # rag-store
//!
//! Document ingestion, content-addressed storage, and lexical retrieval for
//! chat clients that augment prompts with context from user documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌────────────────────────┐
//! │   Extract    │──▶│    Chunk     │──▶│     DocumentStore      │
//! │ txt/pdf/docx │   │ word windows │   │ <hash>.json + index    │
//! └──────────────┘   └──────────────┘   └───────────┬────────────┘
//!                                                   │
//!                                  search / context for a chat prompt
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use rag_store::processor::DocumentProcessor;
//! use rag_store::store::DocumentStore;
//!
//! let mut store = DocumentStore::open("./documents", DocumentProcessor::default())?;
//! let hash = store.add_document("notes/ollama.md", None)?;
//! let context = store.get_context_for_query("ollama", 3);
//! println!("{hash}: {context}");
//! # Ok::<(), rag_store::Error>(())
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Documents, chunks, index, and result types |
//! | [`encoding`] | Ordered text decoders for plain-text files |
//! | [`extract`] | Format dispatch and text extraction |
//! | [`chunk`] | Overlapping word-window chunking |
//! | [`processor`] | File → document pipeline and content hashing |
//! | [`search`] | Relevance scoring, ranking, context formatting |
//! | [`store`] | Persistent document store |
//! | [`connector_fs`] | Expanding paths and directories into files |

pub mod chunk;
pub mod config;
pub mod connector_fs;
pub mod encoding;
pub mod error;
pub mod extract;
pub mod models;
pub mod processor;
pub mod search;
pub mod store;

pub use error::{Error, ExtractError, Result};
pub use models::{Chunk, Document, DocumentSummary, Metadata, SearchResult};
pub use processor::DocumentProcessor;
pub use store::DocumentStore;
