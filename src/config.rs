//! TOML configuration for the document store.
//!
//! Every section is optional; an empty file is the same as
//! [`Config::default()`].
//!
//! ```toml
//! [storage]
//! dir = "/home/me/.ollama-gui-plus/documents"
//!
//! [chunking]
//! chunk_size = 1000
//! chunk_overlap = 200
//!
//! [retrieval]
//! max_results = 5
//! max_chunks = 3
//!
//! [extraction]
//! encodings = ["utf-8", "utf-16", "latin-1", "windows-1252"]
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::chunk::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use crate::encoding::{TextEncoding, DEFAULT_ENCODINGS};

/// Application directory used by existing stores, relative to `$HOME`.
const DEFAULT_STORAGE_SUBDIR: &str = ".ollama-gui-plus/documents";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}
fn default_chunk_overlap() -> usize {
    DEFAULT_CHUNK_OVERLAP
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_max_chunks")]
    pub max_chunks: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            max_chunks: default_max_chunks(),
        }
    }
}

fn default_max_results() -> usize {
    5
}
fn default_max_chunks() -> usize {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExtractionConfig {
    #[serde(default = "default_encodings")]
    pub encodings: Vec<TextEncoding>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            encodings: default_encodings(),
        }
    }
}

fn default_encodings() -> Vec<TextEncoding> {
    DEFAULT_ENCODINGS.to_vec()
}

impl Config {
    /// Configured storage directory, else `~/.ollama-gui-plus/documents`.
    pub fn storage_dir(&self) -> Result<PathBuf> {
        match &self.storage.dir {
            Some(dir) => Ok(dir.clone()),
            None => default_storage_dir()
                .context("could not determine home directory; set storage.dir"),
        }
    }
}

/// Per-user default storage directory, if a home directory is known.
pub fn default_storage_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DEFAULT_STORAGE_SUBDIR))
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    if config.chunking.chunk_size == 0 {
        bail!("chunking.chunk_size must be > 0");
    }
    if config.chunking.chunk_overlap >= config.chunking.chunk_size {
        bail!(
            "chunking.chunk_overlap ({}) must be smaller than chunking.chunk_size ({})",
            config.chunking.chunk_overlap,
            config.chunking.chunk_size
        );
    }
    if config.retrieval.max_results == 0 {
        bail!("retrieval.max_results must be >= 1");
    }
    if config.retrieval.max_chunks == 0 {
        bail!("retrieval.max_chunks must be >= 1");
    }
    if config.extraction.encodings.is_empty() {
        bail!("extraction.encodings must list at least one encoding");
    }

    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}
