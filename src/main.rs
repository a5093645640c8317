//! # ragstore CLI
//!
//! A thin command-line front end over [`rag_store::DocumentStore`], for
//! curating a document corpus and checking what a chat prompt would get.
//!
//! ## Usage
//!
//! ```bash
//! ragstore [--config ./ragstore.toml] [--dir <storage-dir>] <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ragstore add <paths>...` | Ingest files (directories are walked) |
//! | `ragstore list` | List stored documents, newest first |
//! | `ragstore show <hash>` | Print a stored document and its chunks |
//! | `ragstore remove <hash>` | Delete a stored document |
//! | `ragstore search "<query>"` | Ranked matching chunks |
//! | `ragstore context "<query>"` | The context block a chat prompt would receive |
//! | `ragstore formats` | Extensions this build can ingest |
//! | `ragstore info` | Storage location and chunking settings |
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use rag_store::config::{self, Config};
use rag_store::connector_fs;
use rag_store::models::Metadata;
use rag_store::{DocumentProcessor, DocumentStore, Error};

#[derive(Parser)]
#[command(
    name = "ragstore",
    about = "Ingest documents and retrieve prompt context from them",
    version
)]
struct Cli {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Storage directory, overriding `storage.dir` from the config.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest one or more files or directories.
    ///
    /// Content that is already stored is reported and skipped.
    Add {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Extra metadata attached to each document, as `key=value`.
        #[arg(long = "meta", value_parser = parse_key_value)]
        meta: Vec<(String, String)>,
    },

    /// List stored documents, most recently added first.
    List {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Print a stored document's metadata, text, and chunks.
    Show { hash: String },

    /// Remove a stored document.
    Remove { hash: String },

    /// Search stored chunks for a case-insensitive phrase.
    Search {
        query: String,

        /// Maximum number of results (defaults to `retrieval.max_results`).
        #[arg(long)]
        limit: Option<usize>,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Print the context block a chat prompt would receive for a query.
    Context {
        query: String,

        /// Maximum number of chunks (defaults to `retrieval.max_chunks`).
        #[arg(long)]
        max_chunks: Option<usize>,
    },

    /// List the file extensions this build can ingest.
    Formats,

    /// Show storage location, document count, and chunking settings.
    Info,
}

fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got '{s}'"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cfg = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Formats => {
            for ext in rag_store::extract::supported_formats() {
                println!("{}", ext);
            }
        }
        Commands::Add { paths, meta } => {
            let mut store = open_store(cli.dir, &cfg)?;
            run_add(&mut store, &paths, meta)?;
        }
        Commands::List { json } => run_list(&open_store(cli.dir, &cfg)?, json)?,
        Commands::Show { hash } => run_show(&open_store(cli.dir, &cfg)?, &hash),
        Commands::Remove { hash } => {
            let mut store = open_store(cli.dir, &cfg)?;
            if store.remove_document(&hash)? {
                println!("Removed {}", hash);
            } else {
                eprintln!("Error: document not found: {}", hash);
                std::process::exit(1);
            }
        }
        Commands::Search { query, limit, json } => {
            let store = open_store(cli.dir, &cfg)?;
            let limit = limit.unwrap_or(cfg.retrieval.max_results);
            let results = store.search_documents(&query, limit);
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else if results.is_empty() {
                println!("No results.");
            } else {
                for (i, r) in results.iter().enumerate() {
                    println!(
                        "{}. [{:.4}] {} (chunk {})",
                        i + 1,
                        r.relevance,
                        r.filename,
                        r.chunk_index
                    );
                    println!("    hash: {}", r.document_hash);
                    println!("    {}", preview(&r.text, 160));
                    println!();
                }
            }
        }
        Commands::Context { query, max_chunks } => {
            let store = open_store(cli.dir, &cfg)?;
            let max_chunks = max_chunks.unwrap_or(cfg.retrieval.max_chunks);
            println!("{}", store.get_context_for_query(&query, max_chunks));
        }
        Commands::Info => {
            let store = open_store(cli.dir, &cfg)?;
            let processor = store.processor();
            println!("storage dir:   {}", store.storage_dir().display());
            println!("documents:     {}", store.index().documents.len());
            println!("chunk size:    {} words", processor.chunk_size());
            println!("chunk overlap: {} words", processor.chunk_overlap());
            println!("formats:       {}", processor.supported_formats().join(" "));
            println!(
                "encodings:     {}",
                processor
                    .encodings()
                    .iter()
                    .map(|e| e.name())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }

    Ok(())
}

/// Open the store at `--dir`, or at the configured storage directory.
fn open_store(dir: Option<PathBuf>, cfg: &Config) -> Result<DocumentStore> {
    let storage_dir = match dir {
        Some(dir) => dir,
        None => cfg.storage_dir()?,
    };
    let processor = DocumentProcessor::from_config(cfg)?;
    DocumentStore::open(&storage_dir, processor)
        .with_context(|| format!("Failed to open document store at {}", storage_dir.display()))
}

fn run_add(store: &mut DocumentStore, paths: &[PathBuf], meta: Vec<(String, String)>) -> Result<()> {
    let supported = store.processor().supported_formats();
    let files = connector_fs::collect_files(paths, &supported)?;

    let extra: Option<Metadata> = if meta.is_empty() {
        None
    } else {
        Some(
            meta.into_iter()
                .map(|(k, v)| (k, serde_json::Value::String(v)))
                .collect(),
        )
    };

    let mut added = 0usize;
    let mut skipped = 0usize;
    let mut failed = 0usize;
    for file in &files {
        match store.add_document(file, extra.as_ref()) {
            Ok(hash) => {
                added += 1;
                println!("added    {}  {}", hash, file.display());
            }
            Err(Error::DuplicateDocument {
                existing_filename, ..
            }) => {
                skipped += 1;
                println!(
                    "skipped  {}  (already stored as {})",
                    file.display(),
                    existing_filename
                );
            }
            Err(e) => {
                failed += 1;
                eprintln!("Error: {}", e);
            }
        }
    }

    println!("add: {} added, {} skipped, {} failed", added, skipped, failed);
    if failed > 0 {
        bail!("{} file(s) could not be added", failed);
    }
    Ok(())
}

fn run_list(store: &DocumentStore, json: bool) -> Result<()> {
    let docs = store.list_documents();
    if json {
        println!("{}", serde_json::to_string_pretty(&docs)?);
        return Ok(());
    }
    if docs.is_empty() {
        println!("No documents.");
        return Ok(());
    }
    println!(
        "{:<32}  {:>10}  {:>8}  {:<26}  FILENAME",
        "HASH", "BYTES", "WORDS", "ADDED"
    );
    for d in &docs {
        println!(
            "{:<32}  {:>10}  {:>8}  {:<26}  {}",
            d.content_hash, d.size_bytes, d.word_count, d.added_at, d.filename
        );
    }
    Ok(())
}

fn run_show(store: &DocumentStore, hash: &str) {
    let Some(doc) = store.get_document(hash) else {
        eprintln!("Error: document not found: {}", hash);
        std::process::exit(1);
    };

    println!("--- Document ---");
    println!("hash:     {}", doc.content_hash);
    println!("filename: {}", doc.filename());
    println!("metadata: {}", serde_json::Value::Object(doc.metadata.clone()));
    println!();

    println!("--- Text ---");
    println!("{}", doc.text);
    println!();

    println!("--- Chunks ({}) ---", doc.chunk_count);
    for chunk in &doc.chunks {
        println!("[chunk {}] {} words", chunk.chunk_index, chunk.word_count);
        println!("{}", chunk.text);
        println!();
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        out.push('…');
    }
    out
}
