use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::extract::extension_of;

/// Expand the given paths into the files to ingest.
///
/// Files are taken as-is, whatever their extension, so the store can report
/// unsupported formats. Directories are walked recursively and only files
/// with a supported extension are kept, skipping VCS and build directories.
/// Directory results are sorted for deterministic ordering.
pub fn collect_files(paths: &[PathBuf], supported: &[&str]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            files.extend(scan_dir(path, supported)?);
        } else {
            bail!("Path does not exist: {}", path.display());
        }
    }
    Ok(files)
}

fn scan_dir(root: &Path, supported: &[&str]) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let walker = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_excluded_dir(e.file_name().to_string_lossy().as_ref()));
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let ext = extension_of(entry.path());
        if supported.contains(&ext.as_str()) {
            found.push(entry.into_path());
        }
    }
    found.sort();
    Ok(found)
}

fn is_excluded_dir(name: &str) -> bool {
    matches!(name, ".git" | "target" | "node_modules")
}
