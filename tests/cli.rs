use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn ragstore_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_ragstore"))
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let files_dir = root.join("files");
    fs::create_dir_all(files_dir.join("nested")).unwrap();
    fs::write(
        files_dir.join("alpha.md"),
        "# Alpha Document\n\nThis is the alpha document about Rust programming.\n\nIt contains information about cargo and crates.",
    )
    .unwrap();
    fs::write(
        files_dir.join("nested/gamma.txt"),
        "Gamma plain text file.\n\nContains notes about deployment and Rust infrastructure.",
    )
    .unwrap();
    fs::write(files_dir.join("ignored.bin"), [0u8, 1, 2, 3]).unwrap();

    let config_content = format!(
        r#"[storage]
dir = "{}/store"

[chunking]
chunk_size = 50
chunk_overlap = 10

[retrieval]
max_results = 5
max_chunks = 2
"#,
        root.display()
    );
    let config_path = root.join("ragstore.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = ragstore_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run ragstore binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn files_dir(config_path: &Path) -> String {
    config_path
        .parent()
        .unwrap()
        .join("files")
        .display()
        .to_string()
}

#[test]
fn test_add_directory_then_list() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run(&config_path, &["add", &files_dir(&config_path)]);
    assert!(success, "add failed: {}", stderr);
    assert!(stdout.contains("2 added, 0 skipped, 0 failed"), "stdout: {}", stdout);

    let (stdout, _, success) = run(&config_path, &["list"]);
    assert!(success);
    assert!(stdout.contains("alpha.md"));
    assert!(stdout.contains("gamma.txt"));
    assert!(!stdout.contains("ignored.bin"));
}

#[test]
fn test_re_adding_reports_duplicates() {
    let (_tmp, config_path) = setup_test_env();
    let dir = files_dir(&config_path);

    let (_, stderr, success) = run(&config_path, &["add", &dir]);
    assert!(success, "{}", stderr);
    let (stdout, stderr, success) = run(&config_path, &["add", &dir]);
    assert!(success, "{}", stderr);
    assert!(stdout.contains("0 added, 2 skipped, 0 failed"), "stdout: {}", stdout);
    assert!(stdout.contains("already stored as alpha.md"));
}

#[test]
fn test_add_unsupported_file_fails() {
    let (_tmp, config_path) = setup_test_env();
    let file = format!("{}/ignored.bin", files_dir(&config_path));

    let (_, stderr, success) = run(&config_path, &["add", &file]);
    assert!(!success);
    assert!(stderr.contains("unsupported file format: .bin"), "stderr: {}", stderr);
}

#[test]
fn test_search_and_context() {
    let (_tmp, config_path) = setup_test_env();
    run(&config_path, &["add", &files_dir(&config_path)]);

    let (stdout, _, success) = run(&config_path, &["search", "rust"]);
    assert!(success);
    assert!(stdout.contains("alpha.md"));
    assert!(stdout.contains("gamma.txt"));

    let (stdout, _, success) = run(&config_path, &["search", "kubernetes"]);
    assert!(success);
    assert!(stdout.contains("No results."));

    let (stdout, _, success) = run(&config_path, &["context", "cargo"]);
    assert!(success);
    assert!(stdout.starts_with("[From: alpha.md]\n# Alpha Document"));
}

#[test]
fn test_search_json_output() {
    let (_tmp, config_path) = setup_test_env();
    run(&config_path, &["add", &files_dir(&config_path)]);

    let (stdout, _, success) = run(&config_path, &["search", "deployment", "--json"]);
    assert!(success);
    let results: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let results = results.as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["filename"], "gamma.txt");
    assert_eq!(results[0]["chunk_index"], 0);
}

#[test]
fn test_show_and_remove() {
    let (_tmp, config_path) = setup_test_env();
    run(&config_path, &["add", &files_dir(&config_path)]);

    let (stdout, _, _) = run(&config_path, &["list", "--json"]);
    let docs: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let hash = docs[0]["content_hash"].as_str().unwrap().to_string();

    let (stdout, _, success) = run(&config_path, &["show", &hash]);
    assert!(success);
    assert!(stdout.contains("--- Chunks (1) ---"));

    let (stdout, _, success) = run(&config_path, &["remove", &hash]);
    assert!(success);
    assert!(stdout.contains(&format!("Removed {}", hash)));

    let (_, stderr, success) = run(&config_path, &["show", &hash]);
    assert!(!success);
    assert!(stderr.contains("document not found"));

    let (_, _, success) = run(&config_path, &["remove", &hash]);
    assert!(!success);
}

#[test]
fn test_formats_and_info() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run(&config_path, &["formats"]);
    assert!(success);
    let formats: Vec<&str> = stdout.lines().collect();
    assert_eq!(&formats[..3], &[".txt", ".md", ".py"]);

    let (stdout, _, success) = run(&config_path, &["info"]);
    assert!(success);
    assert!(stdout.contains("chunk size:    50 words"));
    assert!(stdout.contains("chunk overlap: 10 words"));
    assert!(stdout.contains("documents:     0"));
}

#[test]
fn test_invalid_config_rejected() {
    let (tmp, _) = setup_test_env();
    let bad = tmp.path().join("bad.toml");
    fs::write(&bad, "[chunking]\nchunk_size = 10\nchunk_overlap = 20\n").unwrap();

    let (_, stderr, success) = run(&bad, &["list"]);
    assert!(!success);
    assert!(stderr.contains("chunk_overlap"));
}

#[test]
fn test_formats_does_not_open_store() {
    let (tmp, config_path) = setup_test_env();
    let blocker = tmp.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();
    let dir = blocker.join("store").display().to_string();

    let (stdout, _, success) = run(&config_path, &["--dir", &dir, "formats"]);
    assert!(success);
    assert!(stdout.lines().any(|l| l == ".txt"));

    let (_, stderr, success) = run(&config_path, &["--dir", &dir, "list"]);
    assert!(!success);
    assert!(stderr.contains("Failed to open document store"));
}
