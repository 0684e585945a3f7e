use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::future::join_all;
use regex::Regex;
use tracing::warn;
use walkdir::WalkDir;

use crate::error::AnalyzeError;
use crate::models::UsageReference;

pub mod java;
pub mod node;
pub mod python;

/// How many files are read concurrently per batch. Bounds open file
/// descriptors on large trees.
const READ_BATCH: usize = 64;

/// Extracts per-file import references from a project tree and resolves
/// them to canonical package identifiers. Scanning never aborts on a bad
/// file; unreadable files are skipped with a logged warning.
#[async_trait]
pub trait SourceScanner: Send + Sync {
    async fn scan(&self, root: &Path) -> Result<Vec<UsageReference>, AnalyzeError>;
}

/// Walk the tree for files with one of `extensions`, pruning ignored
/// directory names and skipping ignored filename suffixes. Traversal is
/// sorted so repeated runs over an unchanged tree produce identical
/// reference order.
pub(crate) fn collect_source_files(
    root: &Path,
    extensions: &[&str],
    ignore_dirs: &[&str],
    extra_ignore_dirs: &[String],
    ignore_suffixes: &[&str],
) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            !ignore_dirs.contains(&name.as_ref())
                && !extra_ignore_dirs.iter().any(|d| d == name.as_ref())
        })
        .filter_map(|entry| entry.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_string_lossy();
            if ignore_suffixes.iter().any(|s| name.ends_with(s)) {
                return false;
            }
            e.path()
                .extension()
                .map(|ext| extensions.contains(&ext.to_string_lossy().as_ref()))
                .unwrap_or(false)
        })
        .map(|e| e.into_path())
        .collect()
}

/// Read files concurrently in bounded batches. Files that cannot be read
/// are dropped from the result with a warning; the scan continues.
pub(crate) async fn read_sources(files: &[PathBuf]) -> Vec<(PathBuf, String)> {
    let mut out = Vec::with_capacity(files.len());

    for chunk in files.chunks(READ_BATCH) {
        let reads = chunk.iter().map(|path| async move {
            let result = tokio::fs::read_to_string(path).await;
            (path.clone(), result)
        });

        for (path, result) in join_all(reads).await {
            match result {
                Ok(content) => out.push((path, content)),
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "skipping unreadable source file");
                }
            }
        }
    }

    out
}

/// Evaluate an ordered rule list against one line, stopping at the first
/// pattern that matches. Import statement forms are mutually exclusive
/// within a single line, so first-match-wins preserves precedence.
pub(crate) fn first_match(rules: &[Regex], line: &str) -> Option<String> {
    for rule in rules {
        if let Some(caps) = rule.captures(line) {
            if let Some(m) = caps.get(caps.len() - 1) {
                return Some(m.as_str().to_string());
            }
        }
    }
    None
}

/// Path of `file` relative to the project root, for report output.
pub(crate) fn relative_path(root: &Path, file: &Path) -> String {
    file.strip_prefix(root)
        .unwrap_or(file)
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_collect_prunes_ignored_dirs_and_suffixes() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::create_dir_all(dir.path().join("node_modules/react")).unwrap();
        std::fs::write(dir.path().join("src/app.js"), "").unwrap();
        std::fs::write(dir.path().join("src/vendor.min.js"), "").unwrap();
        std::fs::write(dir.path().join("node_modules/react/index.js"), "").unwrap();
        std::fs::write(dir.path().join("readme.md"), "").unwrap();

        let files = collect_source_files(
            dir.path(),
            &["js"],
            &["node_modules"],
            &[],
            &[".min.js"],
        );
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("src/app.js"));
    }

    #[test]
    fn test_collect_honors_extra_ignore_dirs() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("generated")).unwrap();
        std::fs::write(dir.path().join("generated/gen.js"), "").unwrap();
        std::fs::write(dir.path().join("app.js"), "").unwrap();

        let files = collect_source_files(
            dir.path(),
            &["js"],
            &[],
            &["generated".to_string()],
            &[],
        );
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("app.js"));
    }

    #[test]
    fn test_first_match_stops_at_first_rule() {
        let rules = vec![
            Regex::new(r"^a(\w+)").unwrap(),
            Regex::new(r"(\w+)").unwrap(),
        ];
        assert_eq!(first_match(&rules, "abc").unwrap(), "bc");
        assert_eq!(first_match(&rules, "xyz").unwrap(), "xyz");
        assert!(first_match(&rules, "--").is_none());
    }
}
