use std::path::Path;

use async_trait::async_trait;
use regex::Regex;

use crate::error::AnalyzeError;
use crate::models::UsageReference;

use super::{collect_source_files, first_match, read_sources, relative_path, SourceScanner};

const SOURCE_EXTENSIONS: &[&str] = &["py"];

const IGNORE_DIRS: &[&str] = &[
    ".git",
    "dist",
    "build",
    "__pycache__",
    "venv",
    "env",
    ".venv",
    "node_modules",
];

/// Standard-library modules that must never be reported as dependencies.
const STDLIB_MODULES: &[&str] = &[
    "abc", "argparse", "asyncio", "base64", "collections", "concurrent", "configparser",
    "contextlib", "copy", "csv", "dataclasses", "datetime", "decimal", "email", "enum",
    "functools", "glob", "gzip", "hashlib", "heapq", "html", "http", "importlib", "inspect",
    "io", "itertools", "json", "logging", "math", "multiprocessing", "os", "pathlib", "pickle",
    "platform", "queue", "random", "re", "secrets", "select", "shutil", "signal", "socket",
    "sqlite3", "ssl", "statistics", "string", "struct", "subprocess", "sys", "tarfile",
    "tempfile", "textwrap", "threading", "time", "traceback", "types", "typing", "unittest",
    "urllib", "uuid", "warnings", "weakref", "xml", "zipfile",
];

/// Ordered patterns: `import pkg` then `from pkg import ...`. One line can
/// only be one of the two forms.
fn import_rules() -> Result<Vec<Regex>, regex::Error> {
    [
        r"^import\s+([A-Za-z0-9_.]+)",
        r"^from\s+([A-Za-z0-9_.]+)\s+import",
    ]
    .iter()
    .map(|p| Regex::new(p))
    .collect()
}

/// Canonicalize a dotted import to its leading segment and filter
/// relative imports and the standard library.
fn package_name(dotted: &str) -> Option<String> {
    if dotted.starts_with('.') {
        return None;
    }
    let root = dotted.split('.').next().unwrap_or(dotted);
    if root.is_empty() || STDLIB_MODULES.contains(&root) {
        return None;
    }
    Some(root.to_string())
}

/// Scanner for Python projects: lexical import extraction over `.py`
/// files.
pub struct PythonSourceScanner {
    extra_ignore: Vec<String>,
}

impl PythonSourceScanner {
    pub fn new(extra_ignore: &[String]) -> Self {
        Self {
            extra_ignore: extra_ignore.to_vec(),
        }
    }

    fn extract_imports(&self, rules: &[Regex], rel: &str, content: &str) -> Vec<UsageReference> {
        let mut refs = Vec::new();
        for (index, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if let Some(dotted) = first_match(rules, trimmed) {
                if let Some(name) = package_name(&dotted) {
                    refs.push(UsageReference {
                        package_name: name,
                        file: rel.to_string(),
                        line: index + 1,
                        reason: None,
                    });
                }
            }
        }
        refs
    }
}

#[async_trait]
impl SourceScanner for PythonSourceScanner {
    async fn scan(&self, root: &Path) -> Result<Vec<UsageReference>, AnalyzeError> {
        let rules = import_rules()?;
        let files = collect_source_files(
            root,
            SOURCE_EXTENSIONS,
            IGNORE_DIRS,
            &self.extra_ignore,
            &[],
        );

        let mut refs = Vec::new();
        for (path, content) in read_sources(&files).await {
            let rel = relative_path(root, &path);
            refs.extend(self.extract_imports(&rules, &rel, &content));
        }

        Ok(refs)
    }
}
