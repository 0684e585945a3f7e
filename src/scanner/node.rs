use std::path::Path;

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;

use crate::error::AnalyzeError;
use crate::models::{UsageReference, REASON_REACT_PEER, REASON_REACT_SCRIPTS_PEER};

use super::{collect_source_files, first_match, read_sources, relative_path, SourceScanner};

const SOURCE_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx"];

const IGNORE_DIRS: &[&str] = &["node_modules", ".git", "dist", "build", "coverage"];

/// Generated bundles are never hand-written imports.
const IGNORE_SUFFIXES: &[&str] = &[".min.js", ".bundle.js"];

const BUILTIN_MODULES: &[&str] = &[
    "path", "fs", "os", "http", "https", "url", "util", "stream", "events", "buffer", "crypto",
    "zlib", "child_process", "cluster", "dgram", "dns", "net", "readline", "repl", "tls", "vm",
    "worker_threads", "assert", "console", "process", "querystring", "string_decoder", "timers",
    "tty", "v8", "perf_hooks",
];

/// Configuration files whose presence at the project root implies the
/// packages they configure are in use, independent of any import.
const CONFIG_FILES: &[(&str, &[&str])] = &[
    ("tailwind.config.js", &["tailwindcss"]),
    ("tailwind.config.ts", &["tailwindcss"]),
    ("postcss.config.js", &["postcss", "autoprefixer", "tailwindcss"]),
    ("postcss.config.ts", &["postcss", "autoprefixer", "tailwindcss"]),
];

/// Ordered extraction patterns, most specific first. Evaluation stops at
/// the first match per line.
fn import_rules() -> Result<Vec<Regex>, regex::Error> {
    [
        // import Default, { named } from 'package'
        r#"^import\s+[\w\s,{}]+\s+from\s+['"]([^'"]+)['"]"#,
        // import { named1, named2 } from 'package'
        r#"^import\s+\{[^}]+\}\s+from\s+['"]([^'"]+)['"]"#,
        // import Default from 'package'
        r#"^import\s+\w+\s+from\s+['"]([^'"]+)['"]"#,
        // import * as name from 'package'
        r#"^import\s+\*\s+as\s+\w+\s+from\s+['"]([^'"]+)['"]"#,
        // side-effect import: import 'package'
        r#"^import\s+['"]([^'"]+)['"]"#,
        // CommonJS require('package')
        r#"require\s*\(\s*['"]([^'"]+)['"]\s*\)"#,
        // dynamic import('package')
        r#"import\s*\(\s*['"]([^'"]+)['"]\s*\)"#,
    ]
    .iter()
    .map(|p| Regex::new(p))
    .collect()
}

/// Resolve a raw module path to a canonical npm package name.
///
/// Relative and absolute paths are intra-project references, built-in
/// module names are not dependencies. Scoped identifiers keep their first
/// two path segments, ordinary identifiers only the first.
fn package_name(module_path: &str) -> Option<String> {
    if module_path.starts_with('.') || module_path.starts_with('/') {
        return None;
    }

    let base = module_path.split('/').next().unwrap_or(module_path);
    if BUILTIN_MODULES.contains(&base) {
        return None;
    }

    let name = if module_path.starts_with('@') {
        let mut segments = module_path.split('/');
        match (segments.next(), segments.next()) {
            (Some(scope), Some(pkg)) => format!("{}/{}", scope, pkg),
            (Some(scope), None) => scope.to_string(),
            _ => return None,
        }
    } else {
        base.to_string()
    };

    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Scanner for JavaScript/TypeScript projects.
///
/// Beyond import statements it gathers ecosystem-specific signals: the
/// Tailwind at-rule in stylesheets, named configuration files, package
/// scripts, and peer-dependency inference for the react toolchain.
pub struct NodeSourceScanner {
    extra_ignore: Vec<String>,
}

impl NodeSourceScanner {
    pub fn new(extra_ignore: &[String]) -> Self {
        Self {
            extra_ignore: extra_ignore.to_vec(),
        }
    }

    fn extract_imports(&self, rules: &[Regex], rel: &str, content: &str) -> Vec<UsageReference> {
        let mut refs = Vec::new();
        for (index, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with("//") || trimmed.starts_with("/*") {
                continue;
            }
            if let Some(module_path) = first_match(rules, trimmed) {
                if let Some(name) = package_name(&module_path) {
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

    /// A `@tailwind` at-rule in any stylesheet implies the tailwind build
    /// chain is in use: the at-rule's own package plus the two collaborator
    /// packages it always pulls in.
    async fn scan_stylesheets(&self, root: &Path, refs: &mut Vec<UsageReference>) {
        let css_files =
            collect_source_files(root, &["css"], IGNORE_DIRS, &self.extra_ignore, &[]);
        for (path, content) in read_sources(&css_files).await {
            if !content.contains("@tailwind") {
                continue;
            }
            let rel = relative_path(root, &path);
            let implied = [
                ("tailwindcss", "css @tailwind directive"),
                ("autoprefixer", "used with tailwind css"),
                ("postcss", "css processor for tailwind"),
            ];
            for (name, reason) in implied {
                refs.push(UsageReference {
                    package_name: name.to_string(),
                    file: rel.clone(),
                    line: 1,
                    reason: Some(reason.to_string()),
                });
            }
        }
    }

    fn scan_config_files(&self, root: &Path, refs: &mut Vec<UsageReference>) {
        for (file, packages) in CONFIG_FILES {
            if !root.join(file).exists() {
                continue;
            }
            for name in *packages {
                refs.push(UsageReference {
                    package_name: name.to_string(),
                    file: file.to_string(),
                    line: 1,
                    reason: Some(format!("configuration file: {}", file)),
                });
            }
        }
    }

    /// Named CLI tools referenced from `package.json` scripts count as
    /// used even though nothing imports them.
    fn scan_package_scripts(&self, root: &Path, refs: &mut Vec<UsageReference>) {
        let Ok(content) = std::fs::read_to_string(root.join("package.json")) else {
            return;
        };
        let Ok(json) = serde_json::from_str::<Value>(&content) else {
            return;
        };
        let Some(scripts) = json.get("scripts") else {
            return;
        };
        let scripts_text = scripts.to_string();

        let mut imply = |name: &str| {
            refs.push(UsageReference {
                package_name: name.to_string(),
                file: "package.json".to_string(),
                line: 1,
                reason: Some("referenced in npm scripts".to_string()),
            });
        };

        if scripts_text.contains("react-scripts") {
            imply("react-scripts");
        }
        if scripts_text.contains("concurrently") {
            imply("concurrently");
        }
        if scripts_text.contains("tailwindcss") || scripts_text.contains("postcss") {
            imply("tailwindcss");
        }
    }

    /// Peer-dependency inference, applied before reconciliation so inferred
    /// packages classify as used rather than missing.
    fn apply_peer_inference(&self, refs: &mut Vec<UsageReference>) {
        let has = |refs: &[UsageReference], name: &str| {
            refs.iter().any(|r| r.package_name == name)
        };
        let inferred = |name: &str, reason: &str| UsageReference {
            package_name: name.to_string(),
            file: "package.json".to_string(),
            line: 1,
            reason: Some(reason.to_string()),
        };

        if has(refs, "react") && !has(refs, "react-dom") {
            refs.push(inferred("react-dom", REASON_REACT_PEER));
        }

        if has(refs, "react-scripts") {
            if !has(refs, "react") {
                refs.push(inferred("react", REASON_REACT_SCRIPTS_PEER));
            }
            if !has(refs, "react-dom") {
                refs.push(inferred("react-dom", REASON_REACT_SCRIPTS_PEER));
            }
        }
    }
}

#[async_trait]
impl SourceScanner for NodeSourceScanner {
    async fn scan(&self, root: &Path) -> Result<Vec<UsageReference>, AnalyzeError> {
        let rules = import_rules()?;
        let files = collect_source_files(
            root,
            SOURCE_EXTENSIONS,
            IGNORE_DIRS,
            &self.extra_ignore,
            IGNORE_SUFFIXES,
        );

        let mut refs = Vec::new();
        for (path, content) in read_sources(&files).await {
            let rel = relative_path(root, &path);
            refs.extend(self.extract_imports(&rules, &rel, &content));
        }

        self.scan_stylesheets(root, &mut refs).await;
        self.scan_config_files(root, &mut refs);
        self.scan_package_scripts(root, &mut refs);
        self.apply_peer_inference(&mut refs);

        Ok(refs)
    }
}
