use std::path::Path;

use serde_json::Value;

use crate::error::AnalyzeError;
use crate::models::{DeclaredDependency, DependencyKind};

const CHECKED_FILES: &[&str] = &["package.json"];

/// Parses `package.json` dependency blocks. Version ranges are preserved
/// verbatim, not resolved.
pub struct NodeManifestParser;

impl NodeManifestParser {
    pub fn new() -> Self {
        Self
    }
}

impl super::ManifestParser for NodeManifestParser {
    fn parse(&self, root: &Path) -> Result<Vec<DeclaredDependency>, AnalyzeError> {
        let manifest = root.join("package.json");
        if !manifest.exists() {
            return Err(super::manifest_not_found(root, CHECKED_FILES));
        }

        let content =
            std::fs::read_to_string(&manifest).map_err(|e| AnalyzeError::ManifestRead {
                path: manifest.display().to_string(),
                source: e,
            })?;

        let deps = match serde_json::from_str::<Value>(&content) {
            Ok(json) => parse_package_json(&json),
            Err(_) => Vec::new(),
        };

        if deps.is_empty() {
            return Err(super::manifest_not_found(root, CHECKED_FILES));
        }
        Ok(deps)
    }
}

fn parse_package_json(json: &Value) -> Vec<DeclaredDependency> {
    let mut deps = Vec::new();

    let sections = [
        ("dependencies", DependencyKind::Runtime),
        ("devDependencies", DependencyKind::Dev),
    ];

    for (section, kind) in sections {
        if let Some(pkgs) = json.get(section).and_then(|v| v.as_object()) {
            for (name, version_range) in pkgs {
                deps.push(DeclaredDependency {
                    name: name.clone(),
                    version: version_range.as_str().unwrap_or("*").to_string(),
                    kind,
                    source_file: "package.json".to_string(),
                });
            }
        }
    }

    deps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ManifestParser;
    use tempfile::tempdir;

    #[test]
    fn test_parse_dependencies_and_dev_dependencies() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("package.json"),
            r#"{
  "name": "my-app",
  "dependencies": { "express": "^4.18.2", "lodash": "^4.17.21" },
  "devDependencies": { "jest": "^29.0.0" }
}"#,
        )
        .unwrap();

        let deps = NodeManifestParser::new().parse(dir.path()).unwrap();
        assert_eq!(deps.len(), 3);

        let express = deps.iter().find(|d| d.name == "express").unwrap();
        assert_eq!(express.version, "^4.18.2");
        assert_eq!(express.kind, DependencyKind::Runtime);
        assert_eq!(express.source_file, "package.json");

        let jest = deps.iter().find(|d| d.name == "jest").unwrap();
        assert_eq!(jest.kind, DependencyKind::Dev);
    }

    #[test]
    fn test_missing_manifest_is_fatal() {
        let dir = tempdir().unwrap();
        let err = NodeManifestParser::new().parse(dir.path()).unwrap_err();
        assert!(matches!(err, AnalyzeError::ManifestNotFound { .. }));
    }

    #[test]
    fn test_manifest_without_dependencies_is_fatal() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("package.json"), r#"{"name": "empty"}"#).unwrap();
        let err = NodeManifestParser::new().parse(dir.path()).unwrap_err();
        assert!(matches!(err, AnalyzeError::ManifestNotFound { .. }));
    }
}
