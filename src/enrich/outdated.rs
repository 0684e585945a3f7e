use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;
use tracing::warn;

use crate::models::{DependencyKind, Ecosystem, OutdatedRecord};

use super::run_tool;

/// List packages with newer versions available. Java has no implemented
/// staleness source (registry lookups are out of scope) and returns
/// empty.
pub async fn check(root: &Path, ecosystem: Ecosystem) -> Vec<OutdatedRecord> {
    match ecosystem {
        Ecosystem::Node => check_node(root).await,
        Ecosystem::Python => check_python(root).await,
        Ecosystem::Java => Vec::new(),
    }
}

/// `npm outdated --json` exits 1 when anything is outdated; the JSON on
/// stdout is still the success payload.
async fn check_node(root: &Path) -> Vec<OutdatedRecord> {
    let Some((stdout, _)) = run_tool("npm", &["outdated", "--json"], root).await else {
        return Vec::new();
    };

    let data = match serde_json::from_str::<Value>(&stdout) {
        Ok(data) => data,
        Err(_) => {
            warn!("npm outdated produced unparsable output");
            return Vec::new();
        }
    };

    let kinds = declaration_kinds(root);
    let mut outdated = Vec::new();

    if let Some(packages) = data.as_object() {
        for (package, info) in packages {
            let current = info.get("current").and_then(|v| v.as_str()).unwrap_or("unknown");
            let wanted = info.get("wanted").and_then(|v| v.as_str()).unwrap_or(current);
            let latest = info.get("latest").and_then(|v| v.as_str()).unwrap_or(wanted);
            outdated.push(OutdatedRecord {
                package: package.clone(),
                current_version: current.to_string(),
                wanted_version: wanted.to_string(),
                latest_version: latest.to_string(),
                kind: kinds.get(package).copied(),
            });
        }
    }

    outdated
}

/// Which declaration block each package.json entry belongs to, for
/// labeling outdated records.
fn declaration_kinds(root: &Path) -> HashMap<String, DependencyKind> {
    let mut kinds = HashMap::new();
    let Ok(content) = std::fs::read_to_string(root.join("package.json")) else {
        return kinds;
    };
    let Ok(json) = serde_json::from_str::<Value>(&content) else {
        return kinds;
    };

    let sections = [
        ("dependencies", DependencyKind::Runtime),
        ("devDependencies", DependencyKind::Dev),
    ];
    for (section, kind) in sections {
        if let Some(pkgs) = json.get(section).and_then(|v| v.as_object()) {
            for name in pkgs.keys() {
                kinds.entry(name.clone()).or_insert(kind);
            }
        }
    }

    kinds
}

/// `pip list --outdated --format json` emits an array of objects with
/// current/latest version fields.
async fn check_python(root: &Path) -> Vec<OutdatedRecord> {
    let Some((stdout, _)) = run_tool("pip", &["list", "--outdated", "--format", "json"], root).await
    else {
        return Vec::new();
    };

    let data = match serde_json::from_str::<Value>(&stdout) {
        Ok(data) => data,
        Err(_) => {
            warn!("pip list --outdated produced unparsable output");
            return Vec::new();
        }
    };

    let mut outdated = Vec::new();
    if let Some(entries) = data.as_array() {
        for pkg in entries {
            let Some(name) = pkg.get("name").and_then(|v| v.as_str()) else {
                continue;
            };
            let current = pkg.get("version").and_then(|v| v.as_str()).unwrap_or("unknown");
            let latest = pkg
                .get("latest_version")
                .and_then(|v| v.as_str())
                .unwrap_or(current);
            outdated.push(OutdatedRecord {
                package: name.to_string(),
                current_version: current.to_string(),
                wanted_version: latest.to_string(),
                latest_version: latest.to_string(),
                kind: Some(DependencyKind::Runtime),
            });
        }
    }

    outdated
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_declaration_kinds_lookup() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("package.json"),
            r#"{
  "dependencies": { "react": "^18.0.0" },
  "devDependencies": { "jest": "^29.0.0" }
}"#,
        )
        .unwrap();

        let kinds = declaration_kinds(dir.path());
        assert_eq!(kinds.get("react"), Some(&DependencyKind::Runtime));
        assert_eq!(kinds.get("jest"), Some(&DependencyKind::Dev));
        assert_eq!(kinds.get("lodash"), None);
    }

    #[tokio::test]
    async fn test_java_has_no_staleness_source() {
        let dir = tempdir().unwrap();
        let records = check(dir.path(), Ecosystem::Java).await;
        assert!(records.is_empty());
    }
}
