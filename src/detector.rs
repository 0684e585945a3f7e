use std::path::Path;

use crate::models::Ecosystem;

/// Marker files checked in fixed priority order. First hit wins.
const MARKERS: &[(&str, Ecosystem)] = &[
    ("package.json", Ecosystem::Node),
    ("requirements.txt", Ecosystem::Python),
    ("setup.py", Ecosystem::Python),
    ("pyproject.toml", Ecosystem::Python),
    ("pom.xml", Ecosystem::Java),
    ("build.gradle", Ecosystem::Java),
    ("build.gradle.kts", Ecosystem::Java),
];

/// Auto-detect the project ecosystem from manifest marker files.
/// Falls back to Node.js when nothing is recognized; the manifest parser
/// will then report what it actually looked for.
pub fn detect_ecosystem(path: &Path) -> Ecosystem {
    for (marker, ecosystem) in MARKERS {
        if path.join(marker).exists() {
            return *ecosystem;
        }
    }
    Ecosystem::Node
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_detects_node_project() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("package.json"), "{}").unwrap();
        assert_eq!(detect_ecosystem(dir.path()), Ecosystem::Node);
    }

    #[test]
    fn test_detects_python_project() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("requirements.txt"), "requests==2.28.1").unwrap();
        assert_eq!(detect_ecosystem(dir.path()), Ecosystem::Python);
    }

    #[test]
    fn test_detects_java_project() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("build.gradle"), "").unwrap();
        assert_eq!(detect_ecosystem(dir.path()), Ecosystem::Java);
    }

    #[test]
    fn test_node_takes_priority_over_python() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("package.json"), "{}").unwrap();
        std::fs::write(dir.path().join("requirements.txt"), "flask").unwrap();
        assert_eq!(detect_ecosystem(dir.path()), Ecosystem::Node);
    }

    #[test]
    fn test_defaults_to_node() {
        let dir = tempdir().unwrap();
        assert_eq!(detect_ecosystem(dir.path()), Ecosystem::Node);
    }
}
