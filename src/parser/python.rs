use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use crate::error::AnalyzeError;
use crate::models::{DeclaredDependency, DependencyKind};

const CHECKED_FILES: &[&str] = &["requirements.txt", "setup.py", "pyproject.toml"];

/// Parses Python dependency declarations from `requirements.txt`,
/// `setup.py` and `pyproject.toml`, merged in that order. Sources are not
/// deduplicated against each other; a package may legitimately appear
/// twice with a different `source_file`.
pub struct PythonManifestParser;

impl PythonManifestParser {
    pub fn new() -> Self {
        Self
    }
}

impl super::ManifestParser for PythonManifestParser {
    fn parse(&self, root: &Path) -> Result<Vec<DeclaredDependency>, AnalyzeError> {
        let mut deps = Vec::new();

        let requirements = root.join("requirements.txt");
        if requirements.exists() {
            if let Ok(content) = std::fs::read_to_string(&requirements) {
                deps.extend(parse_requirements(&content)?);
            }
        }

        let setup = root.join("setup.py");
        if setup.exists() {
            if let Ok(content) = std::fs::read_to_string(&setup) {
                deps.extend(parse_setup_py(&content)?);
            }
        }

        let pyproject = root.join("pyproject.toml");
        if pyproject.exists() {
            if let Ok(content) = std::fs::read_to_string(&pyproject) {
                deps.extend(parse_pyproject(&content)?);
            }
        }

        if deps.is_empty() {
            return Err(super::manifest_not_found(root, CHECKED_FILES));
        }
        Ok(deps)
    }
}

fn make_dep(name: &str, version: &str, source_file: &str) -> DeclaredDependency {
    DeclaredDependency {
        name: name.to_string(),
        version: version.to_string(),
        kind: DependencyKind::Runtime,
        source_file: source_file.to_string(),
    }
}

/// Line-oriented `requirements.txt`: skip blank, comment and pip-flag
/// lines; `name (op version)?` with `op ∈ {==,>=,<=,!=,<,>}`; version
/// defaults to `"unknown"` when absent.
fn parse_requirements(content: &str) -> Result<Vec<DeclaredDependency>, AnalyzeError> {
    let re = Regex::new(r"^([A-Za-z0-9_\-]+[A-Za-z0-9._\-]*)\s*(?:(?:==|>=|<=|!=|<|>)\s*([^\s;,]+))?")?;
    let mut deps = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('-') {
            continue;
        }
        if let Some(caps) = re.captures(line) {
            let version = caps.get(2).map(|m| m.as_str()).unwrap_or("unknown");
            deps.push(make_dep(&caps[1], version, "requirements.txt"));
        }
    }

    Ok(deps)
}

/// Best-effort bracket scan over the `install_requires` list literal.
fn parse_setup_py(content: &str) -> Result<Vec<DeclaredDependency>, AnalyzeError> {
    let list_re = Regex::new(r"(?s)install_requires\s*=\s*\[([^\]]+)\]")?;
    let name_re = Regex::new(r"^([A-Za-z0-9_\-]+)")?;
    let mut deps = Vec::new();

    if let Some(caps) = list_re.captures(content) {
        for item in caps[1].split(',') {
            let item = item.trim().trim_matches(|c| c == '\'' || c == '"');
            if let Some(name) = name_re.captures(item) {
                deps.push(make_dep(&name[1], "unknown", "setup.py"));
            }
        }
    }

    Ok(deps)
}

#[derive(Debug, Deserialize)]
struct Pyproject {
    project: Option<PyprojectProject>,
}

#[derive(Debug, Deserialize)]
struct PyprojectProject {
    #[serde(default)]
    dependencies: Vec<String>,
}

/// `[project].dependencies` array of requirement strings.
fn parse_pyproject(content: &str) -> Result<Vec<DeclaredDependency>, AnalyzeError> {
    let pyproject: Pyproject = match toml::from_str(content) {
        Ok(p) => p,
        Err(_) => return Ok(Vec::new()),
    };

    let re = Regex::new(r"^([A-Za-z0-9_\-]+[A-Za-z0-9._\-]*)\s*(?:(?:==|>=|<=|!=|<|>)\s*([^\s;,\[]+))?")?;
    let mut deps = Vec::new();

    if let Some(project) = pyproject.project {
        for dep_str in &project.dependencies {
            if let Some(caps) = re.captures(dep_str.trim()) {
                let version = caps.get(2).map(|m| m.as_str()).unwrap_or("unknown");
                deps.push(make_dep(&caps[1], version, "pyproject.toml"));
            }
        }
    }

    Ok(deps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ManifestParser;
    use tempfile::tempdir;

    #[test]
    fn test_parse_requirements_txt() {
        let content = "# comment\n\nrequests==2.28.1\nflask>=2.0.0\nnumpy\n-r base.txt\n";
        let deps = parse_requirements(content).unwrap();
        assert_eq!(deps.len(), 3);
        assert_eq!(deps[0].name, "requests");
        assert_eq!(deps[0].version, "2.28.1");
        assert_eq!(deps[1].name, "flask");
        assert_eq!(deps[1].version, "2.0.0");
        assert_eq!(deps[2].name, "numpy");
        assert_eq!(deps[2].version, "unknown");
    }

    #[test]
    fn test_parse_setup_py_install_requires() {
        let content = r#"
from setuptools import setup

setup(
    name="demo",
    install_requires=[
        "requests>=2.0",
        'click',
    ],
)
"#;
        let deps = parse_setup_py(content).unwrap();
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].name, "requests");
        assert_eq!(deps[0].version, "unknown");
        assert_eq!(deps[1].name, "click");
    }

    #[test]
    fn test_parse_pyproject_dependencies() {
        let content = r#"
[project]
name = "demo"
dependencies = ["httpx==0.27.0", "pydantic"]
"#;
        let deps = parse_pyproject(content).unwrap();
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].name, "httpx");
        assert_eq!(deps[0].version, "0.27.0");
        assert_eq!(deps[0].source_file, "pyproject.toml");
    }

    #[test]
    fn test_sources_merge_without_dedup() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("requirements.txt"), "requests==2.28.1\n").unwrap();
        std::fs::write(
            dir.path().join("pyproject.toml"),
            "[project]\nname = \"demo\"\ndependencies = [\"requests\"]\n",
        )
        .unwrap();

        let deps = PythonManifestParser::new().parse(dir.path()).unwrap();
        let requests: Vec<_> = deps.iter().filter(|d| d.name == "requests").collect();
        assert_eq!(requests.len(), 2);
        assert_ne!(requests[0].source_file, requests[1].source_file);
    }

    #[test]
    fn test_no_manifest_is_fatal_with_checked_list() {
        let dir = tempdir().unwrap();
        let err = PythonManifestParser::new().parse(dir.path()).unwrap_err();
        match err {
            AnalyzeError::ManifestNotFound { checked, .. } => {
                assert_eq!(checked.len(), 3);
                assert!(checked.contains(&"setup.py".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
