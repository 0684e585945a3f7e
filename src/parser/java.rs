use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;

use crate::error::AnalyzeError;
use crate::models::{DeclaredDependency, DependencyKind};

const CHECKED_FILES: &[&str] = &["pom.xml", "build.gradle", "build.gradle.kts"];

/// Parses Maven and Gradle descriptors. Both may contribute to the result;
/// names are always `groupId:artifactId`.
pub struct JavaManifestParser;

impl JavaManifestParser {
    pub fn new() -> Self {
        Self
    }
}

impl super::ManifestParser for JavaManifestParser {
    fn parse(&self, root: &Path) -> Result<Vec<DeclaredDependency>, AnalyzeError> {
        let mut deps = Vec::new();

        let pom = root.join("pom.xml");
        if pom.exists() {
            if let Ok(content) = std::fs::read_to_string(&pom) {
                deps.extend(parse_pom_xml(&content));
            }
        }

        for gradle_file in &["build.gradle", "build.gradle.kts"] {
            let gradle = root.join(gradle_file);
            if gradle.exists() {
                if let Ok(content) = std::fs::read_to_string(&gradle) {
                    deps.extend(parse_build_gradle(&content, gradle_file)?);
                }
            }
        }

        if deps.is_empty() {
            return Err(super::manifest_not_found(root, CHECKED_FILES));
        }
        Ok(deps)
    }
}

fn make_dep(
    group_id: &str,
    artifact_id: &str,
    version: &str,
    kind: DependencyKind,
    source_file: &str,
) -> DeclaredDependency {
    let name = if group_id.is_empty() {
        artifact_id.to_string()
    } else {
        format!("{}:{}", group_id, artifact_id)
    };
    let version = if version.is_empty() { "unknown" } else { version };
    DeclaredDependency {
        name,
        version: version.to_string(),
        kind,
        source_file: source_file.to_string(),
    }
}

/// Walk `pom.xml` with the quick-xml event API, collecting
/// groupId/artifactId/version/scope inside `<dependencies><dependency>`.
fn parse_pom_xml(content: &str) -> Vec<DeclaredDependency> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut deps = Vec::new();
    let mut buf = Vec::new();

    let mut in_dependencies = false;
    let mut depth: u32 = 0;
    let mut dependencies_depth: u32 = 0;

    let mut in_dependency = false;
    let mut current_tag = String::new();
    let mut group_id = String::new();
    let mut artifact_id = String::new();
    let mut version = String::new();
    let mut scope = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                depth += 1;
                let name = String::from_utf8_lossy(e.name().local_name().as_ref()).into_owned();
                current_tag = name.clone();

                match name.as_str() {
                    "dependencies" if !in_dependency => {
                        in_dependencies = true;
                        dependencies_depth = depth;
                    }
                    "dependency" if in_dependencies => {
                        in_dependency = true;
                        group_id.clear();
                        artifact_id.clear();
                        version.clear();
                        scope.clear();
                    }
                    _ => {}
                }
            }
            Ok(Event::End(ref e)) => {
                let name = String::from_utf8_lossy(e.name().local_name().as_ref()).into_owned();

                if name == "dependency" && in_dependency {
                    if !artifact_id.is_empty() {
                        let kind = if scope == "test" {
                            DependencyKind::Dev
                        } else {
                            DependencyKind::Runtime
                        };
                        deps.push(make_dep(&group_id, &artifact_id, &version, kind, "pom.xml"));
                    }
                    in_dependency = false;
                } else if name == "dependencies" && depth == dependencies_depth {
                    in_dependencies = false;
                }

                depth = depth.saturating_sub(1);
                current_tag.clear();
            }
            Ok(Event::Text(ref e)) => {
                if in_dependency {
                    let text = e.unescape().unwrap_or_default();
                    match current_tag.as_str() {
                        "groupId" => group_id = text.to_string(),
                        "artifactId" => artifact_id = text.to_string(),
                        "version" => version = text.to_string(),
                        "scope" => scope = text.to_string(),
                        _ => {}
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    deps
}

/// Regex over Gradle short-form declarations:
/// `implementation 'group:artifact:version'` (version optional, quotes or
/// parentheses, single or double quotes).
fn parse_build_gradle(
    content: &str,
    source_file: &str,
) -> Result<Vec<DeclaredDependency>, AnalyzeError> {
    let re = Regex::new(
        r#"(implementation|compile|api|runtimeOnly|testImplementation)\s*[\(]?\s*['"]([^'"]+)['"]"#,
    )?;
    let mut deps = Vec::new();

    for caps in re.captures_iter(content) {
        let keyword = &caps[1];
        let coordinate = &caps[2];
        let parts: Vec<&str> = coordinate.split(':').collect();
        if parts.len() < 2 {
            continue;
        }
        let kind = if keyword == "testImplementation" {
            DependencyKind::Dev
        } else {
            DependencyKind::Runtime
        };
        let version = parts.get(2).copied().unwrap_or("unknown");
        deps.push(make_dep(parts[0], parts[1], version, kind, source_file));
    }

    Ok(deps)
}
