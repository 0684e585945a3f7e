use std::path::Path;

use async_trait::async_trait;
use regex::Regex;

use crate::error::AnalyzeError;
use crate::models::UsageReference;

use super::{collect_source_files, read_sources, relative_path, SourceScanner};

const SOURCE_EXTENSIONS: &[&str] = &["java"];

const IGNORE_DIRS: &[&str] = &[".git", "target", "build", ".gradle", ".m2", "node_modules"];

/// JDK namespaces, never third-party dependencies.
const PLATFORM_PREFIXES: &[&str] = &["java.", "javax.", "jdk."];

/// Well-known package prefixes mapped to Maven coordinates. Checked by
/// prefix match, first match wins.
const PREFIX_COORDINATES: &[(&str, &str)] = &[
    ("org.springframework", "org.springframework:spring-core"),
    ("org.apache.commons", "org.apache.commons:commons-lang3"),
    ("org.apache.logging.log4j", "org.apache.logging.log4j:log4j-core"),
    ("com.google.guava", "com.google.guava:guava"),
    ("org.slf4j", "org.slf4j:slf4j-api"),
    ("ch.qos.logback", "ch.qos.logback:logback-classic"),
    ("org.junit", "org.junit.jupiter:junit-jupiter"),
    ("junit", "junit:junit"),
    ("org.mockito", "org.mockito:mockito-core"),
    ("com.fasterxml.jackson", "com.fasterxml.jackson.core:jackson-databind"),
    ("javax.servlet", "javax.servlet:javax.servlet-api"),
    ("org.hibernate", "org.hibernate:hibernate-core"),
];

const HEURISTIC_REASON: &str = "heuristic group:artifact guess from package name";

/// Map a fully qualified import to a best-effort artifact coordinate.
///
/// Returns the coordinate and, for the two-segment fallback, a reason
/// string marking the guess as heuristic; the prefix table can
/// misidentify nothing, but the fallback can claim unrelated packages
/// that share a top-level namespace.
fn map_to_coordinate(fq_name: &str) -> Option<(String, Option<String>)> {
    // The table outranks the platform filter: javax.servlet is a real
    // external artifact even though javax.* is otherwise platform.
    for (prefix, coordinate) in PREFIX_COORDINATES {
        if fq_name.starts_with(prefix) {
            return Some((coordinate.to_string(), None));
        }
    }

    if PLATFORM_PREFIXES.iter().any(|p| fq_name.starts_with(p)) {
        return None;
    }

    // Fallback: com.company.product → com.company:product
    let mut parts = fq_name.split('.');
    match (parts.next(), parts.next()) {
        (Some(group), Some(artifact)) if !group.is_empty() && !artifact.is_empty() => Some((
            format!("{}:{}", group, artifact),
            Some(HEURISTIC_REASON.to_string()),
        )),
        _ => None,
    }
}

/// Scanner for Java projects: lexical `import` extraction over `.java`
/// files, resolving fully qualified names to artifact coordinates.
pub struct JavaSourceScanner {
    extra_ignore: Vec<String>,
}

impl JavaSourceScanner {
    pub fn new(extra_ignore: &[String]) -> Self {
        Self {
            extra_ignore: extra_ignore.to_vec(),
        }
    }

    fn extract_imports(&self, rule: &Regex, rel: &str, content: &str) -> Vec<UsageReference> {
        let mut refs = Vec::new();
        for (index, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty()
                || trimmed.starts_with("//")
                || trimmed.starts_with("/*")
                || trimmed.starts_with('*')
            {
                continue;
            }
            if let Some(caps) = rule.captures(trimmed) {
                if let Some((coordinate, reason)) = map_to_coordinate(&caps[1]) {
                    refs.push(UsageReference {
                        package_name: coordinate,
                        file: rel.to_string(),
                        line: index + 1,
                        reason,
                    });
                }
            }
        }
        refs
    }
}

#[async_trait]
impl SourceScanner for JavaSourceScanner {
    async fn scan(&self, root: &Path) -> Result<Vec<UsageReference>, AnalyzeError> {
        let rule = Regex::new(r"^import\s+(?:static\s+)?([A-Za-z0-9_.]+)\s*;")?;
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
            refs.extend(self.extract_imports(&rule, &rel, &content));
        }

        Ok(refs)
    }
}
