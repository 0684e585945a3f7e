use std::path::Path;
use std::time::Duration;

use serde_json::Value;
use tokio::process::Command;
use tracing::warn;

use crate::config::AuditConfig;
use crate::models::{Ecosystem, Severity, VulnerabilityRecord};

use super::run_tool;

/// Run the ecosystem-appropriate vulnerability audit. Results are always
/// sorted by descending severity score before being attached to the
/// report.
pub async fn scan(root: &Path, ecosystem: Ecosystem, config: &AuditConfig) -> Vec<VulnerabilityRecord> {
    let mut vulns = match ecosystem {
        Ecosystem::Node => scan_node(root).await,
        Ecosystem::Python => scan_python(root).await,
        Ecosystem::Java => scan_java(root, config).await,
    };
    vulns.sort_by(|a, b| b.severity_score.cmp(&a.severity_score));
    vulns
}

fn make_record(package: &str, severity_raw: &str, title: &str, evidence: Vec<String>) -> VulnerabilityRecord {
    let severity = Severity::parse(severity_raw);
    VulnerabilityRecord {
        package: package.to_string(),
        severity,
        title: title.to_string(),
        severity_score: severity.score(),
        evidence,
    }
}

/// `npm audit --json`. npm exits non-zero when vulnerabilities exist and,
/// depending on version, may emit the payload on stderr.
async fn scan_node(root: &Path) -> Vec<VulnerabilityRecord> {
    let Some((stdout, stderr)) = run_tool("npm", &["audit", "--json"], root).await else {
        return Vec::new();
    };

    if let Ok(data) = serde_json::from_str::<Value>(&stdout) {
        return parse_npm_audit(&data);
    }
    if let Ok(data) = serde_json::from_str::<Value>(&stderr) {
        return parse_npm_audit(&data);
    }
    warn!("npm audit produced unparsable output");
    Vec::new()
}

fn parse_npm_audit(data: &Value) -> Vec<VulnerabilityRecord> {
    let mut vulns = Vec::new();

    if let Some(packages) = data.get("vulnerabilities").and_then(|v| v.as_object()) {
        for (package, vuln) in packages {
            let via = vuln.get("via").and_then(|v| v.as_array());
            let Some(via) = via.filter(|v| !v.is_empty()) else {
                continue;
            };
            let evidence: Vec<String> = via
                .iter()
                .filter_map(|entry| match entry {
                    Value::String(s) => Some(s.clone()),
                    Value::Object(obj) => obj
                        .get("title")
                        .or_else(|| obj.get("name"))
                        .and_then(|v| v.as_str())
                        .map(str::to_string),
                    _ => None,
                })
                .collect();
            let severity = vuln.get("severity").and_then(|v| v.as_str()).unwrap_or("unknown");
            let title = vuln
                .get("title")
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown vulnerability");
            vulns.push(make_record(package, severity, title, evidence));
        }
    }

    vulns
}

/// `pip-audit --format json`, falling back to `safety check --json`.
async fn scan_python(root: &Path) -> Vec<VulnerabilityRecord> {
    if let Some((stdout, _)) = run_tool("pip-audit", &["--format", "json"], root).await {
        if let Ok(data) = serde_json::from_str::<Value>(&stdout) {
            return parse_pip_audit(&data);
        }
    }

    if let Some((stdout, _)) = run_tool("safety", &["check", "--json"], root).await {
        if let Ok(data) = serde_json::from_str::<Value>(&stdout) {
            return parse_safety(&data);
        }
    }

    warn!("pip-audit and safety both unavailable, skipping security scan");
    Vec::new()
}

fn parse_pip_audit(data: &Value) -> Vec<VulnerabilityRecord> {
    let mut vulns = Vec::new();

    if let Some(entries) = data.get("vulnerabilities").and_then(|v| v.as_array()) {
        for vuln in entries {
            let package = vuln.get("name").and_then(|v| v.as_str()).unwrap_or("unknown");
            let severity = vuln.get("severity").and_then(|v| v.as_str()).unwrap_or("");
            let title = vuln
                .get("id")
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown vulnerability");
            let evidence = vuln
                .get("aliases")
                .and_then(|v| v.as_array())
                .map(|aliases| {
                    aliases
                        .iter()
                        .filter_map(|a| a.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default();
            vulns.push(make_record(package, severity, title, evidence));
        }
    }

    vulns
}

fn parse_safety(data: &Value) -> Vec<VulnerabilityRecord> {
    let mut vulns = Vec::new();

    if let Some(entries) = data.as_array() {
        for vuln in entries {
            let package = vuln
                .get("package")
                .or_else(|| vuln.get("name"))
                .and_then(|v| v.as_str())
                .unwrap_or("unknown");
            let severity = vuln.get("severity").and_then(|v| v.as_str()).unwrap_or("");
            let title = vuln
                .get("vulnerability_id")
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown vulnerability");
            vulns.push(make_record(package, severity, title, Vec::new()));
        }
    }

    vulns
}

/// OWASP dependency-check: read a pre-existing report if one is present,
/// otherwise run the tool under a hard wall-clock timeout. Dropping the
/// output future on timeout kills the child, so an unresponsive tool
/// cannot hang the run.
async fn scan_java(root: &Path, config: &AuditConfig) -> Vec<VulnerabilityRecord> {
    let report_path = root.join("dependency-check-report.json");

    if !report_path.exists() {
        let run = Command::new("dependency-check")
            .args(["--project", "depcheckr", "--scan", ".", "--format", "JSON", "--out", "."])
            .current_dir(root)
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(Duration::from_secs(config.timeout_secs), run).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                warn!(error = %e, "dependency-check unavailable, skipping security scan");
                return Vec::new();
            }
            Err(_) => {
                warn!(timeout_secs = config.timeout_secs, "dependency-check timed out");
                return Vec::new();
            }
        }
    }

    let Ok(content) = std::fs::read_to_string(&report_path) else {
        return Vec::new();
    };
    match serde_json::from_str::<Value>(&content) {
        Ok(data) => parse_dependency_check(&data),
        Err(_) => {
            warn!("dependency-check report unparsable");
            Vec::new()
        }
    }
}

fn parse_dependency_check(data: &Value) -> Vec<VulnerabilityRecord> {
    let mut vulns = Vec::new();

    if let Some(deps) = data.get("dependencies").and_then(|v| v.as_array()) {
        for dep in deps {
            let Some(entries) = dep.get("vulnerabilities").and_then(|v| v.as_array()) else {
                continue;
            };
            let package = dep
                .get("packages")
                .and_then(|p| p.as_array())
                .and_then(|p| p.first())
                .and_then(|p| p.get("id"))
                .and_then(|v| v.as_str())
                .or_else(|| dep.get("fileName").and_then(|v| v.as_str()))
                .unwrap_or("unknown");
            for vuln in entries {
                let severity = vuln
                    .get("cvssv3")
                    .and_then(|c| c.get("baseSeverity"))
                    .or_else(|| vuln.get("severity"))
                    .and_then(|v| v.as_str())
                    .unwrap_or("");
                let title = vuln
                    .get("name")
                    .and_then(|v| v.as_str())
                    .unwrap_or("Unknown vulnerability");
                vulns.push(make_record(package, severity, title, Vec::new()));
            }
        }
    }

    vulns
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_npm_audit_payload() {
        let data = json!({
            "vulnerabilities": {
                "lodash": {
                    "severity": "high",
                    "title": "Prototype Pollution",
                    "via": [{"title": "Prototype Pollution in lodash"}]
                },
                "minimist": {
                    "severity": "moderate",
                    "via": ["minimist"]
                },
                "clean": { "via": [] }
            }
        });
        let mut vulns = parse_npm_audit(&data);
        vulns.sort_by(|a, b| b.severity_score.cmp(&a.severity_score));

        assert_eq!(vulns.len(), 2);
        assert_eq!(vulns[0].package, "lodash");
        assert_eq!(vulns[0].severity, Severity::High);
        assert_eq!(vulns[0].severity_score, 4);
        assert_eq!(vulns[0].evidence, vec!["Prototype Pollution in lodash"]);
        assert_eq!(vulns[1].package, "minimist");
        assert_eq!(vulns[1].title, "Unknown vulnerability");
    }

    #[test]
    fn test_parse_pip_audit_payload() {
        let data = json!({
            "vulnerabilities": [
                {"name": "flask", "severity": "HIGH", "id": "PYSEC-2023-1", "aliases": ["CVE-2023-1"]}
            ]
        });
        let vulns = parse_pip_audit(&data);
        assert_eq!(vulns.len(), 1);
        assert_eq!(vulns[0].package, "flask");
        assert_eq!(vulns[0].severity, Severity::High);
        assert_eq!(vulns[0].title, "PYSEC-2023-1");
        assert_eq!(vulns[0].evidence, vec!["CVE-2023-1"]);
    }

    #[test]
    fn test_parse_safety_payload() {
        let data = json!([
            {"package": "django", "severity": "critical", "vulnerability_id": "12345"}
        ]);
        let vulns = parse_safety(&data);
        assert_eq!(vulns.len(), 1);
        assert_eq!(vulns[0].severity, Severity::Critical);
        assert_eq!(vulns[0].severity_score, 5);
    }

    #[test]
    fn test_parse_dependency_check_payload() {
        let data = json!({
            "dependencies": [
                {
                    "fileName": "spring-core-5.3.0.jar",
                    "packages": [{"id": "pkg:maven/org.springframework/spring-core@5.3.0"}],
                    "vulnerabilities": [
                        {"name": "CVE-2022-22965", "cvssv3": {"baseSeverity": "CRITICAL"}},
                        {"name": "CVE-2021-22096", "severity": "MEDIUM"}
                    ]
                },
                {"fileName": "clean.jar"}
            ]
        });
        let vulns = parse_dependency_check(&data);
        assert_eq!(vulns.len(), 2);
        assert_eq!(vulns[0].severity, Severity::Critical);
        assert_eq!(vulns[1].severity, Severity::Moderate);
        assert!(vulns[0].package.contains("spring-core"));
    }

    #[test]
    fn test_unknown_vocabulary_maps_to_unknown() {
        let data = json!({
            "vulnerabilities": {
                "x": {"severity": "catastrophic", "via": ["x"]}
            }
        });
        let vulns = parse_npm_audit(&data);
        assert_eq!(vulns[0].severity, Severity::Unknown);
        assert_eq!(vulns[0].severity_score, 0);
    }
}
