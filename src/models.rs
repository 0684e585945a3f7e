use std::str::FromStr;

use serde::Serialize;

use crate::error::AnalyzeError;

/// One of the supported language/package-manager environments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    Node,
    Python,
    Java,
}

impl Ecosystem {
    /// Rough average on-disk size of an installed package, used for the
    /// storage-impact estimate.
    pub fn average_package_size_mb(self) -> f64 {
        match self {
            Ecosystem::Node => 5.0,
            Ecosystem::Python => 3.0,
            Ecosystem::Java => 10.0,
        }
    }
}

impl std::fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ecosystem::Node => write!(f, "nodejs"),
            Ecosystem::Python => write!(f, "python"),
            Ecosystem::Java => write!(f, "java"),
        }
    }
}

impl FromStr for Ecosystem {
    type Err = AnalyzeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "node" | "nodejs" | "javascript" | "typescript" => Ok(Ecosystem::Node),
            "python" | "py" => Ok(Ecosystem::Python),
            "java" => Ok(Ecosystem::Java),
            other => Err(AnalyzeError::UnsupportedEcosystem(other.to_string())),
        }
    }
}

/// Which declaration block a dependency came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    Runtime,
    Dev,
}

impl std::fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DependencyKind::Runtime => write!(f, "runtime"),
            DependencyKind::Dev => write!(f, "dev"),
        }
    }
}

/// A dependency entry as declared in a manifest. Version strings are kept
/// verbatim (range specifiers are not resolved).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeclaredDependency {
    pub name: String,
    pub version: String,
    pub kind: DependencyKind,
    pub source_file: String,
}

/// Reason attached to references inferred from a react import.
pub const REASON_REACT_PEER: &str = "peer dependency of react";
/// Reason attached to references inferred from react-scripts usage.
pub const REASON_REACT_SCRIPTS_PEER: &str = "required by react-scripts";

/// A single import/require/usage signal found by the source scanner.
///
/// `reason` carries provenance for references that do not come from an
/// import statement (config files, script blocks, peer inference) and
/// marks heuristic Java coordinate guesses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageReference {
    pub package_name: String,
    pub file: String,
    pub line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl UsageReference {
    /// True for references synthesized by peer-dependency inference.
    /// Package managers install peers alongside the packages that require
    /// them, so an undeclared peer is not a missing declaration.
    pub fn is_inferred_peer(&self) -> bool {
        matches!(
            self.reason.as_deref(),
            Some(REASON_REACT_PEER) | Some(REASON_REACT_SCRIPTS_PEER)
        )
    }
}

/// Normalized vulnerability severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Moderate,
    Low,
    Info,
    Unknown,
}

impl Severity {
    /// Map an external tool's severity vocabulary onto the closed enum.
    /// Case-insensitive exact match; anything unrecognized is `Unknown`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "moderate" | "medium" => Severity::Moderate,
            "low" => Severity::Low,
            "info" => Severity::Info,
            _ => Severity::Unknown,
        }
    }

    /// Integer score used for sorting: critical=5 down to unknown=0.
    pub fn score(self) -> u8 {
        match self {
            Severity::Critical => 5,
            Severity::High => 4,
            Severity::Moderate => 3,
            Severity::Low => 2,
            Severity::Info => 1,
            Severity::Unknown => 0,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Critical => write!(f, "critical"),
            Severity::High => write!(f, "high"),
            Severity::Moderate => write!(f, "moderate"),
            Severity::Low => write!(f, "low"),
            Severity::Info => write!(f, "info"),
            Severity::Unknown => write!(f, "unknown"),
        }
    }
}

/// One vulnerable package reported by a security-audit tool.
#[derive(Debug, Clone, Serialize)]
pub struct VulnerabilityRecord {
    pub package: String,
    pub severity: Severity,
    pub title: String,
    pub severity_score: u8,
    pub evidence: Vec<String>,
}

/// One package with a newer version available.
#[derive(Debug, Clone, Serialize)]
pub struct OutdatedRecord {
    pub package: String,
    pub current_version: String,
    pub wanted_version: String,
    pub latest_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<DependencyKind>,
}

/// Output of the reconciliation engine.
#[derive(Debug, Clone, Serialize)]
pub struct Reconciliation {
    pub total: usize,
    pub used_count: usize,
    pub unused: Vec<DeclaredDependency>,
    pub missing: Vec<UsageReference>,
}

/// Usage references grouped by package for report output.
#[derive(Debug, Clone, Serialize)]
pub struct UsedPackage {
    pub name: String,
    pub references: Vec<UsageReference>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub total_dependencies: usize,
    pub used_count: usize,
    pub unused_count: usize,
    pub missing_count: usize,
    pub vulnerability_count: usize,
    pub outdated_count: usize,
}

/// Estimated disk savings from removing unused packages.
#[derive(Debug, Clone, Serialize)]
pub struct StorageImpact {
    pub packages: usize,
    pub estimated_savings_mb: f64,
    pub estimated_savings_gb: f64,
}

/// The terminal aggregate of one analysis run. Built once by the report
/// assembler and never mutated afterward.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub ecosystem: Ecosystem,
    pub project_path: String,
    pub summary: Summary,
    pub used: Vec<UsedPackage>,
    pub unused: Vec<DeclaredDependency>,
    pub missing: Vec<UsageReference>,
    pub declared: Vec<DeclaredDependency>,
    pub vulnerabilities: Vec<VulnerabilityRecord>,
    pub outdated: Vec<OutdatedRecord>,
    pub impact: StorageImpact,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ecosystem_from_str() {
        assert_eq!(Ecosystem::from_str("nodejs").unwrap(), Ecosystem::Node);
        assert_eq!(Ecosystem::from_str("Python").unwrap(), Ecosystem::Python);
        assert_eq!(Ecosystem::from_str(" java ").unwrap(), Ecosystem::Java);
        assert!(Ecosystem::from_str("ruby").is_err());
    }

    #[test]
    fn test_severity_table() {
        assert_eq!(Severity::parse("CRITICAL"), Severity::Critical);
        assert_eq!(Severity::parse("Medium"), Severity::Moderate);
        assert_eq!(Severity::parse("moderate"), Severity::Moderate);
        assert_eq!(Severity::parse("nonsense"), Severity::Unknown);
        assert_eq!(Severity::parse(""), Severity::Unknown);
    }

    #[test]
    fn test_severity_score_order() {
        let ordered = [
            Severity::Critical,
            Severity::High,
            Severity::Moderate,
            Severity::Low,
            Severity::Info,
            Severity::Unknown,
        ];
        for pair in ordered.windows(2) {
            assert!(pair[0].score() > pair[1].score());
        }
        assert_eq!(Severity::Critical.score(), 5);
        assert_eq!(Severity::Unknown.score(), 0);
    }
}
