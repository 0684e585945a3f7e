use std::collections::HashSet;
use std::path::Path;

use crate::models::{
    AnalysisReport, DeclaredDependency, Ecosystem, OutdatedRecord, Reconciliation, StorageImpact,
    Summary, UsageReference, UsedPackage, VulnerabilityRecord,
};
use crate::reconcile::canonical_name;

pub mod terminal;

/// Merge all pipeline outputs into the final immutable report.
///
/// The unused list is intersected against the used-name set once more
/// here: even if upstream normalization ever diverged, unused and used
/// stay disjoint in the published report.
pub fn assemble(
    ecosystem: Ecosystem,
    root: &Path,
    declared: Vec<DeclaredDependency>,
    used: Vec<UsageReference>,
    reconciliation: Reconciliation,
    vulnerabilities: Vec<VulnerabilityRecord>,
    outdated: Vec<OutdatedRecord>,
) -> AnalysisReport {
    let used_names: HashSet<String> = used
        .iter()
        .map(|r| canonical_name(&r.package_name))
        .collect();

    let unused: Vec<DeclaredDependency> = reconciliation
        .unused
        .into_iter()
        .filter(|dep| !used_names.contains(&canonical_name(&dep.name)))
        .collect();

    let grouped = group_by_package(&used);
    let impact = storage_impact(unused.len(), ecosystem);

    let summary = Summary {
        total_dependencies: reconciliation.total,
        used_count: grouped.len(),
        unused_count: unused.len(),
        missing_count: reconciliation.missing.len(),
        vulnerability_count: vulnerabilities.len(),
        outdated_count: outdated.len(),
    };

    AnalysisReport {
        ecosystem,
        project_path: root.display().to_string(),
        summary,
        used: grouped,
        unused,
        missing: reconciliation.missing,
        declared,
        vulnerabilities,
        outdated,
        impact,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }
}

/// Group raw usage references by package name, preserving first-seen
/// order.
fn group_by_package(used: &[UsageReference]) -> Vec<UsedPackage> {
    let mut order: Vec<String> = Vec::new();
    let mut grouped: std::collections::HashMap<String, Vec<UsageReference>> =
        std::collections::HashMap::new();

    for reference in used {
        let entry = grouped.entry(reference.package_name.clone()).or_default();
        if entry.is_empty() {
            order.push(reference.package_name.clone());
        }
        entry.push(reference.clone());
    }

    order
        .into_iter()
        .map(|name| {
            let references = grouped.remove(&name).unwrap_or_default();
            UsedPackage { name, references }
        })
        .collect()
}

/// `unused × averagePackageSize`, rounded for stable output.
fn storage_impact(unused_count: usize, ecosystem: Ecosystem) -> StorageImpact {
    let mb = unused_count as f64 * ecosystem.average_package_size_mb();
    StorageImpact {
        packages: unused_count,
        estimated_savings_mb: (mb * 100.0).round() / 100.0,
        estimated_savings_gb: (mb / 1024.0 * 1000.0).round() / 1000.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DependencyKind;
    use crate::reconcile::reconcile;

    fn declared(name: &str) -> DeclaredDependency {
        DeclaredDependency {
            name: name.to_string(),
            version: "1.0.0".to_string(),
            kind: DependencyKind::Runtime,
            source_file: "package.json".to_string(),
        }
    }

    fn used(name: &str, file: &str) -> UsageReference {
        UsageReference {
            package_name: name.to_string(),
            file: file.to_string(),
            line: 1,
            reason: None,
        }
    }

    #[test]
    fn test_assemble_counts_and_disjointness() {
        let d = vec![declared("react"), declared("lodash")];
        let u = vec![used("react", "a.js"), used("react", "b.js"), used("axios", "c.js")];
        let rec = reconcile(&d, &u);

        let report = assemble(
            Ecosystem::Node,
            Path::new("/tmp/app"),
            d,
            u,
            rec,
            Vec::new(),
            Vec::new(),
        );

        assert_eq!(report.summary.total_dependencies, 2);
        assert_eq!(report.summary.used_count, 2); // react + axios, grouped
        assert_eq!(report.summary.unused_count, 1);
        assert_eq!(report.summary.missing_count, 1);

        let unused_names: HashSet<&str> =
            report.unused.iter().map(|x| x.name.as_str()).collect();
        let used_names: HashSet<&str> = report.used.iter().map(|x| x.name.as_str()).collect();
        assert!(unused_names.is_disjoint(&used_names));

        let react = report.used.iter().find(|p| p.name == "react").unwrap();
        assert_eq!(react.references.len(), 2);
    }

    #[test]
    fn test_storage_impact_per_ecosystem_constant() {
        let node = storage_impact(3, Ecosystem::Node);
        assert_eq!(node.estimated_savings_mb, 15.0);
        assert_eq!(node.estimated_savings_gb, 0.015);

        let java = storage_impact(2, Ecosystem::Java);
        assert_eq!(java.estimated_savings_mb, 20.0);

        let python = storage_impact(0, Ecosystem::Python);
        assert_eq!(python.packages, 0);
        assert_eq!(python.estimated_savings_mb, 0.0);
    }

    #[test]
    fn test_reports_identical_apart_from_timestamp() {
        let d = vec![declared("react"), declared("lodash")];
        let u = vec![used("react", "a.js")];

        let make = || {
            let rec = reconcile(&d, &u);
            let mut report = assemble(
                Ecosystem::Node,
                Path::new("/tmp/app"),
                d.clone(),
                u.clone(),
                rec,
                Vec::new(),
                Vec::new(),
            );
            report.timestamp = String::new();
            serde_json::to_string(&report).unwrap()
        };

        assert_eq!(make(), make());
    }
}
