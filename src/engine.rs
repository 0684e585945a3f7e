use std::path::Path;

use tracing::info;

use crate::config::Config;
use crate::detector::detect_ecosystem;
use crate::enrich::{outdated, security};
use crate::error::AnalyzeError;
use crate::models::{AnalysisReport, Ecosystem};
use crate::parser::{
    java::JavaManifestParser, node::NodeManifestParser, python::PythonManifestParser,
    ManifestParser,
};
use crate::reconcile::reconcile;
use crate::report;
use crate::scanner::{
    java::JavaSourceScanner, node::NodeSourceScanner, python::PythonSourceScanner, SourceScanner,
};

/// The parser/scanner pair for one ecosystem.
pub struct Toolchain {
    pub parser: Box<dyn ManifestParser>,
    pub scanner: Box<dyn SourceScanner>,
}

pub fn toolchain(ecosystem: Ecosystem, config: &Config) -> Toolchain {
    let extra_ignore = &config.scan.ignore;
    match ecosystem {
        Ecosystem::Node => Toolchain {
            parser: Box::new(NodeManifestParser::new()),
            scanner: Box::new(NodeSourceScanner::new(extra_ignore)),
        },
        Ecosystem::Python => Toolchain {
            parser: Box::new(PythonManifestParser::new()),
            scanner: Box::new(PythonSourceScanner::new(extra_ignore)),
        },
        Ecosystem::Java => Toolchain {
            parser: Box::new(JavaManifestParser::new()),
            scanner: Box::new(JavaSourceScanner::new(extra_ignore)),
        },
    }
}

/// Run the full pipeline for one project: detect, parse, scan, reconcile,
/// enrich, assemble.
pub async fn analyze(
    root: &Path,
    ecosystem_override: Option<Ecosystem>,
    config: &Config,
) -> Result<AnalysisReport, AnalyzeError> {
    let ecosystem = ecosystem_override.unwrap_or_else(|| detect_ecosystem(root));
    info!(%ecosystem, root = %root.display(), "starting analysis");

    let tools = toolchain(ecosystem, config);

    let declared = tools.parser.parse(root)?;
    info!(count = declared.len(), "parsed declared dependencies");

    let used = tools.scanner.scan(root).await?;
    info!(count = used.len(), "collected usage references");

    let reconciliation = reconcile(&declared, &used);

    let vulnerabilities = if config.audit.enabled {
        security::scan(root, ecosystem, &config.audit).await
    } else {
        Vec::new()
    };

    let outdated = if config.outdated.enabled {
        outdated::check(root, ecosystem).await
    } else {
        Vec::new()
    };

    Ok(report::assemble(
        ecosystem,
        root,
        declared,
        used,
        reconciliation,
        vulnerabilities,
        outdated,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn offline_config() -> Config {
        let mut config = Config::default();
        config.audit.enabled = false;
        config.outdated.enabled = false;
        config
    }

    #[tokio::test]
    async fn test_end_to_end_node_project() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("package.json"),
            r#"{
  "dependencies": { "react": "^18.2.0", "lodash": "^4.17.21" },
  "devDependencies": { "jest": "^29.0.0" }
}"#,
        )
        .unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(
            dir.path().join("src/app.js"),
            "import React from 'react';\nconst axios = require('axios');\n",
        )
        .unwrap();

        let report = analyze(dir.path(), None, &offline_config()).await.unwrap();

        assert_eq!(report.ecosystem, Ecosystem::Node);
        assert_eq!(report.summary.total_dependencies, 3);
        let unused: Vec<&str> = report.unused.iter().map(|d| d.name.as_str()).collect();
        assert!(unused.contains(&"lodash"));
        assert!(unused.contains(&"jest"));
        let missing: Vec<&str> = report
            .missing
            .iter()
            .map(|r| r.package_name.as_str())
            .collect();
        assert!(missing.contains(&"axios"));
        // importing react infers its react-dom peer, which counts as used
        // but never as a missing declaration
        assert!(!missing.contains(&"react-dom"));
        assert!(report.used.iter().any(|p| p.name == "react-dom"));
        assert!(report.vulnerabilities.is_empty());
        assert!(report.outdated.is_empty());
    }

    #[tokio::test]
    async fn test_undeclared_tailwind_build_chain_reported_missing() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("package.json"),
            r#"{ "dependencies": { "react": "^18.2.0" } }"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("index.css"),
            "@tailwind base;\n@tailwind components;\n@tailwind utilities;\n",
        )
        .unwrap();

        let report = analyze(dir.path(), None, &offline_config()).await.unwrap();
        let missing: Vec<&str> = report
            .missing
            .iter()
            .map(|r| r.package_name.as_str())
            .collect();
        assert!(missing.contains(&"tailwindcss"));
        assert!(missing.contains(&"autoprefixer"));
        assert!(missing.contains(&"postcss"));
    }

    #[tokio::test]
    async fn test_missing_manifest_is_fatal() {
        let dir = tempdir().unwrap();
        let err = analyze(dir.path(), Some(Ecosystem::Python), &offline_config())
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyzeError::ManifestNotFound { .. }));
    }

    #[tokio::test]
    async fn test_override_beats_detection() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("package.json"), "{}").unwrap();
        std::fs::write(dir.path().join("requirements.txt"), "flask==2.0.0").unwrap();
        std::fs::write(dir.path().join("app.py"), "import flask\n").unwrap();

        let report = analyze(dir.path(), Some(Ecosystem::Python), &offline_config())
            .await
            .unwrap();
        assert_eq!(report.ecosystem, Ecosystem::Python);
        assert_eq!(report.summary.used_count, 1);
        assert_eq!(report.used[0].name, "flask");
    }
}
