use thiserror::Error;

/// Fatal failures of an analysis run.
///
/// Everything else degrades: unreadable source files are skipped with a
/// logged warning, and enrichment adapters fall back to empty results when
/// their external tool is missing or emits unparsable output.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("no dependency manifest found in {project} (checked: {})", .checked.join(", "))]
    ManifestNotFound {
        project: String,
        checked: Vec<String>,
    },

    #[error("unsupported ecosystem: {0} (expected nodejs, python or java)")]
    UnsupportedEcosystem(String),

    #[error("failed to read {path}: {source}")]
    ManifestRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid extraction pattern: {0}")]
    Pattern(#[from] regex::Error),
}
