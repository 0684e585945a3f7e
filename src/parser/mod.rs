use std::path::Path;

use crate::error::AnalyzeError;
use crate::models::DeclaredDependency;

pub mod java;
pub mod node;
pub mod python;

/// Reads the declared dependencies of one ecosystem into a normalized list.
///
/// Fails with [`AnalyzeError::ManifestNotFound`] when none of the
/// ecosystem's descriptor files exist or the merged dependency set is
/// empty. Individual malformed manifests are skipped; provenance is kept
/// in [`DeclaredDependency::source_file`].
pub trait ManifestParser: Send + Sync {
    fn parse(&self, root: &Path) -> Result<Vec<DeclaredDependency>, AnalyzeError>;
}

/// Build the fatal error for an empty or absent dependency set.
pub(crate) fn manifest_not_found(root: &Path, checked: &[&str]) -> AnalyzeError {
    AnalyzeError::ManifestNotFound {
        project: root.display().to_string(),
        checked: checked.iter().map(|s| s.to_string()).collect(),
    }
}
