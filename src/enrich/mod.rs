//! Enrichment adapters: vulnerability and staleness data sourced from
//! external package-manager tooling. Both adapters are optional; a
//! missing tool or unparsable output degrades to an empty result and
//! never fails the run.

use std::path::Path;

use tokio::process::Command;
use tracing::warn;

pub mod outdated;
pub mod security;

/// Cap on captured tool output. Anything larger is treated as no data.
const MAX_TOOL_OUTPUT: usize = 10 * 1024 * 1024;

/// Run an external tool to completion in the project root, capturing
/// stdout and stderr. The child is reaped on every exit path
/// (`kill_on_drop` covers timeout cancellation). Returns `None` when the
/// tool cannot be spawned or its output exceeds the buffer cap; a
/// non-zero exit code is not itself a failure, audit tools exit non-zero
/// when findings exist.
pub(crate) async fn run_tool(program: &str, args: &[&str], root: &Path) -> Option<(String, String)> {
    let output = Command::new(program)
        .args(args)
        .current_dir(root)
        .kill_on_drop(true)
        .output()
        .await;

    match output {
        Ok(out) => {
            if out.stdout.len() > MAX_TOOL_OUTPUT || out.stderr.len() > MAX_TOOL_OUTPUT {
                warn!(tool = program, "tool output exceeded buffer cap, treating as no data");
                return None;
            }
            Some((
                String::from_utf8_lossy(&out.stdout).into_owned(),
                String::from_utf8_lossy(&out.stderr).into_owned(),
            ))
        }
        Err(e) => {
            warn!(tool = program, error = %e, "external tool unavailable");
            None
        }
    }
}
