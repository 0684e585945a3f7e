//! `depcheckr` — reconcile declared dependencies against actual source usage.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]).
//! 2. Load config ([`config::load_config`]).
//! 3. Detect or accept the project ecosystem ([`detector`], `--lang`).
//! 4. Run the pipeline: parse manifests, scan sources, reconcile, enrich
//!    ([`engine::analyze`]).
//! 5. Render the requested report ([`report`]).
//! 6. Optionally uninstall unused packages (`--remove --yes`, [`remove`]).
//! 7. Exit `0` (clean) or `1` (at least one missing dependency).

mod cli;
mod config;
mod detector;
mod engine;
mod enrich;
mod error;
mod models;
mod parser;
mod reconcile;
mod remove;
mod report;
mod scanner;

use std::str::FromStr;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use cli::{Cli, ReportFormat};
use config::load_config;
use models::Ecosystem;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("depcheckr=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Resolve project path
    let path = cli
        .path
        .canonicalize()
        .unwrap_or_else(|_| cli.path.clone());

    let mut config = load_config(&path, cli.config.as_deref())?;
    if cli.no_audit {
        config.audit.enabled = false;
    }
    if cli.no_outdated {
        config.outdated.enabled = false;
    }

    let ecosystem_override = match &cli.lang {
        Some(lang) => Some(Ecosystem::from_str(lang)?),
        None => None,
    };

    let spinner = if !cli.quiet && cli.report == ReportFormat::Terminal {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        pb.set_message("Analyzing dependencies...");
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let result = engine::analyze(&path, ecosystem_override, &config).await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let analysis = result?;

    match cli.report {
        ReportFormat::Terminal => {
            report::terminal::render(&analysis, cli.verbose, cli.quiet)?;
        }
        ReportFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&analysis)?);
        }
    }

    if cli.remove {
        if cli.yes {
            remove::remove_unused(&analysis, &path, cli.package_manager).await?;
        } else {
            eprintln!(
                " {} --remove changes the project; pass --yes to confirm.",
                "!".yellow().bold()
            );
        }
    }

    // Exit code: 1 if anything is referenced but undeclared
    if !analysis.missing.is_empty() {
        std::process::exit(1);
    }

    Ok(())
}
