use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use colored::*;
use tokio::process::Command;

use crate::models::{AnalysisReport, Ecosystem};

/// Which tool performs the uninstall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PackageManager {
    Npm,
    Yarn,
    Pnpm,
    Pip,
}

impl PackageManager {
    fn default_for(ecosystem: Ecosystem) -> Option<PackageManager> {
        match ecosystem {
            Ecosystem::Node => Some(PackageManager::Npm),
            Ecosystem::Python => Some(PackageManager::Pip),
            Ecosystem::Java => None,
        }
    }

    /// Program and leading arguments of the uninstall invocation.
    fn uninstall_command(self) -> (&'static str, &'static [&'static str]) {
        match self {
            PackageManager::Npm => ("npm", &["uninstall"]),
            PackageManager::Yarn => ("yarn", &["remove"]),
            PackageManager::Pnpm => ("pnpm", &["remove"]),
            PackageManager::Pip => ("pip", &["uninstall", "-y"]),
        }
    }
}

/// Remove every unused dependency from the report in a single
/// package-manager invocation. Java builds have no uninstall command;
/// the manifest edit is left to the user.
pub async fn remove_unused(
    report: &AnalysisReport,
    root: &Path,
    manager_override: Option<PackageManager>,
) -> Result<()> {
    if report.unused.is_empty() {
        println!(" Nothing to remove.");
        return Ok(());
    }

    let packages: Vec<&str> = report.unused.iter().map(|d| d.name.as_str()).collect();

    if report.ecosystem == Ecosystem::Java {
        println!(
            " {} Java dependencies must be removed by editing the build file.",
            "!".yellow().bold()
        );
        println!(" Remove these coordinates from pom.xml or build.gradle:");
        for package in &packages {
            println!("   - {}", package);
        }
        return Ok(());
    }

    let manager = manager_override
        .or_else(|| PackageManager::default_for(report.ecosystem))
        .context("no package manager available for this ecosystem")?;
    let (program, args) = manager.uninstall_command();

    println!(
        " Removing {} package(s) with {}...",
        packages.len(),
        program.bold()
    );

    let output = Command::new(program)
        .args(args)
        .args(&packages)
        .current_dir(root)
        .kill_on_drop(true)
        .output()
        .await
        .with_context(|| format!("failed to run {}", program))?;

    // The package manager's own output is the user-facing result.
    print!("{}", String::from_utf8_lossy(&output.stdout));
    eprint!("{}", String::from_utf8_lossy(&output.stderr));

    if output.status.success() {
        println!(" {} Removed {} package(s).", "✓".green(), packages.len());
    } else {
        anyhow::bail!("{} exited with {}", program, output.status);
    }

    Ok(())
}
