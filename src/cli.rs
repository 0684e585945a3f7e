use std::path::PathBuf;

use clap::Parser;

use crate::remove::PackageManager;

#[derive(Parser, Debug)]
#[command(
    name = "depcheckr",
    about = "Find unused, missing, vulnerable and outdated project dependencies",
    version
)]
pub struct Cli {
    /// Project path to analyze
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Force the ecosystem instead of auto-detecting (node, python, java)
    #[arg(long, value_name = "LANG")]
    pub lang: Option<String>,

    /// Report format
    #[arg(long, default_value = "terminal", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// Config file [default: ./.depcheckr/config.toml, fallback ~/.config/depcheckr/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Skip the vulnerability audit
    #[arg(long)]
    pub no_audit: bool,

    /// Skip the outdated-version check
    #[arg(long)]
    pub no_outdated: bool,

    /// Uninstall unused dependencies after the analysis
    #[arg(long)]
    pub remove: bool,

    /// Confirm removal without prompting (required with --remove)
    #[arg(long)]
    pub yes: bool,

    /// Package manager to use with --remove
    #[arg(long, value_name = "PM")]
    pub package_manager: Option<PackageManager>,

    /// Show every referenced package, not just findings
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print the summary line
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Json,
}
