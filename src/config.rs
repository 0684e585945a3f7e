use std::path::Path;

use anyhow::Result;
use serde::Deserialize;

/// Root configuration structure, deserialized from `.depcheckr/config.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scan: ScanConfig,
    pub audit: AuditConfig,
    pub outdated: OutdatedConfig,
}

/// Source-scanner tuning.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Extra directory names to prune during the walk, on top of the
    /// built-in per-ecosystem ignore list.
    pub ignore: Vec<String>,
}

/// Security-audit adapter settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub enabled: bool,
    /// Wall-clock timeout for the Java dependency-check run.
    pub timeout_secs: u64,
}

/// Staleness adapter settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutdatedConfig {
    pub enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            scan: ScanConfig::default(),
            audit: AuditConfig::default(),
            outdated: OutdatedConfig::default(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig { ignore: Vec::new() }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        AuditConfig {
            enabled: true,
            timeout_secs: 300,
        }
    }
}

impl Default for OutdatedConfig {
    fn default() -> Self {
        OutdatedConfig { enabled: true }
    }
}

/// Load the configuration, searching in order:
///
/// 1. `config_override` — path passed via `--config`
/// 2. `<project_path>/.depcheckr/config.toml`
/// 3. `~/.config/depcheckr/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(project_path: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        let content = std::fs::read_to_string(path)?;
        return Ok(toml::from_str(&content)?);
    }

    let project_config = project_path.join(".depcheckr").join("config.toml");
    if project_config.exists() {
        let content = std::fs::read_to_string(&project_config)?;
        return Ok(toml::from_str(&content)?);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home.join(".config").join("depcheckr").join("config.toml");
        if home_config.exists() {
            let content = std::fs::read_to_string(&home_config)?;
            return Ok(toml::from_str(&content)?);
        }
    }

    Ok(Config::default())
}
