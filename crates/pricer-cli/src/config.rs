//! Configuration management for the CLI

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

/// Used when neither the flag, the environment nor the config file names a server
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// API endpoint URL
    pub api_url: Option<String>,
    /// Default output format (`table` or `json`)
    pub default_format: Option<String>,
    /// Market used when `--neighborhood` is omitted from a quote
    pub default_neighborhood: Option<String>,
}

impl Config {
    /// Load configuration from `~/.config/pricer/config.json`
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Ok(path) => Self::load_from(&path),
            // No home directory, nothing to load
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).context("Failed to read config file")?;

        serde_json::from_str(&content).context("Failed to parse config file")
    }

    /// Flag or env value first, then the config file, then the default
    pub fn resolve_api_url(&self, cli_value: Option<String>) -> String {
        cli_value
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    pub fn resolve_format(&self, cli_value: Option<OutputFormat>) -> Result<OutputFormat> {
        if let Some(format) = cli_value {
            return Ok(format);
        }
        match &self.default_format {
            Some(name) => OutputFormat::from_str(name, true)
                .map_err(|e| anyhow::anyhow!("Invalid default_format in config: {}", e)),
            None => Ok(OutputFormat::default()),
        }
    }

    /// Get the configuration file path
    fn config_path() -> Result<PathBuf> {
        let home = dirs_next::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".config").join("pricer").join("config.json"))
    }
}
