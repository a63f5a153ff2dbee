//! Server configuration

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Environment variable that points at an alternative config file
pub const CONFIG_PATH_ENV: &str = "PRICER_CONFIG";

const DEFAULT_CONFIG_FILE: &str = "pricer.toml";

/// Pricing server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Name reported in structured logs
    #[serde(default = "default_instance_name")]
    pub instance_name: String,

    /// HTTP listen port for quotes, health and metrics
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Random forest artifact
    #[serde(default = "default_primary_model_path")]
    pub primary_model_path: PathBuf,

    /// Gradient boosted artifact
    #[serde(default = "default_secondary_model_path")]
    pub secondary_model_path: PathBuf,

    /// Market named in seasonal insights
    #[serde(default = "default_market_name")]
    pub market_name: String,
}

fn default_instance_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "pricer".to_string())
}

fn default_listen_port() -> u16 {
    8080
}

fn default_primary_model_path() -> PathBuf {
    PathBuf::from("models/santa_clara_rf.json")
}

fn default_secondary_model_path() -> PathBuf {
    PathBuf::from("models/santa_clara_xgb.json")
}

fn default_market_name() -> String {
    pricer_lib::predictor::DEFAULT_MARKET_NAME.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            instance_name: default_instance_name(),
            listen_port: default_listen_port(),
            primary_model_path: default_primary_model_path(),
            secondary_model_path: default_secondary_model_path(),
            market_name: default_market_name(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from the optional config file and `PRICER_*` environment
    pub fn load() -> Result<Self> {
        let file = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.into());
        Self::load_from(&file)
    }

    /// Load with an explicit config file; a missing file is not an error
    pub fn load_from(file: &str) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(file).required(false))
            .add_source(config::Environment::with_prefix("PRICER"))
            .build()
            .with_context(|| format!("Failed to read configuration from {}", file))?;

        config
            .try_deserialize()
            .context("Invalid pricer configuration")
    }
}
