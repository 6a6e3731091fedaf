//! Handles settings for the application. Configuration is read from
//! `settings.toml`, then from `QUOTA_*` environment variables
//! (e.g. `QUOTA_APP__LEVEL=debug`).
//!
//! See `settings.toml` for the configuration.
use std::path::PathBuf;

use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "settings";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
    /// Pretty-print the JSON report.
    pub pretty: bool,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            pretty: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
}

#[derive(Debug, Parser)]
#[command(name = "quota", about = "Balances and settlement plan for a group ledger")]
pub struct Args {
    /// Ledger JSON document.
    pub ledger: PathBuf,
    /// Optional config file path (TOML).
    #[arg(long)]
    pub config: Option<String>,
    /// Override log level (e.g. debug).
    #[arg(long)]
    pub level: Option<String>,
}

impl Settings {
    /// An explicit `config_path` must exist; the default one is optional.
    pub fn new(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(
                File::with_name(config_path.unwrap_or(DEFAULT_CONFIG_PATH))
                    .required(config_path.is_some()),
            )
            .add_source(
                Environment::with_prefix("QUOTA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
