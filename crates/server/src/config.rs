//! Server configuration.
//!
//! Layered as file < environment < CLI flag: a TOML file supplies the
//! base, and individual flags (each with an env-var alias) override it.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use launchpad_types::config::ValidationConfig;
use serde::Deserialize;
use snafu::{ResultExt, Snafu};

/// Errors from loading the configuration file.
#[derive(Debug, Snafu)]
#[allow(missing_docs)]
pub enum ConfigError {
    #[snafu(display("failed to read config file {path:?}: {source}"))]
    Read { path: PathBuf, source: std::io::Error },

    #[snafu(display("failed to parse config file {path:?}: {source}"))]
    Parse { path: PathBuf, source: toml::de::Error },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text.
    Text,
    /// JSON lines for log aggregation.
    Json,
    /// JSON when stdout is not a terminal, text otherwise.
    #[default]
    Auto,
}

/// Server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Log output format.
    #[serde(default)]
    pub log_format: LogFormat,
    /// Input size limits enforced by the project service.
    #[serde(default)]
    pub limits: ValidationConfig,
}

/// Command-line interface for the registry server.
#[derive(Debug, Parser)]
#[command(name = "launchpad-server", version, about = "Launchpad project registry server")]
pub struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long, env = "LAUNCHPAD__CONFIG")]
    pub config: Option<PathBuf>,

    /// Log output format, overriding the config file.
    #[arg(long, env = "LAUNCHPAD__LOG_FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,
}

impl Cli {
    /// Resolves the layered configuration.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] if the config file cannot be read or parsed.
    pub fn load_config(&self) -> Result<Config, ConfigError> {
        let mut config = match &self.config {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .context(ReadSnafu { path: path.clone() })?;
                toml::from_str(&raw).context(ParseSnafu { path: path.clone() })?
            },
            None => Config::default(),
        };
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        Ok(config)
    }
}
