//! Configuration management with profile support.
//!
//! Provides output, table and logging settings for the command-line
//! front-end, with built-in profiles (default, json, verbose) or a TOML
//! file selected through `LADDER_PROFILE`.

use std::path::Path;

use anyhow::Context;
use ladder_core::MAX_FENWICK_INDEX;
use serde::{Deserialize, Serialize};

/// Environment variable selecting a profile name or a TOML file path.
pub const PROFILE_ENV: &str = "LADDER_PROFILE";

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Profile name (for logging/identification)
    #[serde(default = "default_profile_name")]
    pub profile: String,

    /// Output rendering
    #[serde(default)]
    pub output: OutputConfig,

    /// Defaults for the `table` subcommand
    #[serde(default)]
    pub table: TableConfig,

    /// Tracing filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_profile_name() -> String {
    "default".to_string()
}
fn default_log_filter() -> String {
    "info,ladder_core=debug".to_string()
}

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Output rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Pretty-print JSON output
    #[serde(default)]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            pretty: false,
        }
    }
}

/// Ladder table defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    #[serde(default)]
    pub from: u32,

    #[serde(default = "default_table_to")]
    pub to: u32,

    #[serde(default = "default_table_step")]
    pub step: u32,
}

fn default_table_to() -> u32 {
    MAX_FENWICK_INDEX
}
fn default_table_step() -> u32 {
    100
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            from: 0,
            to: default_table_to(),
            step: default_table_step(),
        }
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            profile: default_profile_name(),
            output: OutputConfig::default(),
            table: TableConfig::default(),
            log_filter: default_log_filter(),
        }
    }
}

impl CliConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }

    /// Machine-readable output.
    pub fn json() -> Self {
        Self {
            profile: "json".to_string(),
            output: OutputConfig {
                format: OutputFormat::Json,
                pretty: true,
            },
            ..Self::default()
        }
    }

    /// Debug logging from the core and a denser table.
    pub fn verbose() -> Self {
        Self {
            profile: "verbose".to_string(),
            table: TableConfig {
                step: 10,
                ..TableConfig::default()
            },
            log_filter: "debug,ladder_core=trace".to_string(),
            ..Self::default()
        }
    }

    /// Resolve a profile name or a path to a TOML file.
    pub fn from_profile(profile: &str) -> anyhow::Result<Self> {
        match profile.to_lowercase().as_str() {
            "default" => Ok(Self::default()),
            "json" => Ok(Self::json()),
            "verbose" | "debug" => Ok(Self::verbose()),
            _ if profile.ends_with(".toml") => Self::from_file(profile),
            other => anyhow::bail!("unknown profile {other:?}"),
        }
    }

    /// Get profile from environment variable `LADDER_PROFILE`, or default.
    pub fn from_env() -> anyhow::Result<Self> {
        match std::env::var(PROFILE_ENV) {
            Ok(profile) => Self::from_profile(&profile),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Log the current configuration.
    pub fn log_config(&self) {
        tracing::debug!(profile = %self.profile, "Configuration loaded");
        tracing::debug!(
            format = ?self.output.format,
            pretty = self.output.pretty,
            "Output settings"
        );
        tracing::debug!(
            from = self.table.from,
            to = self.table.to,
            step = self.table.step,
            "Table defaults"
        );
    }
}
