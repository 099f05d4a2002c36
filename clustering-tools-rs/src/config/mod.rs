//! Configuration types for the clustering tools.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::render::{OutputFormat, DEFAULT_VARIABLE_NAME};

/// Configuration for offset generation output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OffsetConfig {
    /// Output format used when none is given on the command line
    #[serde(default)]
    pub format: OutputFormat,

    /// Variable name of the generated C# array
    #[serde(default = "default_variable_name")]
    pub variable_name: String,
}

fn default_variable_name() -> String {
    DEFAULT_VARIABLE_NAME.to_string()
}

impl Default for OffsetConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            variable_name: default_variable_name(),
        }
    }
}

/// Configuration for the variance log maintenance tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Setting key written by older experiment builds
    #[serde(default = "default_legacy_key")]
    pub legacy_key: String,

    /// Key that replaces `legacy_key`
    #[serde(default = "default_key")]
    pub key: String,

    /// Extension of log files to normalize (case-insensitive)
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Line at which variance logs are truncated
    #[serde(default = "default_marker")]
    pub marker: String,
}

fn default_legacy_key() -> String {
    "mode".to_string()
}

fn default_key() -> String {
    "algorithm".to_string()
}

fn default_extension() -> String {
    "csv".to_string()
}

fn default_marker() -> String {
    "Frame,Variance".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            legacy_key: default_legacy_key(),
            key: default_key(),
            extension: default_extension(),
            marker: default_marker(),
        }
    }
}

/// Configuration for offset pattern plots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotConfig {
    /// Image width in pixels
    #[serde(default = "default_plot_size")]
    pub width: u32,

    /// Image height in pixels
    #[serde(default = "default_plot_size")]
    pub height: u32,
}

fn default_plot_size() -> u32 {
    1024
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: default_plot_size(),
            height: default_plot_size(),
        }
    }
}

/// Top-level configuration combining all sub-configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub offsets: OffsetConfig,

    #[serde(default)]
    pub logs: LogConfig,

    #[serde(default)]
    pub plot: PlotConfig,
}

impl ToolsConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: ToolsConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
