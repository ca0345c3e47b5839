//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.airteq.toml` files. Nothing here is ever written back: thresholds
//! picked on the command line only live for the current run.

use crate::cli::OutputFormat;
use crate::error::ConfigError;
use crate::models::{ThresholdConfig, DEFAULT_GREEN_MAX, DEFAULT_ORANGE_MAX};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".airteq.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Input data settings.
    #[serde(default)]
    pub data: DataConfig,

    /// Band boundaries.
    #[serde(default)]
    pub thresholds: ThresholdSettings,

    /// Text chart settings.
    #[serde(default)]
    pub chart: ChartConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Input data settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path to the sensor CSV.
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("airteq_subset.csv")
}

/// Raw threshold values as written in the file; validated by
/// [`ThresholdSettings::to_config`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdSettings {
    /// Upper bound of the green band (ppm).
    #[serde(default = "default_green_max")]
    pub green_max: f64,

    /// Upper bound of the orange band (ppm).
    #[serde(default = "default_orange_max")]
    pub orange_max: f64,
}

impl Default for ThresholdSettings {
    fn default() -> Self {
        Self {
            green_max: default_green_max(),
            orange_max: default_orange_max(),
        }
    }
}

fn default_green_max() -> f64 {
    DEFAULT_GREEN_MAX
}

fn default_orange_max() -> f64 {
    DEFAULT_ORANGE_MAX
}

impl ThresholdSettings {
    pub fn to_config(&self) -> Result<ThresholdConfig, ConfigError> {
        ThresholdConfig::new(self.green_max, self.orange_max)
    }
}

/// Text chart settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Lower edge of the value axis (ppm).
    #[serde(default = "default_y_min")]
    pub y_min: f64,

    /// Upper edge of the value axis (ppm).
    #[serde(default = "default_y_max")]
    pub y_max: f64,

    /// Bar width in characters.
    #[serde(default = "default_chart_width")]
    pub width: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            y_min: default_y_min(),
            y_max: default_y_max(),
            width: default_chart_width(),
        }
    }
}

fn default_y_min() -> f64 {
    300.0
}

fn default_y_max() -> f64 {
    1800.0
}

fn default_chart_width() -> usize {
    50
}

impl ChartConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.y_min.is_finite() && self.y_max.is_finite()) || self.y_min >= self.y_max {
            return Err(ConfigError::InvalidChartRange {
                y_min: self.y_min,
                y_max: self.y_max,
            });
        }
        Ok(())
    }
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Default output format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Include the text chart per room.
    #[serde(default = "default_true")]
    pub include_chart: bool,

    /// Include the hourly table per room.
    #[serde(default = "default_true")]
    pub include_table: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            include_chart: true,
            include_table: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load `.airteq.toml` from a directory.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref data) = args.data {
            self.data.path = data.clone();
        }

        if let Some(green_max) = args.green_max {
            self.thresholds.green_max = green_max;
        }
        if let Some(orange_max) = args.orange_max {
            self.thresholds.orange_max = orange_max;
        }

        if let Some(format) = args.format {
            self.report.format = format;
        }

        // Flags always override
        if args.no_chart {
            self.report.include_chart = false;
        }
    }

    /// Validate the merged settings and produce the classifier thresholds.
    pub fn thresholds(&self) -> Result<ThresholdConfig, ConfigError> {
        self.chart.validate()?;
        self.thresholds.to_config()
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::tests::make_args;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data.path, PathBuf::from("airteq_subset.csv"));
        assert_eq!(config.thresholds.green_max, 550.0);
        assert_eq!(config.thresholds.orange_max, 700.0);
        assert_eq!(config.chart.y_min, 300.0);
        assert_eq!(config.chart.y_max, 1800.0);
        assert_eq!(config.report.format, OutputFormat::Markdown);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[data]
path = "data/metingen.csv"

[thresholds]
green_max = 600
orange_max = 900.5

[report]
format = "json"
include_chart = false
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.data.path, PathBuf::from("data/metingen.csv"));
        assert_eq!(config.thresholds.green_max, 600.0);
        assert_eq!(config.thresholds.orange_max, 900.5);
        assert_eq!(config.report.format, OutputFormat::Json);
        assert!(!config.report.include_chart);
        assert!(config.report.include_table);
        assert_eq!(config.chart.width, 50);
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let toml_content = r#"
[thresholds]
green_max = 800
orange_max = 700
"#;
        let config: Config = toml::from_str(toml_content).unwrap();
        assert!(matches!(
            config.thresholds(),
            Err(ConfigError::InvalidThresholds { .. })
        ));
    }

    #[test]
    fn test_invalid_chart_range_rejected() {
        let mut config = Config::default();
        config.chart.y_min = 2000.0;
        assert!(matches!(
            config.thresholds(),
            Err(ConfigError::InvalidChartRange { .. })
        ));
    }

    #[test]
    fn test_merge_with_args() {
        let mut config = Config::default();
        let mut args = make_args();
        args.data = Some(PathBuf::from("other.csv"));
        args.orange_max = Some(1000.0);
        args.format = Some(OutputFormat::Json);
        args.no_chart = true;

        config.merge_with_args(&args);

        assert_eq!(config.data.path, PathBuf::from("other.csv"));
        assert_eq!(config.thresholds.green_max, 550.0);
        assert_eq!(config.thresholds.orange_max, 1000.0);
        assert_eq!(config.report.format, OutputFormat::Json);
        assert!(!config.report.include_chart);
    }

    #[test]
    fn test_load_from_dir() {
        let temp_dir = TempDir::new().unwrap();
        assert!(Config::load_from_dir(temp_dir.path()).unwrap().is_none());

        std::fs::write(
            temp_dir.path().join(CONFIG_FILE_NAME),
            "[thresholds]\ngreen_max = 500.0\n",
        )
        .unwrap();
        let config = Config::load_from_dir(temp_dir.path()).unwrap().unwrap();
        assert_eq!(config.thresholds.green_max, 500.0);

        std::fs::write(temp_dir.path().join(CONFIG_FILE_NAME), "[thresholds\n").unwrap();
        assert!(Config::load_from_dir(temp_dir.path()).is_err());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[data]"));
        assert!(toml_str.contains("[thresholds]"));
        assert!(toml_str.contains("green_max = 550.0"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.chart.width, 50);
    }
}
