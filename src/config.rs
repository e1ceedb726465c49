//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.covistat.toml` files.

use anyhow::{bail, Context, Result};
use covistat::dataset::{LoadOptions, DEFAULT_DATA_FILE};
use covistat::models::Metric;
use covistat::report::ReportOptions;
use covistat::view::ViewOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::{Args, OutputFormat};

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".covistat.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Source table settings.
    #[serde(default)]
    pub data: DataConfig,

    /// Overview computation settings.
    #[serde(default)]
    pub view: ViewConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Report output path; stdout when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Report format.
    #[serde(default)]
    pub format: OutputFormat,
}

/// Source table settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path to the CSV table.
    #[serde(default = "default_data_path")]
    pub path: PathBuf,

    /// Single-character field delimiter.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            delimiter: default_delimiter(),
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_FILE)
}

fn default_delimiter() -> String {
    ",".to_string()
}

impl DataConfig {
    /// Loader options for this configuration.
    pub fn load_options(&self) -> Result<LoadOptions> {
        match self.delimiter.as_bytes() {
            [byte] => Ok(LoadOptions::default().with_delimiter(*byte)),
            _ => bail!(
                "Delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            ),
        }
    }
}

/// Overview computation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Rows in the ranked table.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Metric the overview is ranked by on start.
    #[serde(default = "default_metric")]
    pub default_metric: Metric,

    /// Metrics summed per WHO region.
    #[serde(default = "default_region_metrics")]
    pub region_metrics: Vec<Metric>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            default_metric: default_metric(),
            region_metrics: default_region_metrics(),
        }
    }
}

fn default_top_n() -> usize {
    10
}

fn default_metric() -> Metric {
    Metric::Confirmed
}

fn default_region_metrics() -> Vec<Metric> {
    vec![Metric::Confirmed, Metric::Deaths, Metric::Recovered]
}

impl ViewConfig {
    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            top_n: self.top_n,
            region_metrics: self.region_metrics.clone(),
        }
    }
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Include the descriptive statistics table.
    #[serde(default = "default_true")]
    pub include_summary: bool,

    /// Include the scatter series table.
    #[serde(default = "default_true")]
    pub include_scatter: bool,

    /// Raw rows to preview; zero disables the preview.
    #[serde(default)]
    pub raw_rows: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_summary: true,
            include_scatter: true,
            raw_rows: 0,
        }
    }
}

fn default_true() -> bool {
    true
}

impl ReportConfig {
    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            include_summary: self.include_summary,
            include_scatter: self.include_scatter,
        }
    }
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

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &Args) {
        if let Some(ref data) = args.data {
            self.data.path = data.clone();
        }
        if let Some(metric) = args.metric {
            self.view.default_metric = metric.into();
        }
        if let Some(top) = args.top {
            self.view.top_n = top;
        }
        if let Some(ref output) = args.output {
            self.general.output = Some(output.clone());
        }
        if let Some(format) = args.format {
            self.general.format = format;
        }
        if let Some(rows) = args.raw_rows {
            self.report.raw_rows = rows;
        }

        // Flags always override
        if args.no_summary {
            self.report.include_summary = false;
        }
        if args.verbose {
            self.general.verbose = true;
        }
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
    use clap::Parser;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data.path, PathBuf::from("country_wise_latest.csv"));
        assert_eq!(config.view.top_n, 10);
        assert_eq!(config.view.default_metric, Metric::Confirmed);
        assert_eq!(config.general.format, OutputFormat::Markdown);
        assert!(config.general.output.is_none());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "report.md"
verbose = true
format = "json"

[data]
path = "data/covid.csv"
delimiter = ";"

[view]
top_n = 5
default_metric = "Deaths"
region_metrics = ["Confirmed", "Active"]

[report]
include_scatter = false
raw_rows = 20
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, Some(PathBuf::from("report.md")));
        assert!(config.general.verbose);
        assert_eq!(config.general.format, OutputFormat::Json);
        assert_eq!(config.data.path, PathBuf::from("data/covid.csv"));
        assert_eq!(config.data.load_options().unwrap().delimiter, b';');
        assert_eq!(config.view.top_n, 5);
        assert_eq!(config.view.default_metric, Metric::Deaths);
        assert_eq!(config.view.region_metrics, vec![Metric::Confirmed, Metric::Active]);
        assert!(config.report.include_summary);
        assert!(!config.report.include_scatter);
        assert_eq!(config.report.raw_rows, 20);
    }

    #[test]
    fn test_unknown_metric_rejected() {
        let result: std::result::Result<Config, _> = toml::from_str("[view]\ndefault_metric = \"Population\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_delimiter() {
        let config = DataConfig {
            path: default_data_path(),
            delimiter: "::".to_string(),
        };
        assert!(config.load_options().is_err());
    }

    #[test]
    fn test_merge_only_explicit_args() {
        let mut config: Config = toml::from_str("[view]\ntop_n = 5\ndefault_metric = \"Deaths\"\n").unwrap();

        let args = Args::try_parse_from(["covistat", "--format", "json"]).unwrap();
        config.merge_with_args(&args);
        assert_eq!(config.view.top_n, 5);
        assert_eq!(config.view.default_metric, Metric::Deaths);
        assert_eq!(config.general.format, OutputFormat::Json);

        let args = Args::try_parse_from(["covistat", "-m", "active", "-n", "3", "--no-summary"]).unwrap();
        config.merge_with_args(&args);
        assert_eq!(config.view.top_n, 3);
        assert_eq!(config.view.default_metric, Metric::Active);
        assert!(!config.report.include_summary);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[data]"));
        assert!(toml_str.contains("[view]"));
        assert!(toml_str.contains("[report]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.view.top_n, 10);
    }
}
