//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use covistat::models::Metric;
use covistat::view::ALL_ENTITIES;
use std::path::PathBuf;

use crate::config::Config;

/// covistat - COVID-19 country statistics report
///
/// Loads a country-wise COVID-19 table and writes the derived tables a
/// dashboard would chart: top countries, global totals, WHO region sums,
/// correlations, or a single-country snapshot.
///
/// Examples:
///   covistat --data country_wise_latest.csv
///   covistat --metric deaths --top 5
///   covistat --country India --format json
///   covistat --list-countries
///   covistat --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to the country-wise CSV table
    ///
    /// Defaults to the [data] path in .covistat.toml, then country_wise_latest.csv.
    #[arg(short, long, value_name = "FILE", env = "COVISTAT_DATA")]
    pub data: Option<PathBuf>,

    /// Country to show, or "All Countries" for the overview
    #[arg(short, long, default_value = ALL_ENTITIES, value_name = "NAME")]
    pub country: String,

    /// Metric used to rank countries in the overview
    ///
    /// Ignored when a single country is selected.
    #[arg(short, long, value_name = "METRIC")]
    pub metric: Option<MetricArg>,

    /// Number of countries in the ranked table
    #[arg(short = 'n', long, value_name = "COUNT")]
    pub top: Option<usize>,

    /// Output file path for the report (stdout when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .covistat.toml in the current directory
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Include the first N raw rows in the report
    #[arg(long, value_name = "ROWS")]
    pub raw_rows: Option<usize>,

    /// Leave out the descriptive statistics section
    #[arg(long)]
    pub no_summary: bool,

    /// Print the country choices and exit
    #[arg(long)]
    pub list_countries: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .covistat.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Metric names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum MetricArg {
    Confirmed,
    Deaths,
    Recovered,
    Active,
}

impl From<MetricArg> for Metric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::Confirmed => Metric::Confirmed,
            MetricArg::Deaths => Metric::Deaths,
            MetricArg::Recovered => Metric::Recovered,
            MetricArg::Active => Metric::Active,
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.country.trim().is_empty() {
            return Err("Country must not be empty".to_string());
        }

        if self.top == Some(0) {
            return Err("Top must be at least 1".to_string());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref output) = self.output {
            if output.is_dir() {
                return Err(format!("Output path is a directory: {}", output.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level from the flags and the merged configuration.
    ///
    /// `--quiet` wins over a verbose flag or config setting.
    pub fn log_level(&self, config: &Config) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config.general.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            data: None,
            country: ALL_ENTITIES.to_string(),
            metric: None,
            top: None,
            output: None,
            format: None,
            config: None,
            raw_rows: None,
            no_summary: false,
            list_countries: false,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_defaults() {
        let args = Args::try_parse_from(["covistat"]).unwrap();
        assert_eq!(args.country, ALL_ENTITIES);
        assert!(args.metric.is_none());
        assert!(args.format.is_none());
    }

    #[test]
    fn test_parse_metric_and_country() {
        let args =
            Args::try_parse_from(["covistat", "--metric", "deaths", "-c", "India", "-n", "5"])
                .unwrap();
        assert_eq!(args.metric, Some(MetricArg::Deaths));
        assert_eq!(args.country, "India");
        assert_eq!(args.top, Some(5));
        assert_eq!(Metric::from(MetricArg::Deaths), Metric::Deaths);

        assert!(Args::try_parse_from(["covistat", "--metric", "population"]).is_err());
    }

    #[test]
    fn test_validation_zero_top() {
        let mut args = make_args();
        args.top = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let config = Config::default();
        let mut args = make_args();
        assert_eq!(args.log_level(&config), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(&config), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(&config), tracing::Level::ERROR);
    }

    #[test]
    fn test_log_level_from_config_verbose() {
        let mut config: Config = toml::from_str("[general]\nverbose = true\n").unwrap();
        let mut args = make_args();
        config.merge_with_args(&args);
        assert_eq!(args.log_level(&config), tracing::Level::DEBUG);

        args.quiet = true;
        assert_eq!(args.log_level(&config), tracing::Level::ERROR);
    }
}
