//! covistat - COVID-19 country statistics report
//!
//! A CLI front end for the aggregation service: loads the country table,
//! applies the requested selection and writes the derived tables as a
//! Markdown or JSON report.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Error (missing data file, unknown country, bad config, etc.)

mod cli;
mod config;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE};
use covistat::analysis::head;
use covistat::dataset::{Dataset, DatasetCache};
use covistat::models::{Report, ReportMetadata};
use covistat::report;
use covistat::view::ViewSelector;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // The config can raise the log level, so it is read before logging starts
    let (mut config, source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(&args, &config);

    info!("covistat v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    source.log();

    if let Err(e) = run(args, config) {
        error!("Report failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .covistat.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to change the data file, ranking metric, top N and report sections.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so a report written to stdout stays clean.
fn init_logging(args: &Args, config: &Config) {
    let level = args.log_level(config);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load the data, compute the selected view and write the report.
fn run(args: Args, config: Config) -> Result<()> {
    let cache = DatasetCache::new(config.data.load_options()?);
    let dataset = load_with_spinner(&cache, &config, args.quiet)?;

    if args.list_countries {
        for choice in ViewSelector::choices(&dataset) {
            println!("{}", choice);
        }
        return Ok(());
    }

    let start_time = Instant::now();

    // The ranking metric only applies to the overview; a country choice replaces it.
    let mut selector = ViewSelector::new(config.view.default_metric, config.view.view_options());
    selector.select_entity(&args.country);

    let result = selector
        .compute(&dataset)
        .with_context(|| format!("Failed to compute view for {}", selector.state()))?;

    let report = Report {
        metadata: ReportMetadata {
            data_path: dataset.source().display().to_string(),
            generated_at: Utc::now(),
            entities: dataset.len(),
            selection: selector.state().to_string(),
            duration_seconds: start_time.elapsed().as_secs_f64(),
        },
        result,
        preview: head(&dataset, config.report.raw_rows).to_vec(),
    };

    let output = match config.general.format {
        OutputFormat::Json => {
            report::generate_json_report(&report, &config.report.report_options())?
        }
        OutputFormat::Markdown => {
            report::generate_markdown_report(&report, &config.report.report_options())
        }
    };

    match config.general.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!("Report saved to {}", path.display());
        }
        None => print!("{}", output),
    }

    Ok(())
}

/// Load the dataset, showing a spinner unless quiet.
fn load_with_spinner(cache: &DatasetCache, config: &Config, quiet: bool) -> Result<Arc<Dataset>> {
    let spinner = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    };
    spinner.set_message(format!("Loading {}", config.data.path.display()));

    let loaded = cache.get_or_load(&config.data.path);
    spinner.finish_and_clear();

    loaded.with_context(|| format!("Failed to load data from {}", config.data.path.display()))
}

/// Where the configuration came from, logged once logging is set up.
enum ConfigSource {
    Explicit(PathBuf),
    Default,
    Missing,
    Invalid(anyhow::Error),
}

impl ConfigSource {
    fn log(&self) {
        match self {
            ConfigSource::Explicit(path) => info!("Loaded config from: {}", path.display()),
            ConfigSource::Default => info!("Loaded default config from {}", CONFIG_FILE),
            ConfigSource::Missing => debug!("No config file found, using defaults"),
            ConfigSource::Invalid(e) => warn!("Failed to load config: {}", e),
        }
    }
}

/// Load configuration from file or use defaults.
///
/// An explicit `--config` path must load; a broken default file falls back
/// to the defaults.
fn load_config(args: &Args) -> Result<(Config, ConfigSource)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigSource::Explicit(config_path.clone())));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, ConfigSource::Default)),
        Ok(None) => Ok((Config::default(), ConfigSource::Missing)),
        Err(e) => Ok((Config::default(), ConfigSource::Invalid(e))),
    }
}
