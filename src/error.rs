//! Error types for loading and aggregating the dataset.
//!
//! Loading failures are fatal for the session and carry the offending path.
//! Aggregation failures are caller errors (`InvalidMetric`, `EntityNotFound`)
//! or a view that cannot be computed (`InsufficientData`).

use std::path::PathBuf;
use thiserror::Error;

/// Failure while reading or validating the source table.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("data file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{} is missing required columns: {}", path.display(), columns.join(", "))]
    MissingColumns { path: PathBuf, columns: Vec<String> },

    #[error("malformed row {row} in {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        row: u64,
        #[source]
        source: csv::Error,
    },

    #[error("row {row} in {} has an empty entity name", path.display())]
    EmptyEntity { path: PathBuf, row: u64 },

    #[error("duplicate entity '{name}' at row {row} in {}", path.display())]
    DuplicateEntity {
        path: PathBuf,
        name: String,
        row: u64,
    },

    #[error("row {row} in {}: column '{column}' has invalid value {value}", path.display())]
    InvalidValue {
        path: PathBuf,
        row: u64,
        column: &'static str,
        value: f64,
    },
}

/// Failure of an aggregation or view computation.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    DataLoad(#[from] DataLoadError),

    #[error("unrecognized metric '{0}' (expected Confirmed, Deaths, Recovered or Active)")]
    InvalidMetric(String),

    #[error("no entity named '{0}'")]
    EntityNotFound(String),

    #[error("insufficient data: {0}")]
    InsufficientData(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
