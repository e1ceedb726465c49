//! Reading the source table from disk.
//!
//! The table must carry every column in [`REQUIRED_COLUMNS`]; any other
//! columns are ignored. Counts must be non-negative integers and the two
//! rate columns non-negative finite floats.

use super::Dataset;
use crate::error::{DataLoadError, Result};
use crate::models::{NumericColumn, Record};
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};

/// Columns the source table must provide.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "Country/Region",
    "Confirmed",
    "Deaths",
    "Recovered",
    "Active",
    "Deaths / 100 Cases",
    "Recovered / 100 Cases",
    "WHO Region",
];

/// How to read the source table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Field delimiter byte.
    pub delimiter: u8,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl LoadOptions {
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

/// Read and validate the table at `path`.
pub fn load_dataset(path: &Path, options: &LoadOptions) -> Result<Dataset> {
    debug!("Reading {} (delimiter {:?})", path.display(), options.delimiter as char);

    let file = File::open(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => DataLoadError::NotFound {
            path: path.to_path_buf(),
        },
        _ => DataLoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|source| DataLoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .clone();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|h| h == **column))
        .map(|column| column.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(DataLoadError::MissingColumns {
            path: path.to_path_buf(),
            columns: missing,
        }
        .into());
    }

    let mut records = Vec::new();
    let mut raw = csv::StringRecord::new();
    let mut row: u64 = 0;

    loop {
        row += 1;
        let more = reader
            .read_record(&mut raw)
            .map_err(|source| DataLoadError::Malformed {
                path: path.to_path_buf(),
                row,
                source,
            })?;
        if !more {
            break;
        }

        let record: Record =
            raw.deserialize(Some(&headers))
                .map_err(|source| DataLoadError::Malformed {
                    path: path.to_path_buf(),
                    row,
                    source,
                })?;

        validate_rates(path, row, &record)?;
        records.push(record);
    }

    let dataset = Dataset::new(path, records)?;
    info!(
        "Loaded {} records from {}",
        dataset.len(),
        path.display()
    );

    Ok(dataset)
}

fn validate_rates(path: &Path, row: u64, record: &Record) -> Result<()> {
    for column in [
        NumericColumn::DeathsPer100Cases,
        NumericColumn::RecoveredPer100Cases,
    ] {
        let value = column.value(record);
        if !value.is_finite() || value < 0.0 {
            return Err(DataLoadError::InvalidValue {
                path: path.to_path_buf(),
                row,
                column: column.column(),
                value,
            }
            .into());
        }
    }
    Ok(())
}
