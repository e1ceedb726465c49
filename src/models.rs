//! Data models for the aggregation service.
//!
//! This module contains the record type read from the source table, the
//! metric enums used to select columns, and every derived table the
//! presentation layer consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::AnalysisError;

/// A case-count column that can be used for ranking and summing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Metric {
    Confirmed,
    Deaths,
    Recovered,
    Active,
}

impl Metric {
    /// Every metric, in column order.
    pub const ALL: [Metric; 4] = [
        Metric::Confirmed,
        Metric::Deaths,
        Metric::Recovered,
        Metric::Active,
    ];

    /// Column name in the source table.
    pub fn column(&self) -> &'static str {
        match self {
            Metric::Confirmed => "Confirmed",
            Metric::Deaths => "Deaths",
            Metric::Recovered => "Recovered",
            Metric::Active => "Active",
        }
    }

    /// Reads this metric from a record.
    pub fn value(&self, record: &Record) -> u64 {
        match self {
            Metric::Confirmed => record.confirmed,
            Metric::Deaths => record.deaths,
            Metric::Recovered => record.recovered,
            Metric::Active => record.active,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column())
    }
}

impl FromStr for Metric {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "confirmed" => Ok(Metric::Confirmed),
            "deaths" => Ok(Metric::Deaths),
            "recovered" => Ok(Metric::Recovered),
            "active" => Ok(Metric::Active),
            _ => Err(AnalysisError::InvalidMetric(s.to_string())),
        }
    }
}

/// Any numeric column of the source table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumericColumn {
    Count(Metric),
    DeathsPer100Cases,
    RecoveredPer100Cases,
}

impl NumericColumn {
    /// Every numeric column, in table order.
    pub const ALL: [NumericColumn; 6] = [
        NumericColumn::Count(Metric::Confirmed),
        NumericColumn::Count(Metric::Deaths),
        NumericColumn::Count(Metric::Recovered),
        NumericColumn::Count(Metric::Active),
        NumericColumn::DeathsPer100Cases,
        NumericColumn::RecoveredPer100Cases,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            NumericColumn::Count(metric) => metric.column(),
            NumericColumn::DeathsPer100Cases => "Deaths / 100 Cases",
            NumericColumn::RecoveredPer100Cases => "Recovered / 100 Cases",
        }
    }

    pub fn value(&self, record: &Record) -> f64 {
        match self {
            NumericColumn::Count(metric) => metric.value(record) as f64,
            NumericColumn::DeathsPer100Cases => record.deaths_per_100_cases,
            NumericColumn::RecoveredPer100Cases => record.recovered_per_100_cases,
        }
    }
}

impl fmt::Display for NumericColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column())
    }
}

/// One row of the source table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Entity (country) name, the unique key.
    #[serde(rename = "Country/Region")]
    pub country: String,
    #[serde(rename = "Confirmed")]
    pub confirmed: u64,
    #[serde(rename = "Deaths")]
    pub deaths: u64,
    #[serde(rename = "Recovered")]
    pub recovered: u64,
    #[serde(rename = "Active")]
    pub active: u64,
    #[serde(rename = "Deaths / 100 Cases")]
    pub deaths_per_100_cases: f64,
    #[serde(rename = "Recovered / 100 Cases")]
    pub recovered_per_100_cases: f64,
    /// WHO region label.
    #[serde(rename = "WHO Region")]
    pub region: String,
}

/// Sums over every record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalTotals {
    pub confirmed: u64,
    pub deaths: u64,
    pub recovered: u64,
}

/// Per-region sums of the requested metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSums {
    pub region: String,
    /// Number of entities in the region.
    pub entities: usize,
    pub sums: BTreeMap<Metric, u64>,
}

impl RegionSums {
    /// Sum for a metric, zero when the metric was not requested.
    pub fn get(&self, metric: Metric) -> u64 {
        self.sums.get(&metric).copied().unwrap_or(0)
    }
}

/// Symmetric Pearson correlation matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub metrics: Vec<Metric>,
    /// Row-major coefficients, `values[i][j]` pairs `metrics[i]` with `metrics[j]`.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: Metric, b: Metric) -> Option<f64> {
        let i = self.metrics.iter().position(|m| *m == a)?;
        let j = self.metrics.iter().position(|m| *m == b)?;
        Some(self.values[i][j])
    }
}

/// Descriptive statistics for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub p25: Option<f64>,
    pub median: Option<f64>,
    pub p75: Option<f64>,
    pub max: Option<f64>,
}

/// One point for the rate and case-count scatter charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub country: String,
    pub region: String,
    pub confirmed: u64,
    pub deaths: u64,
    pub recovered: u64,
    pub deaths_per_100_cases: f64,
    pub recovered_per_100_cases: f64,
}

/// A derived table that may be unavailable for the current data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "lowercase")]
pub enum Panel<T> {
    Ready(T),
    Skipped { reason: String },
}

impl<T> Panel<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Panel::Ready(value) => Some(value),
            Panel::Skipped { .. } => None,
        }
    }
}

/// Everything the all-entities view renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    /// Metric used for ranking.
    pub metric: Metric,
    pub top: Vec<Record>,
    pub totals: GlobalTotals,
    pub regions: Vec<RegionSums>,
    pub correlation: Panel<CorrelationMatrix>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub summary: Vec<ColumnSummary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scatter: Vec<ScatterPoint>,
}

/// Everything the single-entity view renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub record: Record,
}

/// Output of one view computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "view", content = "data", rename_all = "snake_case")]
pub enum AggregationResult {
    AllEntities(Overview),
    SingleEntity(Snapshot),
}

/// Metadata about a generated report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Path of the source table.
    pub data_path: String,
    pub generated_at: DateTime<Utc>,
    /// Number of entities in the dataset.
    pub entities: usize,
    /// Human-readable selection, e.g. "All Countries by Deaths".
    pub selection: String,
    pub duration_seconds: f64,
}

/// A complete report handed to the generators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub result: AggregationResult,
    /// First rows of the dataset, empty when the preview is disabled.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preview: Vec<Record>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::Record;

    /// Builds a record with derived rates and a consistent active count.
    pub fn record(country: &str, region: &str, confirmed: u64, deaths: u64, recovered: u64) -> Record {
        let rate = |n: u64| {
            if confirmed == 0 {
                0.0
            } else {
                (n as f64 / confirmed as f64 * 10_000.0).round() / 100.0
            }
        };
        Record {
            country: country.to_string(),
            confirmed,
            deaths,
            recovered,
            active: confirmed.saturating_sub(deaths + recovered),
            deaths_per_100_cases: rate(deaths),
            recovered_per_100_cases: rate(recovered),
            region: region.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::record;
    use super::*;

    #[test]
    fn test_metric_from_str() {
        assert_eq!("Confirmed".parse::<Metric>().unwrap(), Metric::Confirmed);
        assert_eq!("deaths".parse::<Metric>().unwrap(), Metric::Deaths);
        assert_eq!(" ACTIVE ".parse::<Metric>().unwrap(), Metric::Active);

        let err = "Deaths / 100 Cases".parse::<Metric>().unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidMetric(name) if name == "Deaths / 100 Cases"));
    }

    #[test]
    fn test_metric_value() {
        let r = record("India", "South-East Asia", 200, 10, 150);
        assert_eq!(Metric::Confirmed.value(&r), 200);
        assert_eq!(Metric::Deaths.value(&r), 10);
        assert_eq!(Metric::Recovered.value(&r), 150);
        assert_eq!(Metric::Active.value(&r), 40);
    }

    #[test]
    fn test_numeric_column_value() {
        let r = record("India", "South-East Asia", 200, 10, 150);
        assert_eq!(NumericColumn::Count(Metric::Deaths).value(&r), 10.0);
        assert_eq!(NumericColumn::DeathsPer100Cases.value(&r), 5.0);
        assert_eq!(NumericColumn::RecoveredPer100Cases.value(&r), 75.0);
        assert_eq!(NumericColumn::DeathsPer100Cases.to_string(), "Deaths / 100 Cases");
    }

    #[test]
    fn test_region_sums_get_defaults_to_zero() {
        let sums = RegionSums {
            region: "Europe".to_string(),
            entities: 1,
            sums: [(Metric::Confirmed, 5)].into_iter().collect(),
        };
        assert_eq!(sums.get(Metric::Confirmed), 5);
        assert_eq!(sums.get(Metric::Active), 0);
    }

    #[test]
    fn test_aggregation_result_serializes_tagged() {
        let result = AggregationResult::SingleEntity(Snapshot {
            record: record("Brazil", "Americas", 150, 5, 100),
        });
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"view\":\"single_entity\""));
        assert!(json.contains("\"Country/Region\":\"Brazil\""));

        let skipped: Panel<CorrelationMatrix> = Panel::Skipped {
            reason: "too few rows".to_string(),
        };
        let json = serde_json::to_string(&skipped).unwrap();
        assert!(json.contains("\"status\":\"skipped\""));
        assert!(skipped.ready().is_none());
    }
}
