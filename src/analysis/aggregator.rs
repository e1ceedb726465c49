//! Metric aggregation and summary statistics.
//!
//! This module provides the ranked, summed and grouped tables the
//! dashboard views are drawn from.

use crate::dataset::Dataset;
use crate::error::Result;
use crate::models::{ColumnSummary, GlobalTotals, Metric, NumericColumn, Record, RegionSums, ScatterPoint};
use std::collections::HashMap;

/// Get the top N records by a metric, highest first.
///
/// The sort is stable: records with equal values keep their dataset order.
pub fn top_n(dataset: &Dataset, metric: Metric, n: usize) -> Vec<Record> {
    let mut ranked: Vec<&Record> = dataset.iter().collect();
    ranked.sort_by_key(|r| std::cmp::Reverse(metric.value(r)));

    ranked.into_iter().take(n).cloned().collect()
}

/// Like [`top_n`], with the metric given by column name.
pub fn top_n_by_name(dataset: &Dataset, metric: &str, n: usize) -> Result<Vec<Record>> {
    let metric: Metric = metric.parse()?;
    Ok(top_n(dataset, metric, n))
}

/// Sum confirmed, deaths and recovered over every record.
///
/// Sums saturate at `u64::MAX`.
pub fn global_totals(dataset: &Dataset) -> GlobalTotals {
    dataset
        .iter()
        .fold(GlobalTotals::default(), |mut totals, r| {
            totals.confirmed = totals.confirmed.saturating_add(r.confirmed);
            totals.deaths = totals.deaths.saturating_add(r.deaths);
            totals.recovered = totals.recovered.saturating_add(r.recovered);
            totals
        })
}

/// Group records by region and sum the requested metrics.
///
/// Groups come out in the order their region first appears in the dataset.
/// Sums saturate at `u64::MAX`.
pub fn group_by_region(dataset: &Dataset, metrics: &[Metric]) -> Vec<RegionSums> {
    let mut groups: Vec<RegionSums> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for record in dataset {
        let position = *positions.entry(record.region.as_str()).or_insert_with(|| {
            groups.push(RegionSums {
                region: record.region.clone(),
                entities: 0,
                sums: metrics.iter().map(|m| (*m, 0)).collect(),
            });
            groups.len() - 1
        });

        let group = &mut groups[position];
        group.entities += 1;
        for (metric, sum) in group.sums.iter_mut() {
            *sum = sum.saturating_add(metric.value(record));
        }
    }

    groups
}

/// The first `n` records, in dataset order.
pub fn head(dataset: &Dataset, n: usize) -> &[Record] {
    let records = dataset.records();
    &records[..n.min(records.len())]
}

/// Descriptive statistics for every numeric column.
pub fn describe(dataset: &Dataset) -> Vec<ColumnSummary> {
    NumericColumn::ALL
        .iter()
        .map(|column| {
            let values: Vec<f64> = dataset.iter().map(|r| column.value(r)).collect();
            summarize(column.column(), values)
        })
        .collect()
}

fn summarize(column: &str, mut values: Vec<f64>) -> ColumnSummary {
    values.sort_by(f64::total_cmp);
    let count = values.len();

    let mean = if count > 0 {
        Some(values.iter().sum::<f64>() / count as f64)
    } else {
        None
    };

    let std = match mean {
        Some(mean) if count > 1 => {
            let variance =
                values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            Some(variance.sqrt())
        }
        _ => None,
    };

    ColumnSummary {
        column: column.to_string(),
        count,
        mean,
        std,
        min: values.first().copied(),
        p25: quantile(&values, 0.25),
        median: quantile(&values, 0.5),
        p75: quantile(&values, 0.75),
        max: values.last().copied(),
    }
}

/// Linear-interpolated quantile of sorted values.
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Points for the rate and case-count scatter charts, in dataset order.
pub fn scatter_points(dataset: &Dataset) -> Vec<ScatterPoint> {
    dataset
        .iter()
        .map(|r| ScatterPoint {
            country: r.country.clone(),
            region: r.region.clone(),
            confirmed: r.confirmed,
            deaths: r.deaths,
            recovered: r.recovered,
            deaths_per_100_cases: r.deaths_per_100_cases,
            recovered_per_100_cases: r.recovered_per_100_cases,
        })
        .collect()
}
