//! Pairwise Pearson correlation over case-count metrics.

use crate::dataset::Dataset;
use crate::error::{AnalysisError, Result};
use crate::models::{CorrelationMatrix, Metric};
use tracing::debug;

/// Compute the symmetric correlation matrix for `metrics`.
///
/// The diagonal is exactly 1.0 and every other entry lies in [-1, 1].
/// Fails with `InsufficientData` when there are fewer than two records or
/// a metric has zero variance.
pub fn correlation_matrix(dataset: &Dataset, metrics: &[Metric]) -> Result<CorrelationMatrix> {
    if dataset.len() < 2 {
        return Err(AnalysisError::InsufficientData(format!(
            "correlation needs at least 2 records, dataset has {}",
            dataset.len()
        )));
    }

    let columns: Vec<Vec<f64>> = metrics
        .iter()
        .map(|m| dataset.iter().map(|r| m.value(r) as f64).collect())
        .collect();
    let centered: Vec<Centered> = columns.iter().map(|c| Centered::new(c)).collect();

    if let Some(i) = centered.iter().position(|c| c.sum_squares == 0.0) {
        return Err(AnalysisError::InsufficientData(format!(
            "column '{}' has zero variance",
            metrics[i]
        )));
    }

    let n = metrics.len();
    let mut values = vec![vec![0.0; n]; n];
    for i in 0..n {
        values[i][i] = 1.0;
        for j in (i + 1)..n {
            let r = pearson(&centered[i], &centered[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    debug!("Computed {}x{} correlation matrix over {} records", n, n, dataset.len());

    Ok(CorrelationMatrix {
        metrics: metrics.to_vec(),
        values,
    })
}

/// Deviations from the mean plus their sum of squares.
struct Centered {
    deviations: Vec<f64>,
    sum_squares: f64,
}

impl Centered {
    fn new(values: &[f64]) -> Self {
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let deviations: Vec<f64> = values.iter().map(|v| v - mean).collect();
        let sum_squares = deviations.iter().map(|d| d * d).sum();

        Self {
            deviations,
            sum_squares,
        }
    }
}

fn pearson(x: &Centered, y: &Centered) -> f64 {
    let covariance: f64 = x
        .deviations
        .iter()
        .zip(&y.deviations)
        .map(|(a, b)| a * b)
        .sum();

    (covariance / (x.sum_squares * y.sum_squares).sqrt()).clamp(-1.0, 1.0)
}
