//! View selection.
//!
//! A [`ViewSelector`] tracks what the user is looking at and decides which
//! aggregations to run. It has two states:
//!
//! - `AllEntities { metric }`: ranked, summed and correlated tables over
//!   every entity, ranked by `metric`.
//! - `SingleEntity { name }`: the one record for `name`.
//!
//! Choosing the [`ALL_ENTITIES`] sentinel returns to the all-entities view
//! with the last metric chosen there. Metric changes while a single entity
//! is selected are ignored.

use crate::analysis::{
    correlation_matrix, describe, global_totals, group_by_region, scatter_points, snapshot, top_n,
};
use crate::dataset::Dataset;
use crate::error::{AnalysisError, Result};
use crate::models::{AggregationResult, Metric, Overview, Panel, Snapshot};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Entity choice meaning "no single entity".
pub const ALL_ENTITIES: &str = "All Countries";

/// The current selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewState {
    AllEntities { metric: Metric },
    SingleEntity { name: String },
}

impl fmt::Display for ViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewState::AllEntities { metric } => write!(f, "{} by {}", ALL_ENTITIES, metric),
            ViewState::SingleEntity { name } => write!(f, "{}", name),
        }
    }
}

/// Knobs for the all-entities computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewOptions {
    /// Rows in the ranked table.
    pub top_n: usize,
    /// Metrics summed per region.
    pub region_metrics: Vec<Metric>,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            top_n: 10,
            region_metrics: vec![Metric::Confirmed, Metric::Deaths, Metric::Recovered],
        }
    }
}

/// Two-state selection machine for one session.
#[derive(Debug, Clone)]
pub struct ViewSelector {
    state: ViewState,
    /// Metric the all-entities view returns to.
    metric: Metric,
    options: ViewOptions,
}

impl Default for ViewSelector {
    fn default() -> Self {
        Self::new(Metric::Confirmed, ViewOptions::default())
    }
}

impl ViewSelector {
    /// Start in the all-entities view ranked by `initial_metric`.
    pub fn new(initial_metric: Metric, options: ViewOptions) -> Self {
        Self {
            state: ViewState::AllEntities {
                metric: initial_metric,
            },
            metric: initial_metric,
            options,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn options(&self) -> &ViewOptions {
        &self.options
    }

    /// Apply an entity dropdown change.
    pub fn select_entity(&mut self, choice: &str) {
        let next = if choice == ALL_ENTITIES {
            ViewState::AllEntities {
                metric: self.metric,
            }
        } else {
            ViewState::SingleEntity {
                name: choice.to_string(),
            }
        };

        debug!("View transition: {} -> {}", self.state, next);
        self.state = next;
    }

    /// Apply a metric dropdown change. No effect in the single-entity view.
    pub fn select_metric(&mut self, metric: Metric) {
        if let ViewState::SingleEntity { name } = &self.state {
            debug!("Ignoring metric {} while {} is selected", metric, name);
            return;
        }

        self.metric = metric;
        self.state = ViewState::AllEntities { metric };
        debug!("View metric set to {}", metric);
    }

    /// Like [`select_metric`](Self::select_metric), with the metric given by
    /// column name. Fails with `InvalidMetric` for unknown names, whatever
    /// the current state.
    pub fn select_metric_name(&mut self, metric: &str) -> Result<()> {
        let metric: Metric = metric.parse()?;
        self.select_metric(metric);
        Ok(())
    }

    /// Entity dropdown options: the sentinel, then every entity in order.
    pub fn choices(dataset: &Dataset) -> Vec<String> {
        std::iter::once(ALL_ENTITIES)
            .chain(dataset.entity_names())
            .map(String::from)
            .collect()
    }

    /// Compute every table the current view needs.
    ///
    /// Correlation that cannot be computed becomes a skipped panel; every
    /// other failure is returned.
    pub fn compute(&self, dataset: &Dataset) -> Result<AggregationResult> {
        match &self.state {
            ViewState::SingleEntity { name } => {
                let record = snapshot(dataset, name)?.clone();
                Ok(AggregationResult::SingleEntity(Snapshot { record }))
            }
            ViewState::AllEntities { metric } => {
                let correlation = match correlation_matrix(dataset, &Metric::ALL) {
                    Ok(matrix) => Panel::Ready(matrix),
                    Err(AnalysisError::InsufficientData(reason)) => {
                        warn!("Skipping correlation panel: {}", reason);
                        Panel::Skipped { reason }
                    }
                    Err(e) => return Err(e),
                };

                Ok(AggregationResult::AllEntities(Overview {
                    metric: *metric,
                    top: top_n(dataset, *metric, self.options.top_n),
                    totals: global_totals(dataset),
                    regions: group_by_region(dataset, &self.options.region_metrics),
                    correlation,
                    summary: describe(dataset),
                    scatter: scatter_points(dataset),
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::record;

    fn sample() -> Dataset {
        Dataset::new(
            "mem",
            vec![
                record("US", "Americas", 4290259, 148011, 1325804),
                record("India", "South-East Asia", 1480073, 33408, 951166),
                record("Brazil", "Americas", 2442375, 87618, 1846641),
                record("France", "Europe", 220352, 30212, 81212),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_initial_state() {
        let selector = ViewSelector::default();
        assert_eq!(
            selector.state(),
            &ViewState::AllEntities {
                metric: Metric::Confirmed
            }
        );
    }

    #[test]
    fn test_metric_ignored_in_single_entity_view() {
        let mut selector = ViewSelector::default();

        selector.select_entity("India");
        assert_eq!(
            selector.state(),
            &ViewState::SingleEntity {
                name: "India".to_string()
            }
        );

        selector.select_metric(Metric::Deaths);
        assert_eq!(
            selector.state(),
            &ViewState::SingleEntity {
                name: "India".to_string()
            }
        );

        // Returning to all entities keeps the metric chosen before.
        selector.select_entity(ALL_ENTITIES);
        assert_eq!(
            selector.state(),
            &ViewState::AllEntities {
                metric: Metric::Confirmed
            }
        );
    }

    #[test]
    fn test_metric_remembered_across_entity_changes() {
        let mut selector = ViewSelector::default();
        selector.select_metric(Metric::Recovered);
        selector.select_entity("Brazil");
        selector.select_entity(ALL_ENTITIES);

        assert_eq!(
            selector.state(),
            &ViewState::AllEntities {
                metric: Metric::Recovered
            }
        );
    }

    #[test]
    fn test_select_metric_name_validates() {
        let mut selector = ViewSelector::default();
        selector.select_metric_name("active").unwrap();
        assert_eq!(
            selector.state(),
            &ViewState::AllEntities {
                metric: Metric::Active
            }
        );

        let err = selector.select_metric_name("Population").unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidMetric(_)));
    }

    #[test]
    fn test_compute_all_entities() {
        let ds = sample();
        let mut selector = ViewSelector::new(
            Metric::Confirmed,
            ViewOptions {
                top_n: 2,
                ..ViewOptions::default()
            },
        );
        selector.select_metric(Metric::Deaths);

        let overview = match selector.compute(&ds).unwrap() {
            AggregationResult::AllEntities(overview) => overview,
            other => panic!("unexpected result: {other:?}"),
        };

        assert_eq!(overview.metric, Metric::Deaths);
        let names: Vec<_> = overview.top.iter().map(|r| r.country.as_str()).collect();
        assert_eq!(names, vec!["US", "Brazil"]);
        assert_eq!(overview.totals, global_totals(&ds));
        assert_eq!(overview.regions.len(), 3);
        assert!(overview.correlation.ready().is_some());
        assert_eq!(overview.summary.len(), 6);
        assert_eq!(overview.scatter.len(), 4);
    }

    #[test]
    fn test_compute_single_entity() {
        let ds = sample();
        let mut selector = ViewSelector::default();
        selector.select_entity("France");

        let result = selector.compute(&ds).unwrap();
        assert_eq!(
            result,
            AggregationResult::SingleEntity(Snapshot {
                record: ds.get("France").unwrap().clone()
            })
        );
    }

    #[test]
    fn test_compute_unknown_entity_fails() {
        let ds = sample();
        let mut selector = ViewSelector::default();
        selector.select_entity("Atlantis");

        let err = selector.compute(&ds).unwrap_err();
        assert!(matches!(err, AnalysisError::EntityNotFound(_)));
    }

    #[test]
    fn test_correlation_skipped_for_single_record() {
        let ds = Dataset::new("mem", vec![record("Chad", "Africa", 922, 75, 810)]).unwrap();
        let selector = ViewSelector::default();

        match selector.compute(&ds).unwrap() {
            AggregationResult::AllEntities(overview) => {
                assert!(matches!(overview.correlation, Panel::Skipped { .. }));
                assert_eq!(overview.top.len(), 1);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_choices_start_with_sentinel() {
        let choices = ViewSelector::choices(&sample());
        assert_eq!(choices[0], ALL_ENTITIES);
        assert_eq!(&choices[1..], &["US", "India", "Brazil", "France"]);
    }
}
