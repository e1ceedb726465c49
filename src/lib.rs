//! covistat - aggregation service for country-wise COVID-19 statistics.
//!
//! Loads a static country table once, then turns a user selection into the
//! derived tables a dashboard draws: ranked top-N, global totals, WHO region
//! sums, a correlation matrix, descriptive statistics, scatter series, or a
//! single-country snapshot.
//!
//! ```no_run
//! use covistat::{dataset, ViewSelector, Metric};
//! use std::path::Path;
//!
//! let data = dataset::load(Path::new("country_wise_latest.csv"))?;
//! let mut selector = ViewSelector::default();
//! selector.select_metric(Metric::Deaths);
//! let result = selector.compute(&data)?;
//! # Ok::<(), covistat::AnalysisError>(())
//! ```

pub mod analysis;
pub mod dataset;
pub mod error;
pub mod models;
pub mod report;
pub mod view;

pub use dataset::{Dataset, DatasetCache};
pub use error::{AnalysisError, DataLoadError, Result};
pub use models::{AggregationResult, Metric, Record};
pub use view::{ViewSelector, ViewState, ALL_ENTITIES};
