//! Aggregation over a loaded dataset.
//!
//! Every function here is pure: it reads a [`Dataset`](crate::dataset::Dataset)
//! and returns owned result tables.

pub mod aggregator;
pub mod correlation;
pub mod snapshot;

pub use aggregator::*;
pub use correlation::correlation_matrix;
pub use snapshot::snapshot;
