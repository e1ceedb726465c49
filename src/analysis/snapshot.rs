//! Single-entity lookup.

use crate::dataset::Dataset;
use crate::error::{AnalysisError, Result};
use crate::models::Record;

/// Return the record whose entity name matches `name` exactly.
///
/// Matching is case-sensitive with no partial or fuzzy fallback.
pub fn snapshot<'a>(dataset: &'a Dataset, name: &str) -> Result<&'a Record> {
    dataset
        .get(name)
        .ok_or_else(|| AnalysisError::EntityNotFound(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::record;

    fn sample() -> Dataset {
        Dataset::new(
            "mem",
            vec![
                record("Afghanistan", "Eastern Mediterranean", 36263, 1269, 25198),
                record("Albania", "Europe", 4880, 144, 2745),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_exact_match() {
        let ds = sample();
        let r = snapshot(&ds, "Afghanistan").unwrap();
        assert_eq!(r.country, "Afghanistan");
        assert_eq!(r.confirmed, 36263);
    }

    #[test]
    fn test_missing_entity() {
        let ds = sample();
        for name in ["nonexistent", "afghanistan", "Afghan", "Afghanistan "] {
            let err = snapshot(&ds, name).unwrap_err();
            assert!(matches!(err, AnalysisError::EntityNotFound(n) if n == name));
        }
    }
}
