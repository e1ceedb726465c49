//! The immutable in-memory dataset and how it is loaded.
//!
//! A [`Dataset`] is built once from the source table and never mutated
//! afterwards, so it is shared freely as `Arc<Dataset>`.

pub mod cache;
pub mod loader;

pub use cache::{CacheStats, DatasetCache};
pub use loader::{LoadOptions, REQUIRED_COLUMNS};

use crate::error::{DataLoadError, Result};
use crate::models::Record;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

/// Default file name of the source table.
pub const DEFAULT_DATA_FILE: &str = "country_wise_latest.csv";

static GLOBAL_CACHE: OnceLock<DatasetCache> = OnceLock::new();

/// Load a dataset through the process-wide cache.
///
/// The first call for a path reads the file; later calls return the same
/// `Arc`. There is no invalidation.
pub fn load(path: &Path) -> Result<Arc<Dataset>> {
    global_cache().get_or_load(path)
}

/// The process-wide cache used by [`load`].
pub fn global_cache() -> &'static DatasetCache {
    GLOBAL_CACHE.get_or_init(|| DatasetCache::new(LoadOptions::default()))
}

/// Ordered, immutable sequence of records with unique entity names.
#[derive(Debug)]
pub struct Dataset {
    source: PathBuf,
    records: Vec<Record>,
    index: HashMap<String, usize>,
}

impl Dataset {
    /// Build a dataset from records already in memory.
    ///
    /// Fails with `DuplicateEntity` or `EmptyEntity` if the uniqueness
    /// invariant is violated. Rows in errors are 1-indexed data rows.
    pub fn new(source: impl Into<PathBuf>, records: Vec<Record>) -> Result<Self> {
        let source = source.into();
        let mut index = HashMap::with_capacity(records.len());

        for (i, record) in records.iter().enumerate() {
            let row = i as u64 + 1;
            if record.country.is_empty() {
                return Err(DataLoadError::EmptyEntity {
                    path: source.clone(),
                    row,
                }
                .into());
            }
            if index.insert(record.country.clone(), i).is_some() {
                return Err(DataLoadError::DuplicateEntity {
                    path: source.clone(),
                    name: record.country.clone(),
                    row,
                }
                .into());
            }
        }

        Ok(Self {
            source,
            records,
            index,
        })
    }

    /// Path the dataset was loaded from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Exact, case-sensitive lookup by entity name.
    pub fn get(&self, name: &str) -> Option<&Record> {
        self.index.get(name).map(|&i| &self.records[i])
    }

    /// Entity names in dataset order.
    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.country.as_str())
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
