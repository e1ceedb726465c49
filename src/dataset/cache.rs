//! Load-once dataset cache keyed by path.
//!
//! The first request for a path reads the file; every later request returns
//! the same `Arc<Dataset>`. Entries are never invalidated. Failed loads are
//! not stored, so the caller sees the error and nothing is cached.

use super::loader::{load_dataset, LoadOptions};
use super::Dataset;
use crate::error::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Hit/miss counters and current size of a [`DatasetCache`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub size: usize,
}

/// Load-once, read-many cache of datasets.
#[derive(Debug)]
pub struct DatasetCache {
    options: LoadOptions,
    entries: Mutex<HashMap<PathBuf, Arc<Dataset>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl DatasetCache {
    pub fn new(options: LoadOptions) -> Self {
        Self {
            options,
            entries: Mutex::new(HashMap::new()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Options every load through this cache uses.
    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Return the cached dataset for `path`, loading it on first use.
    ///
    /// The lock is held across the load so concurrent first calls for the
    /// same path read the file only once.
    pub fn get_or_load(&self, path: &Path) -> Result<Arc<Dataset>> {
        // Datasets are never mutated while the lock is held, so a poisoned
        // map is still consistent.
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(dataset) = entries.get(path) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!("Dataset cache hit: {}", path.display());
            return Ok(Arc::clone(dataset));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!("Dataset cache miss: {}", path.display());

        let dataset = Arc::new(load_dataset(path, &self.options)?);
        entries.insert(path.to_path_buf(), Arc::clone(&dataset));

        Ok(dataset)
    }

    pub fn stats(&self) -> CacheStats {
        let size = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len();

        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size,
        }
    }
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self::new(LoadOptions::default())
    }
}
