use core_types::PriceSeries;
use datastore::{ReadOptions, StoreError, read_series};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Read-through cache of price histories shared by every task of a batch.
///
/// Tasks for different windows of the same instrument read the same file, so
/// each file is parsed at most once per batch in the common case. When two
/// tasks race on a miss both may load, but the first insert wins and every
/// caller receives that same `Arc`.
#[derive(Debug, Default)]
pub struct SeriesCache {
    options: ReadOptions,
    entries: RwLock<HashMap<PathBuf, Arc<PriceSeries>>>,
}

impl SeriesCache {
    pub fn new(options: ReadOptions) -> Self {
        Self { options, entries: RwLock::default() }
    }

    pub fn get_or_load(&self, path: &Path) -> Result<Arc<PriceSeries>, StoreError> {
        if let Some(hit) = self.get(path) {
            return Ok(hit);
        }

        let loaded = Arc::new(read_series(path, self.options)?);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.entry(path.to_path_buf()).or_insert(loaded);
        debug!(path = %path.display(), days = entry.len(), "Price series cached.");
        Ok(Arc::clone(entry))
    }

    pub fn get(&self, path: &Path) -> Option<Arc<PriceSeries>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}
