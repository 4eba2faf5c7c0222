use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::RwLock;
use tracing::debug;

use crate::model::PriceSeries;

const MAX_ENTRIES: usize = 64;

/// Cache key: the exact requested window. The window end is "today", so a
/// date rollover changes the key and retires stale entries by itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchKey {
    pub ticker: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Fetched-series cache keyed by `(ticker, start, end)`.
///
/// The requested range is part of the key, so a changed range can never be
/// served a stale series. Bounded; the whole map is dropped when it fills.
pub struct SeriesCache {
    entries: RwLock<HashMap<FetchKey, Arc<PriceSeries>>>,
}

impl SeriesCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &FetchKey) -> Option<Arc<PriceSeries>> {
        self.entries.read().get(key).cloned()
    }

    pub fn insert(&self, key: FetchKey, series: Arc<PriceSeries>) {
        let mut entries = self.entries.write();
        if entries.len() >= MAX_ENTRIES && !entries.contains_key(&key) {
            debug!(dropped = entries.len(), "series cache full, clearing");
            entries.clear();
        }
        entries.insert(key, series);
    }
}

impl Default for SeriesCache {
    fn default() -> Self {
        Self::new()
    }
}
