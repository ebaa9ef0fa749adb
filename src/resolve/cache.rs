//! Bounded memo cache for resolved tables.
//!
//! Entries carry a logical access timestamp; when the cache is full the
//! entry with the oldest timestamp is evicted. The cache never replaces a
//! committed table: a second commit for the same key returns the first
//! table (or reports an inconsistency if the two differ).

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::error::ResolveError;
use super::table::ResolvedRuleTable;

/// `(theme identity, template-set identity)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct CacheKey {
    pub theme: u64,
    pub template: u64,
}

struct CachedTable {
    table: Arc<ResolvedRuleTable>,
    last_used: u64,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<CacheKey, CachedTable>,
    clock: u64,
}

pub(crate) struct TableCache {
    capacity: usize,
    state: Mutex<CacheState>,
}

impl TableCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the cached table and marks it as recently used.
    pub fn get(&self, key: CacheKey) -> Option<Arc<ResolvedRuleTable>> {
        let mut state = self.state.lock();
        state.clock += 1;
        let now = state.clock;
        let cached = state.entries.get_mut(&key)?;
        cached.last_used = now;
        Some(Arc::clone(&cached.table))
    }

    /// Stores a freshly resolved table unless one is already committed.
    ///
    /// Returns the committed table, which is `table` itself only if this
    /// call won the race.
    pub fn commit(
        &self,
        key: CacheKey,
        table: Arc<ResolvedRuleTable>,
    ) -> Result<Arc<ResolvedRuleTable>, ResolveError> {
        let mut state = self.state.lock();
        state.clock += 1;
        let now = state.clock;

        if let Some(existing) = state.entries.get_mut(&key) {
            existing.last_used = now;
            if *existing.table != *table {
                tracing::error!(
                    theme_id = key.theme,
                    template_id = key.template,
                    "resolved tables differ for the same cache key"
                );
                return Err(ResolveError::CacheInconsistency {
                    theme_id: key.theme,
                    template_id: key.template,
                });
            }
            tracing::debug!(
                theme_id = key.theme,
                template_id = key.template,
                "discarding duplicate resolution, keeping first committed table"
            );
            return Ok(Arc::clone(&existing.table));
        }

        while state.entries.len() >= self.capacity {
            let oldest = state
                .entries
                .iter()
                .min_by_key(|(_, cached)| cached.last_used)
                .map(|(key, _)| *key);
            let Some(oldest) = oldest else { break };
            state.entries.remove(&oldest);
            tracing::trace!(
                theme_id = oldest.theme,
                template_id = oldest.template,
                "evicted least recently used table"
            );
        }

        state.entries.insert(
            key,
            CachedTable {
                table: Arc::clone(&table),
                last_used: now,
            },
        );
        Ok(table)
    }

    pub fn contains(&self, key: CacheKey) -> bool {
        self.state.lock().entries.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn clear(&self) {
        self.state.lock().entries.clear();
    }
}
