//! Process-unique identities for themes and template sets.
//!
//! Both are immutable once built and shared through `Arc`, so identity by
//! reference is enough for cache keys: clones share an id, and rebuilding
//! (even from identical input) yields a new one.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}
