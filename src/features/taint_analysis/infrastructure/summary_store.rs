//! A reference `SummaryStore` implementation, adapted from the teacher's
//! `FunctionSummaryCache` (LRU-backed, with hit/miss counters). §6
//! describes the summary store only as an interface; this gives the
//! crate something buildable and testable end-to-end without forcing
//! every caller to bring their own store.

use std::sync::Mutex;

use lru::LruCache;
use std::num::NonZeroUsize;

use crate::features::taint_analysis::domain::{AccessTree, ProcedureId, Trace};
use crate::features::taint_analysis::ports::SummaryStore;

/// Running hit/miss counters, in the style of the teacher's cache-stats
/// structs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryStoreStats {
    pub hits: u64,
    pub misses: u64,
}

impl SummaryStoreStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct Inner<T: Trace> {
    cache: LruCache<ProcedureId, AccessTree<T>>,
    stats: SummaryStoreStats,
}

/// An in-memory, LRU-evicted summary store. Safe to read concurrently
/// (§5) via an internal mutex; this is a reference implementation, not a
/// requirement — any `SummaryStore` impl satisfies the core.
pub struct InMemorySummaryStore<T: Trace> {
    inner: Mutex<Inner<T>>,
}

impl<T: Trace> InMemorySummaryStore<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap();
        Self {
            inner: Mutex::new(Inner {
                cache: LruCache::new(capacity),
                stats: SummaryStoreStats::default(),
            }),
        }
    }

    pub fn stats(&self) -> SummaryStoreStats {
        self.inner.lock().unwrap().stats
    }
}

impl<T: Trace + Send + Sync> SummaryStore<T> for InMemorySummaryStore<T> {
    fn read_summary(&self, _caller: &ProcedureId, callee: &ProcedureId) -> Option<AccessTree<T>> {
        let mut inner = self.inner.lock().unwrap();
        let found = inner.cache.get(callee).cloned();
        if found.is_some() {
            inner.stats.hits += 1;
        } else {
            inner.stats.misses += 1;
        }
        found
    }

    fn write_summary(&self, proc: &ProcedureId, summary: AccessTree<T>) {
        self.inner.lock().unwrap().cache.put(proc.clone(), summary);
    }
}

/// Decorates any `SummaryStore` so that reading the summary of the
/// procedure currently being analyzed always returns an empty tree,
/// instead of delegating (§5, §8 invariant 4: "the reporter therefore
/// refuses to re-enter the current procedure's summary").
pub struct GuardedSummaryStore<'a, T: Trace> {
    inner: &'a dyn SummaryStore<T>,
    current_proc: ProcedureId,
}

impl<'a, T: Trace> GuardedSummaryStore<'a, T> {
    pub fn new(inner: &'a dyn SummaryStore<T>, current_proc: ProcedureId) -> Self {
        Self { inner, current_proc }
    }
}

impl<'a, T: Trace> SummaryStore<T> for GuardedSummaryStore<'a, T> {
    fn read_summary(&self, caller: &ProcedureId, callee: &ProcedureId) -> Option<AccessTree<T>> {
        if callee == &self.current_proc {
            return Some(AccessTree::empty());
        }
        self.inner.read_summary(caller, callee)
    }

    fn write_summary(&self, proc: &ProcedureId, summary: AccessTree<T>) {
        self.inner.write_summary(proc, summary);
    }
}
