//! Keyed async locks for row-level compare-and-set sections.
//!
//! RocksDB gives single-key atomicity but no read-modify-write primitive.
//! Every transition of a credential's `active` flag (rotate, revoke, lazy
//! expiry, sweep) and every identity cascade delete runs while holding the
//! lock for the owning identity, so two callers can never both observe
//! `active = true` and both write the transition.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OwnedMutexGuard;
use tracing::trace;

/// Registry of per-key async mutexes
///
/// Entries are created on first use and dropped again once no task holds
/// or waits on them, so the map only ever contains keys under contention.
pub struct RowLocks<K> {
    entries: Mutex<HashMap<K, Arc<tokio::sync::Mutex<()>>>>,
}

impl<K> RowLocks<K>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    /// Create an empty lock registry
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Acquire the lock for `key`, waiting for any current holder
    pub async fn lock(&self, key: K) -> RowGuard<'_, K> {
        let entry = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(
                entries
                    .entry(key.clone())
                    .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
            )
        };

        let guard = entry.lock_owned().await;
        trace!(?key, "Row lock acquired");

        RowGuard {
            locks: self,
            key,
            guard: Some(guard),
        }
    }

    /// Number of keys currently locked or contended
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True when no key is locked
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn release(&self, key: &K) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = entries.get(key) {
            // Only the registry still references the mutex
            if Arc::strong_count(entry) == 1 {
                entries.remove(key);
            }
        }
    }
}

impl<K> Default for RowLocks<K>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Guard for a held row lock; releases on drop
pub struct RowGuard<'a, K>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    locks: &'a RowLocks<K>,
    key: K,
    guard: Option<OwnedMutexGuard<()>>,
}

impl<K> Drop for RowGuard<'_, K>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    fn drop(&mut self) {
        self.guard.take();
        self.locks.release(&self.key);
    }
}
