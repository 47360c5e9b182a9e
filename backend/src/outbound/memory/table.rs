//! Shared storage cell for the in-memory adapters.

use std::sync::{PoisonError, RwLock};

/// A vector behind a read/write lock.
///
/// A poisoned lock is recovered rather than propagated: every mutation
/// below completes before it can panic, so the data stays consistent.
#[derive(Debug)]
pub(super) struct Table<T>(RwLock<Vec<T>>);

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self(RwLock::new(Vec::new()))
    }
}

impl<T: Clone> Table<T> {
    pub(super) fn with_rows(rows: Vec<T>) -> Self {
        Self(RwLock::new(rows))
    }

    pub(super) fn read<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        let guard = self.0.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    pub(super) fn write<R>(&self, f: impl FnOnce(&mut Vec<T>) -> R) -> R {
        let mut guard = self.0.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub(super) fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<T> {
        self.read(|rows| rows.iter().find(|row| predicate(row)).cloned())
    }

    /// Replace the first row matching `predicate`. Returns `false` when none
    /// matched.
    pub(super) fn replace(&self, row: T, predicate: impl Fn(&T) -> bool) -> bool {
        self.write(|rows| match rows.iter_mut().find(|existing| predicate(existing)) {
            Some(slot) => {
                *slot = row;
                true
            }
            None => false,
        })
    }

    /// Remove every row matching `predicate`, returning how many went.
    pub(super) fn remove(&self, predicate: impl Fn(&T) -> bool) -> usize {
        self.write(|rows| {
            let before = rows.len();
            rows.retain(|row| !predicate(row));
            before - rows.len()
        })
    }
}
