//! Lock-guarded wrapper for sharing a tree across threads.
//!
//! `FlatBst` has no internal synchronization. [`ConcurrentFlatBst`] puts it
//! behind a `parking_lot::RwLock`: queries take the shared lock, mutations
//! the exclusive one. Every `try_*` method returns `None` (or `false`)
//! instead of blocking when the lock is busy.
//!
//! References into the tree never escape the lock; use the `*_with`
//! closures to inspect elements in place.
//!
//! ```
//! use flatbst::tree::ConcurrentFlatBst;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let tree = Arc::new(ConcurrentFlatBst::new());
//! let workers: Vec<_> = (0..4)
//!     .map(|t| {
//!         let tree = Arc::clone(&tree);
//!         thread::spawn(move || {
//!             for v in 0..100 {
//!                 tree.insert(t * 100 + v);
//!             }
//!         })
//!     })
//!     .collect();
//! for w in workers {
//!     w.join().unwrap();
//! }
//! assert_eq!(tree.len(), 400);
//! ```

use parking_lot::RwLock;

use crate::ds::handle::{Handle, HandleRepr};
use crate::error::CapacityError;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::TreeMetricsSnapshot;
use crate::traits::{Compare, Less};

use super::FlatBst;

/// `FlatBst` behind a reader-writer lock.
#[derive(Debug)]
pub struct ConcurrentFlatBst<T, C = Less, I: HandleRepr = u32> {
    inner: RwLock<FlatBst<T, C, I>>,
}

impl<T> ConcurrentFlatBst<T> {
    /// Creates an empty tree ordered by `Ord`.
    pub fn new() -> Self {
        Self::from_tree(FlatBst::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_tree(FlatBst::with_capacity(capacity))
    }
}

impl<T, C> ConcurrentFlatBst<T, C> {
    /// Creates an empty tree ordered by `cmp`.
    pub fn with_comparator(cmp: C) -> Self {
        Self::from_tree(FlatBst::with_comparator(cmp))
    }
}

impl<T, C, I: HandleRepr> ConcurrentFlatBst<T, C, I> {
    /// Wraps an existing tree.
    pub fn from_tree(tree: FlatBst<T, C, I>) -> Self {
        Self {
            inner: RwLock::new(tree),
        }
    }

    /// Unwraps the tree.
    pub fn into_inner(self) -> FlatBst<T, C, I> {
        self.inner.into_inner()
    }

    pub fn len(&self) -> usize {
        let tree = self.inner.read();
        tree.len()
    }

    pub fn is_empty(&self) -> bool {
        let tree = self.inner.read();
        tree.is_empty()
    }

    pub fn holes(&self) -> usize {
        let tree = self.inner.read();
        tree.holes()
    }

    /// Returns `true` if `handle` names a live node.
    pub fn contains_handle(&self, handle: Handle<I>) -> bool {
        let tree = self.inner.read();
        tree.contains_handle(handle)
    }

    /// Runs `f` on the element behind `handle`, if it is live.
    pub fn get_with<R>(&self, handle: Handle<I>, f: impl FnOnce(&T) -> R) -> Option<R> {
        let tree = self.inner.read();
        tree.get(handle).map(f)
    }

    /// Tries to run `f` on the element behind `handle` without blocking.
    pub fn try_get_with<R>(&self, handle: Handle<I>, f: impl FnOnce(&T) -> R) -> Option<R> {
        let tree = self.inner.try_read()?;
        tree.get(handle).map(f)
    }

    /// Runs `f` on every element in ascending order under the shared lock.
    pub fn for_each_inorder(&self, f: impl FnMut(&T)) {
        let tree = self.inner.read();
        tree.for_each_inorder(f);
    }

    /// Clones the elements out in ascending order.
    pub fn to_sorted_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        let tree = self.inner.read();
        tree.to_sorted_vec()
    }

    /// Runs `f` with shared access to the whole tree.
    pub fn read_with<R>(&self, f: impl FnOnce(&FlatBst<T, C, I>) -> R) -> R {
        let tree = self.inner.read();
        f(&tree)
    }

    /// Runs `f` with exclusive access to the whole tree.
    pub fn write_with<R>(&self, f: impl FnOnce(&mut FlatBst<T, C, I>) -> R) -> R {
        let mut tree = self.inner.write();
        f(&mut tree)
    }

    /// Rebuilds the tree at minimum height; all handles go stale.
    pub fn rebalance(&self) {
        let mut tree = self.inner.write();
        tree.rebalance();
    }

    /// Tries to rebalance without blocking.
    pub fn try_rebalance(&self) -> bool {
        if let Some(mut tree) = self.inner.try_write() {
            tree.rebalance();
            true
        } else {
            false
        }
    }

    /// Removes every element.
    pub fn clear(&self) {
        let mut tree = self.inner.write();
        tree.clear();
    }

    /// Tries to clear without blocking.
    pub fn try_clear(&self) -> bool {
        if let Some(mut tree) = self.inner.try_write() {
            tree.clear();
            true
        } else {
            false
        }
    }

    /// Returns an approximate memory footprint in bytes.
    pub fn approx_bytes(&self) -> usize {
        let tree = self.inner.read();
        tree.approx_bytes()
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> TreeMetricsSnapshot {
        let tree = self.inner.read();
        tree.metrics_snapshot()
    }
}

impl<T, C: Compare<T>, I: HandleRepr> ConcurrentFlatBst<T, C, I> {
    /// Inserts `value` unless an equivalent element is present.
    ///
    /// # Panics
    /// Panics if every addressable slot is occupied.
    pub fn insert(&self, value: T) -> (Handle<I>, bool) {
        let mut tree = self.inner.write();
        tree.insert(value)
    }

    /// Tries to insert without blocking.
    pub fn try_insert(&self, value: T) -> Option<(Handle<I>, bool)> {
        let mut tree = self.inner.try_write()?;
        Some(tree.insert(value))
    }

    /// Inserts `value`, reporting slot exhaustion instead of panicking.
    pub fn insert_checked(&self, value: T) -> Result<(Handle<I>, bool), CapacityError> {
        let mut tree = self.inner.write();
        tree.try_insert(value)
    }

    /// Removes the element equivalent to `key`.
    pub fn erase(&self, key: &T) -> bool {
        let mut tree = self.inner.write();
        tree.erase(key)
    }

    /// Tries to erase without blocking.
    pub fn try_erase(&self, key: &T) -> Option<bool> {
        let mut tree = self.inner.try_write()?;
        Some(tree.erase(key))
    }

    /// Removes and returns the element equivalent to `key`.
    pub fn take(&self, key: &T) -> Option<T> {
        let mut tree = self.inner.write();
        tree.take(key)
    }

    pub fn contains(&self, key: &T) -> bool {
        let tree = self.inner.read();
        tree.contains(key)
    }

    /// Tries to test membership without blocking.
    pub fn try_contains(&self, key: &T) -> Option<bool> {
        let tree = self.inner.try_read()?;
        Some(tree.contains(key))
    }

    /// Handle of the element equivalent to `key`, or `NONE`.
    pub fn find_handle(&self, key: &T) -> Handle<I> {
        let tree = self.inner.read();
        tree.find_handle(key)
    }

    /// Runs `f` on the element equivalent to `key`, if present.
    pub fn find_with<R>(&self, key: &T, f: impl FnOnce(&T) -> R) -> Option<R> {
        let tree = self.inner.read();
        tree.find(key).map(f)
    }

    /// Tries to run `f` on the element equivalent to `key` without blocking.
    pub fn try_find_with<R>(&self, key: &T, f: impl FnOnce(&T) -> R) -> Option<R> {
        let tree = self.inner.try_read()?;
        tree.find(key).map(f)
    }

    pub fn lower_bound(&self, key: &T) -> Handle<I> {
        let tree = self.inner.read();
        tree.lower_bound(key)
    }

    pub fn upper_bound(&self, key: &T) -> Handle<I> {
        let tree = self.inner.read();
        tree.upper_bound(key)
    }

    /// Inserts every element of `iter` under one exclusive lock.
    pub fn insert_iter(&self, iter: impl IntoIterator<Item = T>) -> usize {
        let mut tree = self.inner.write();
        tree.insert_iter(iter)
    }

    /// Debug-checks tree invariants under the shared lock.
    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        let tree = self.inner.read();
        tree.debug_validate_invariants();
    }
}

impl<T, C: Default, I: HandleRepr> Default for ConcurrentFlatBst<T, C, I> {
    fn default() -> Self {
        Self::from_tree(FlatBst::default())
    }
}

impl<T, C, I: HandleRepr> From<FlatBst<T, C, I>> for ConcurrentFlatBst<T, C, I> {
    fn from(tree: FlatBst<T, C, I>) -> Self {
        Self::from_tree(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concurrent_tree_basic_ops() {
        let tree = ConcurrentFlatBst::new();
        let (h, inserted) = tree.insert(5);
        assert!(inserted);
        tree.insert(3);
        tree.insert(8);
        assert_eq!(tree.len(), 3);
        assert!(tree.contains(&3));
        assert_eq!(tree.get_with(h, |v| *v), Some(5));
        assert_eq!(tree.find_with(&8, |v| v * 2), Some(16));

        assert!(tree.erase(&3));
        assert!(!tree.contains(&3));
        assert_eq!(tree.take(&8), Some(8));
        assert_eq!(tree.to_sorted_vec(), vec![5]);
        tree.debug_validate_invariants();
    }

    #[test]
    fn concurrent_tree_try_ops() {
        let tree = ConcurrentFlatBst::new();
        let (h, _) = tree.try_insert(1).unwrap();
        tree.try_insert(2).unwrap();
        assert_eq!(tree.try_get_with(h, |v| *v), Some(1));
        assert_eq!(tree.try_contains(&2), Some(true));
        assert_eq!(tree.try_erase(&2), Some(true));
        assert_eq!(tree.try_find_with(&1, |v| *v), Some(1));
        assert!(tree.try_rebalance());
        assert!(tree.try_clear());
        assert!(tree.is_empty());
    }

    #[test]
    fn try_ops_do_not_block_on_held_lock() {
        let tree = ConcurrentFlatBst::new();
        tree.insert(1);
        tree.read_with(|_| {
            assert_eq!(tree.try_insert(2), None);
            assert!(!tree.try_clear());
            assert_eq!(tree.try_contains(&1), Some(true));
        });
        tree.write_with(|_| {
            assert_eq!(tree.try_contains(&1), None);
            assert_eq!(tree.try_get_with(Handle::NONE, |v| *v), None);
        });
    }

    #[test]
    fn rebalance_through_wrapper_stales_handles() {
        let tree = ConcurrentFlatBst::new();
        tree.insert_iter(1..=7);
        let h = tree.find_handle(&1);
        tree.rebalance();
        assert!(!tree.contains_handle(h));
        let root = tree.read_with(|t| t.get(t.root_handle()).copied());
        assert_eq!(root, Some(4));
    }

    #[test]
    fn insert_checked_reports_exhaustion() {
        let tree: ConcurrentFlatBst<u32, Less, u8> = ConcurrentFlatBst::default();
        for v in 0..63 {
            tree.insert(v);
        }
        assert!(tree.insert_checked(99).is_err());
        assert_eq!(tree.into_inner().len(), 63);
    }
}
