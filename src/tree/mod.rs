//! Index-linked binary search tree with ordered-set semantics.
//!
//! Every node lives in one [`SlotArena`]; children are linked by raw slot
//! positions instead of boxes or pointers. Callers refer to nodes through
//! generational [`Handle`]s that survive insertion and erasure of *other*
//! elements and go stale when their own node is erased.
//!
//! ## Architecture
//!
//! ```text
//!   FlatBst<T, C, I>
//!   ┌───────────────────────────────────────────────────────────────┐
//!   │ root ──► 0                                                    │
//!   │                                                               │
//!   │ arena (SlotArena<T, I>)                                       │
//!   │   ┌─────┬─────┬───────────────────────────────┐               │
//!   │   │ pos │ gen │ entry                         │               │
//!   │   ├─────┼─────┼───────────────────────────────┤               │
//!   │   │ 0   │ 0   │ { 5, left: 1, right: 2 }      │         5     │
//!   │   │ 1   │ 0   │ { 2, left: 3, right: - }      │        / \    │
//!   │   │ 2   │ 0   │ { 8, left: -, right: - }      │       2   8   │
//!   │   │ 3   │ 0   │ { 1, left: -, right: - }      │      /        │
//!   │   │ 4   │ 1   │ Vacant { next_free: - }       │     1         │
//!   │   └─────┴─────┴───────────────────────────────┘               │
//!   │                                                               │
//!   │ cmp: C (strict weak order, see `Compare`)                     │
//!   └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations
//! - `insert(value)`: descend, reject equivalents, link a new leaf
//! - `erase(key)`: leaf / one-child unlink, or two-child successor splice
//!   (the erased node keeps its slot and receives the successor's value;
//!   the successor's slot is freed)
//! - `lower_bound` / `upper_bound` / `equal_range`: one descent each
//! - `rebalance()`: rebuild a minimum-height tree from the in-order contents
//!
//! The tree never rebalances on its own; sorted insertion degrades to a
//! chain until `rebalance` is called.
//!
//! ## Performance
//! - `insert` / `erase` / `find` / bounds: O(depth)
//! - `build_from_sorted_unique` / `rebalance`: O(n)
//! - `build_from_iter`: O(n log n)
//!
//! `debug_validate_invariants()` is available in debug/test builds.
//!
//! ## Example
//!
//! ```
//! use flatbst::FlatBst;
//!
//! let mut tree = FlatBst::new();
//! for v in [5, 2, 8, 1, 3] {
//!     tree.insert(v);
//! }
//! let (three, inserted) = tree.insert(3);
//! assert!(!inserted);
//! assert_eq!(tree.get(three), Some(&3));
//!
//! assert!(tree.erase(&3));
//! assert_eq!(tree.get(three), None);
//! assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![1, 2, 5, 8]);
//! ```

mod build;
#[cfg(feature = "concurrency")]
pub mod concurrent;
pub mod iter;

use std::fmt;

use rustc_hash::FxHashSet;

use crate::ds::handle::{Handle, HandleRepr, raw};
use crate::ds::slot_arena::SlotArena;
use crate::error::{CapacityError, HandleError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::TreeMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::TreeMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    MetricsReset, MetricsSnapshotProvider, TreeMetricsReadRecorder, TreeMetricsRecorder,
};
use crate::traits::{Compare, Less};

#[cfg(feature = "concurrency")]
pub use concurrent::ConcurrentFlatBst;
pub use iter::{Entries, IntoIter, Iter};

/// Ordered set stored in a flat slot arena.
///
/// `T` is the element type, `C` the comparator and `I` the unsigned integer
/// used for handles and child links (see [`HandleRepr`] for the bit split).
pub struct FlatBst<T, C = Less, I: HandleRepr = u32> {
    arena: SlotArena<T, I>,
    root: I,
    cmp: C,
    #[cfg(feature = "metrics")]
    metrics: TreeMetrics,
}

impl<T> FlatBst<T> {
    /// Creates an empty tree ordered by `Ord`.
    pub fn new() -> Self {
        Self::from_arena(SlotArena::new(), Less)
    }

    /// Creates an empty tree with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_arena(SlotArena::with_capacity(capacity), Less)
    }
}

impl<T, C> FlatBst<T, C> {
    /// Creates an empty tree ordered by `cmp`.
    pub fn with_comparator(cmp: C) -> Self {
        Self::from_arena(SlotArena::new(), cmp)
    }

    pub fn with_capacity_and_comparator(capacity: usize, cmp: C) -> Self {
        Self::from_arena(SlotArena::with_capacity(capacity), cmp)
    }
}

impl<T, C, I: HandleRepr> FlatBst<T, C, I> {
    pub(crate) fn from_arena(arena: SlotArena<T, I>, cmp: C) -> Self {
        Self {
            arena,
            root: raw::none(),
            cmp,
            #[cfg(feature = "metrics")]
            metrics: TreeMetrics::default(),
        }
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Number of vacant slots awaiting reuse.
    #[inline]
    pub fn holes(&self) -> usize {
        self.arena.holes()
    }

    /// Number of slots in the backing array, live or vacant.
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.arena.slot_count()
    }

    /// Allocated slot capacity of the backing array.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Maximum number of slots addressable with handle type `I`.
    #[inline]
    pub fn max_slots() -> usize {
        crate::ds::handle::max_slots::<I>()
    }

    /// Reserves room for at least `additional` more nodes.
    pub fn reserve(&mut self, additional: usize) {
        self.arena.reserve(additional);
    }

    /// Removes every element. All outstanding handles go stale.
    pub fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();
        self.arena.clear();
        self.root = raw::none();
    }

    /// Returns the comparator.
    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Returns an approximate memory footprint in bytes.
    pub fn approx_bytes(&self) -> usize {
        std::mem::size_of::<Self>() - std::mem::size_of::<SlotArena<T, I>>()
            + self.arena.approx_bytes()
    }

    // -- handle access -------------------------------------------------------

    /// Value behind `handle`, or `None` if the handle is `NONE` or stale.
    #[inline]
    pub fn get(&self, handle: Handle<I>) -> Option<&T> {
        self.arena.get(handle)
    }

    /// Strict lookup reporting why `handle` does not resolve.
    pub fn try_get(&self, handle: Handle<I>) -> Result<&T, HandleError> {
        self.arena.try_get(handle)
    }

    /// Returns `true` if `handle` names a live node of this tree.
    #[inline]
    pub fn contains_handle(&self, handle: Handle<I>) -> bool {
        self.arena.contains(handle)
    }

    /// Handle of the root node, or `NONE` for an empty tree.
    pub fn root_handle(&self) -> Handle<I> {
        self.arena.handle_of(self.root)
    }

    /// Handle of the left child of `handle`; `NONE` if absent or stale.
    pub fn left_of(&self, handle: Handle<I>) -> Handle<I> {
        match self.arena.resolve(handle) {
            Ok(pos) => self.arena.handle_of(self.arena.node(pos).left),
            Err(_) => Handle::NONE,
        }
    }

    /// Handle of the right child of `handle`; `NONE` if absent or stale.
    pub fn right_of(&self, handle: Handle<I>) -> Handle<I> {
        match self.arena.resolve(handle) {
            Ok(pos) => self.arena.handle_of(self.arena.node(pos).right),
            Err(_) => Handle::NONE,
        }
    }

    /// Number of nodes on the longest root-to-leaf path (0 when empty).
    pub fn height(&self) -> usize {
        if raw::is_none(self.root) {
            return 0;
        }
        let mut height = 0;
        let mut stack = vec![(self.root, 1usize)];
        while let Some((pos, depth)) = stack.pop() {
            height = height.max(depth);
            let node = self.arena.node(pos);
            if !raw::is_none(node.left) {
                stack.push((node.left, depth + 1));
            }
            if !raw::is_none(node.right) {
                stack.push((node.right, depth + 1));
            }
        }
        height
    }

    /// Smallest element.
    pub fn first(&self) -> Option<&T> {
        let pos = self.leftmost(self.root);
        (!raw::is_none(pos)).then(|| &self.arena.node(pos).value)
    }

    /// Largest element.
    pub fn last(&self) -> Option<&T> {
        let mut pos = self.root;
        if raw::is_none(pos) {
            return None;
        }
        loop {
            let right = self.arena.node(pos).right;
            if raw::is_none(right) {
                return Some(&self.arena.node(pos).value);
            }
            pos = right;
        }
    }

    fn leftmost(&self, mut pos: I) -> I {
        if raw::is_none(pos) {
            return pos;
        }
        loop {
            let left = self.arena.node(pos).left;
            if raw::is_none(left) {
                return pos;
            }
            pos = left;
        }
    }

    /// Points `parent`'s link to `old` at `new` instead (`parent == NONE`
    /// means the root link).
    fn relink_child(&mut self, parent: I, old: I, new: I) {
        if raw::is_none(parent) {
            debug_assert_eq!(self.root, old);
            self.root = new;
            return;
        }
        let node = self.arena.node_mut(parent);
        if node.left == old {
            node.left = new;
        } else if node.right == old {
            node.right = new;
        } else {
            unreachable!("slot {old:?} is not a child of {parent:?}");
        }
    }

    /// Unlinks the node at `pos` (child of `parent`) and returns the value
    /// that leaves the tree.
    ///
    /// All links and slot bookkeeping are final before the value is handed
    /// back, so dropping it cannot observe a half-updated tree.
    fn erase_at(&mut self, pos: I, parent: I) -> T {
        let (left, right) = {
            let node = self.arena.node(pos);
            (node.left, node.right)
        };

        if raw::is_none(left) || raw::is_none(right) {
            let child = if raw::is_none(left) { right } else { left };
            self.relink_child(parent, pos, child);
            return self.arena.free(pos);
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_successor_splice();

        let mut succ_parent = pos;
        let mut succ = right;
        loop {
            let next = self.arena.node(succ).left;
            if raw::is_none(next) {
                break;
            }
            succ_parent = succ;
            succ = next;
        }

        let succ_right = self.arena.node(succ).right;
        self.relink_child(succ_parent, succ, succ_right);
        let succ_value = self.arena.free(succ);
        std::mem::replace(&mut self.arena.node_mut(pos).value, succ_value)
    }
}

impl<T, C: Compare<T>, I: HandleRepr> FlatBst<T, C, I> {
    /// Inserts `value` unless an equivalent element is present.
    ///
    /// Returns the handle of the element now in the tree and whether it was
    /// newly inserted. A rejected duplicate is dropped; the stored element
    /// is not overwritten.
    ///
    /// # Panics
    /// Panics if every addressable slot is occupied; see
    /// [`try_insert`](Self::try_insert).
    pub fn insert(&mut self, value: T) -> (Handle<I>, bool) {
        match self.try_insert(value) {
            Ok(result) => result,
            Err(err) => panic!("{err}"),
        }
    }

    /// Like [`insert`](Self::insert), but reports slot exhaustion instead of
    /// panicking. The tree is unchanged on error.
    pub fn try_insert(&mut self, value: T) -> Result<(Handle<I>, bool), CapacityError> {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        let mut parent = raw::none::<I>();
        let mut go_left = false;
        let mut cursor = self.root;
        while !raw::is_none(cursor) {
            let node = self.arena.node(cursor);
            parent = cursor;
            if self.cmp.less(&value, &node.value) {
                go_left = true;
                cursor = node.left;
            } else if self.cmp.less(&node.value, &value) {
                go_left = false;
                cursor = node.right;
            } else {
                #[cfg(feature = "metrics")]
                self.metrics.record_insert_duplicate();
                return Ok((self.arena.handle_of(cursor), false));
            }
        }

        #[cfg(feature = "metrics")]
        let reused = self.arena.holes() > 0;

        let pos = self.arena.allocate(value)?;
        if raw::is_none(parent) {
            self.root = pos;
        } else if go_left {
            self.arena.node_mut(parent).left = pos;
        } else {
            self.arena.node_mut(parent).right = pos;
        }

        #[cfg(feature = "metrics")]
        {
            self.metrics.record_insert_new();
            if reused {
                self.metrics.record_slot_reused();
            } else {
                self.metrics.record_slot_appended();
            }
        }

        Ok((self.arena.handle_of(pos), true))
    }

    /// Removes the element equivalent to `key`. Returns `false` if absent.
    pub fn erase(&mut self, key: &T) -> bool {
        self.take(key).is_some()
    }

    /// Removes and returns the element equivalent to `key`.
    ///
    /// In the two-child case the erased node's handle stays valid and now
    /// names the in-order successor's value, whose own handle goes stale.
    pub fn take(&mut self, key: &T) -> Option<T> {
        #[cfg(feature = "metrics")]
        self.metrics.record_erase_call();

        let (pos, parent) = self.locate_with_parent(key)?;

        #[cfg(feature = "metrics")]
        self.metrics.record_erase_found();

        Some(self.erase_at(pos, parent))
    }

    /// Element equivalent to `key`.
    pub fn find(&self, key: &T) -> Option<&T> {
        #[cfg(feature = "metrics")]
        (&self.metrics).record_find_call();

        let pos = self.locate_with_parent(key)?.0;

        #[cfg(feature = "metrics")]
        (&self.metrics).record_find_hit();

        Some(&self.arena.node(pos).value)
    }

    #[inline]
    pub fn contains(&self, key: &T) -> bool {
        self.find(key).is_some()
    }

    /// Handle of the element equivalent to `key`, or `NONE`.
    pub fn find_handle(&self, key: &T) -> Handle<I> {
        #[cfg(feature = "metrics")]
        (&self.metrics).record_find_call();

        match self.locate_with_parent(key) {
            Some((pos, _)) => {
                #[cfg(feature = "metrics")]
                (&self.metrics).record_find_hit();
                self.arena.handle_of(pos)
            },
            None => Handle::NONE,
        }
    }

    /// Handle of the first element not less than `key`, or `NONE`.
    pub fn lower_bound(&self, key: &T) -> Handle<I> {
        #[cfg(feature = "metrics")]
        (&self.metrics).record_bound_query();

        let mut best = raw::none();
        let mut cursor = self.root;
        while !raw::is_none(cursor) {
            #[cfg(feature = "metrics")]
            (&self.metrics).record_descent_step();
            let node = self.arena.node(cursor);
            if self.cmp.less(&node.value, key) {
                cursor = node.right;
            } else {
                best = cursor;
                cursor = node.left;
            }
        }
        self.arena.handle_of(best)
    }

    /// Handle of the first element strictly greater than `key`, or `NONE`.
    pub fn upper_bound(&self, key: &T) -> Handle<I> {
        #[cfg(feature = "metrics")]
        (&self.metrics).record_bound_query();

        let mut best = raw::none();
        let mut cursor = self.root;
        while !raw::is_none(cursor) {
            #[cfg(feature = "metrics")]
            (&self.metrics).record_descent_step();
            let node = self.arena.node(cursor);
            if self.cmp.less(key, &node.value) {
                best = cursor;
                cursor = node.left;
            } else {
                cursor = node.right;
            }
        }
        self.arena.handle_of(best)
    }

    /// `(lower_bound(key), upper_bound(key))`.
    pub fn equal_range(&self, key: &T) -> (Handle<I>, Handle<I>) {
        (self.lower_bound(key), self.upper_bound(key))
    }

    /// Raw position of the node equivalent to `key` and of its parent.
    fn locate_with_parent(&self, key: &T) -> Option<(I, I)> {
        let mut parent = raw::none();
        let mut cursor = self.root;
        while !raw::is_none(cursor) {
            #[cfg(feature = "metrics")]
            (&self.metrics).record_descent_step();
            let node = self.arena.node(cursor);
            if self.cmp.less(key, &node.value) {
                parent = cursor;
                cursor = node.left;
            } else if self.cmp.less(&node.value, key) {
                parent = cursor;
                cursor = node.right;
            } else {
                return Some((cursor, parent));
            }
        }
        None
    }

    // -- invariants ----------------------------------------------------------

    /// Verifies arena bookkeeping, reachability and search order.
    ///
    /// Every live slot must be reachable from the root exactly once, and the
    /// in-order sequence must be strictly ascending under the comparator.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.arena.check_invariants()?;

        let mut seen: FxHashSet<I> = FxHashSet::default();
        let mut stack: Vec<I> = Vec::new();
        let mut cursor = self.root;
        let mut prev: Option<I> = None;
        while !raw::is_none(cursor) || !stack.is_empty() {
            while !raw::is_none(cursor) {
                if !self.arena.is_occupied(cursor) {
                    return Err(InvariantError::new(format!(
                        "link to vacant or missing slot {cursor:?}"
                    )));
                }
                if !seen.insert(cursor) {
                    return Err(InvariantError::new(format!(
                        "slot {cursor:?} reachable twice (cycle or shared child)"
                    )));
                }
                stack.push(cursor);
                cursor = self.arena.node(cursor).left;
            }
            let Some(pos) = stack.pop() else {
                break;
            };
            if let Some(prev) = prev {
                let (a, b) = (&self.arena.node(prev).value, &self.arena.node(pos).value);
                if !self.cmp.less(a, b) {
                    return Err(InvariantError::new(format!(
                        "in-order sequence not strictly ascending at slot {pos:?}"
                    )));
                }
            }
            prev = Some(pos);
            cursor = self.arena.node(pos).right;
        }

        if seen.len() != self.arena.len() {
            return Err(InvariantError::new(format!(
                "{} slots reachable from root, {} live",
                seen.len(),
                self.arena.len()
            )));
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if let Err(err) = self.check_invariants() {
            panic!("flat bst invariant violated: {err}");
        }
    }
}

#[cfg(feature = "metrics")]
impl<T, C, I: HandleRepr> FlatBst<T, C, I> {
    pub fn metrics_snapshot(&self) -> TreeMetricsSnapshot {
        TreeMetricsSnapshot {
            insert_calls: self.metrics.insert_calls,
            insert_new: self.metrics.insert_new,
            insert_duplicates: self.metrics.insert_duplicates,
            slots_reused: self.metrics.slots_reused,
            slots_appended: self.metrics.slots_appended,
            erase_calls: self.metrics.erase_calls,
            erase_found: self.metrics.erase_found,
            successor_splices: self.metrics.successor_splices,
            bulk_builds: self.metrics.bulk_builds,
            rebalances: self.metrics.rebalances,
            clears: self.metrics.clears,
            find_calls: self.metrics.find_calls.get(),
            find_hits: self.metrics.find_hits.get(),
            bound_queries: self.metrics.bound_queries.get(),
            descent_steps: self.metrics.descent_steps.get(),
            len: self.len(),
            holes: self.holes(),
            slot_count: self.slot_count(),
            capacity: self.capacity(),
            height: self.height(),
        }
    }

    pub fn reset_metrics(&mut self) {
        self.metrics.reset_metrics();
    }
}

#[cfg(feature = "metrics")]
impl<T, C, I: HandleRepr> MetricsSnapshotProvider<TreeMetricsSnapshot> for FlatBst<T, C, I> {
    fn snapshot(&self) -> TreeMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<T: Clone, C: Clone, I: HandleRepr> Clone for FlatBst<T, C, I> {
    /// Deep copy. Handles of `self` resolve to the same values in the copy;
    /// counters start from zero.
    fn clone(&self) -> Self {
        Self {
            arena: self.arena.clone(),
            root: self.root,
            cmp: self.cmp.clone(),
            #[cfg(feature = "metrics")]
            metrics: TreeMetrics::default(),
        }
    }
}

impl<T, C: Default, I: HandleRepr> Default for FlatBst<T, C, I> {
    fn default() -> Self {
        Self::from_arena(SlotArena::new(), C::default())
    }
}

impl<T: fmt::Debug, C, I: HandleRepr> fmt::Debug for FlatBst<T, C, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: PartialEq, C, I: HandleRepr> PartialEq for FlatBst<T, C, I> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && Iterator::eq(self.iter(), other.iter())
    }
}

impl<T: Eq, C, I: HandleRepr> Eq for FlatBst<T, C, I> {}

impl<T, C: Compare<T>, I: HandleRepr> Extend<T> for FlatBst<T, C, I> {
    fn extend<It: IntoIterator<Item = T>>(&mut self, iter: It) {
        self.insert_iter(iter);
    }
}

impl<'a, T: Copy + 'a, C: Compare<T>, I: HandleRepr> Extend<&'a T> for FlatBst<T, C, I> {
    fn extend<It: IntoIterator<Item = &'a T>>(&mut self, iter: It) {
        self.insert_iter(iter.into_iter().copied());
    }
}

impl<T: Ord, I: HandleRepr> FromIterator<T> for FlatBst<T, Less, I> {
    /// Sorted-unique input takes the balanced fast path; anything else is
    /// sorted and deduplicated first.
    fn from_iter<It: IntoIterator<Item = T>>(iter: It) -> Self {
        match Self::try_collect_with(iter, Less) {
            Ok(tree) => tree,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<T: Ord, const N: usize> From<[T; N]> for FlatBst<T> {
    fn from(values: [T; N]) -> Self {
        Self::from_iter_with(values, Less)
    }
}


#[cfg(all(test, feature = "metrics"))]
mod metrics_tests {
    use super::*;

    #[test]
    fn counters_follow_operations() {
        let mut tree = FlatBst::new();
        for v in [4, 2, 6, 1, 3, 5, 7] {
            tree.insert(v);
        }
        tree.insert(4);
        tree.erase(&2);
        tree.erase(&40);
        tree.insert(9);
        assert!(tree.contains(&9));
        assert!(!tree.contains(&8));
        tree.lower_bound(&3);

        let snapshot = tree.metrics_snapshot();
        assert_eq!(snapshot.insert_calls, 9);
        assert_eq!(snapshot.insert_new, 8);
        assert_eq!(snapshot.insert_duplicates, 1);
        assert_eq!(snapshot.slots_appended, 7);
        assert_eq!(snapshot.slots_reused, 1);
        assert_eq!(snapshot.erase_calls, 2);
        assert_eq!(snapshot.erase_found, 1);
        assert_eq!(snapshot.successor_splices, 1);
        assert_eq!(snapshot.find_calls, 2);
        assert_eq!(snapshot.find_hits, 1);
        assert_eq!(snapshot.bound_queries, 1);
        assert!(snapshot.descent_steps > 0);
        assert_eq!(snapshot.len, 7);
        assert_eq!(snapshot.holes, 0);

        tree.reset_metrics();
        assert_eq!(tree.snapshot().insert_calls, 0);
        assert_eq!(tree.snapshot().len, 7);
    }
}
