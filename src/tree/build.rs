//! Bulk construction: balanced builds, bulk insert and rebalance.
//!
//! Balanced builds always assemble a fresh arena and swap it in, so a
//! failure (slot exhaustion, a panicking comparator while sorting) leaves
//! the previous tree in place.
//!
//! ```text
//!   sorted: [1 2 3 4 5 6 7]          work stack (lo, hi, parent, link)
//!                  ▲                 ┌──────────────────────────────┐
//!                 mid = lo + n/2     │ (0, 7, -, root)              │
//!                                    │   alloc 4  → push right, left│
//!            4                       │ (0, 3, 4, left)              │
//!          /   \                     │   alloc 2  → ...             │
//!         2     6                    └──────────────────────────────┘
//!        / \   / \
//!       1   3 5   7                  allocation order: 4 2 1 3 6 5 7
//! ```

use crate::ds::handle::{HandleRepr, max_slots, raw};
use crate::ds::slot_arena::SlotArena;
use crate::error::CapacityError;
#[cfg(feature = "metrics")]
use crate::metrics::traits::TreeMetricsRecorder;
use crate::traits::Compare;

use super::FlatBst;

/// Which link of the parent a built subtree hangs from.
#[derive(Clone, Copy)]
enum Link {
    Root,
    Left,
    Right,
}

impl<T, C: Compare<T>> FlatBst<T, C> {
    /// Builds a tree from `iter`, ordered by `cmp`.
    ///
    /// Input that is already strictly ascending is built balanced directly;
    /// anything else is stably sorted and deduplicated first (the first of
    /// several equivalent elements wins).
    ///
    /// # Panics
    /// Panics if the distinct elements do not fit in the addressable slots.
    pub fn from_iter_with<It: IntoIterator<Item = T>>(iter: It, cmp: C) -> Self {
        match Self::try_collect_with(iter, cmp) {
            Ok(tree) => tree,
            Err(err) => panic!("{err}"),
        }
    }

    /// Fallible form of [`from_iter_with`](Self::from_iter_with).
    pub fn try_from_iter_with<It: IntoIterator<Item = T>>(
        iter: It,
        cmp: C,
    ) -> Result<Self, CapacityError> {
        Self::try_collect_with(iter, cmp)
    }
}

impl<T, C: Compare<T>, I: HandleRepr> FlatBst<T, C, I> {
    pub(crate) fn try_collect_with<It: IntoIterator<Item = T>>(
        iter: It,
        cmp: C,
    ) -> Result<Self, CapacityError> {
        let mut tree = Self::from_arena(SlotArena::new(), cmp);
        let mut values: Vec<T> = iter.into_iter().collect();
        if !tree.is_strictly_ascending(&values) {
            tree.sort_unique(&mut values);
        }
        tree.install_sorted(values)?;
        Ok(tree)
    }

    /// Inserts every element of `iter` through the single-element path.
    ///
    /// Returns how many were new. Existing elements and the current shape
    /// are left as they are; nothing is rebalanced.
    pub fn insert_iter<It: IntoIterator<Item = T>>(&mut self, iter: It) -> usize {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        self.reserve(lower.saturating_sub(self.holes()));
        iter.map(|value| usize::from(self.insert(value).1)).sum()
    }

    /// Replaces the contents with a minimum-height tree built from
    /// ascending, duplicate-free input.
    ///
    /// Every subrange `[lo, hi)` is rooted at `lo + (hi - lo) / 2`. All
    /// handles issued before the call go stale.
    ///
    /// # Panics
    /// Panics if the input does not fit in the slots addressable by `I`.
    /// In debug builds, also panics if the input is not strictly ascending.
    pub fn build_from_sorted_unique<It: IntoIterator<Item = T>>(&mut self, iter: It) {
        if let Err(err) = self.try_build_from_sorted_unique(iter) {
            panic!("{err}");
        }
    }

    /// Fallible form of
    /// [`build_from_sorted_unique`](Self::build_from_sorted_unique). The
    /// tree is unchanged on error.
    pub fn try_build_from_sorted_unique<It: IntoIterator<Item = T>>(
        &mut self,
        iter: It,
    ) -> Result<(), CapacityError> {
        let values: Vec<T> = iter.into_iter().collect();
        debug_assert!(
            self.is_strictly_ascending(&values),
            "input must be sorted and unique under the comparator"
        );
        self.install_sorted(values)
    }

    /// Replaces the contents with a balanced tree of the distinct elements
    /// of `iter`.
    ///
    /// # Panics
    /// Panics if the distinct elements do not fit in the slots addressable
    /// by `I`.
    pub fn build_from_iter<It: IntoIterator<Item = T>>(&mut self, iter: It) {
        if let Err(err) = self.try_build_from_iter(iter) {
            panic!("{err}");
        }
    }

    /// Fallible form of [`build_from_iter`](Self::build_from_iter). The tree
    /// is unchanged on error.
    pub fn try_build_from_iter<It: IntoIterator<Item = T>>(
        &mut self,
        iter: It,
    ) -> Result<(), CapacityError> {
        let mut values: Vec<T> = iter.into_iter().collect();
        self.sort_unique(&mut values);
        self.install_sorted(values)
    }

    fn is_strictly_ascending(&self, values: &[T]) -> bool {
        values.windows(2).all(|pair| self.cmp.less(&pair[0], &pair[1]))
    }

    fn sort_unique(&self, values: &mut Vec<T>) {
        values.sort_by(|a, b| self.cmp.ordering(a, b));
        // `dedup_by` hands the later element first; dropping it keeps the
        // first occurrence.
        values.dedup_by(|later, earlier| self.cmp.equivalent(earlier, later));
    }
}

impl<T, C, I: HandleRepr> FlatBst<T, C, I> {
    /// Rebuilds the tree at minimum height from its in-order contents.
    ///
    /// Sequence and length are preserved, vacant slots are dropped
    /// (`holes()` becomes 0) and every previously issued handle goes stale.
    ///
    /// Trees with fewer than two elements are already balanced and are left
    /// untouched: holes stay, and the handle of a lone element stays valid.
    pub fn rebalance(&mut self) {
        if self.len() < 2 {
            return;
        }
        #[cfg(feature = "metrics")]
        self.metrics.record_rebalance();

        let positions = self.inorder_positions();
        let values: Vec<T> = positions.into_iter().map(|pos| self.arena.free(pos)).collect();
        let mut arena = SlotArena::succeeding(&self.arena, values.len());
        let root = match build_balanced(&mut arena, values) {
            Ok(root) => root,
            // the values came from this arena, so they fit in a fresh one
            Err(err) => unreachable!("rebalance overflowed: {err}"),
        };
        self.arena = arena;
        self.root = root;
    }

    /// Same as [`rebalance`](Self::rebalance).
    pub fn rebuild_compact(&mut self) {
        self.rebalance();
    }

    /// Swaps in a fresh balanced arena holding `values` (sorted, unique).
    fn install_sorted(&mut self, values: Vec<T>) -> Result<(), CapacityError> {
        if values.len() > max_slots::<I>() {
            return Err(CapacityError::new(max_slots::<I>()));
        }
        #[cfg(feature = "metrics")]
        self.metrics.record_bulk_build();

        let mut arena = SlotArena::succeeding(&self.arena, values.len());
        let root = build_balanced(&mut arena, values)?;
        self.arena = arena;
        self.root = root;
        Ok(())
    }
}

/// Allocates `values` into `arena` as a minimum-height tree and returns the
/// root position. Nodes are allocated in pre-order.
fn build_balanced<T, I: HandleRepr>(
    arena: &mut SlotArena<T, I>,
    values: Vec<T>,
) -> Result<I, CapacityError> {
    let mut root = raw::none();
    let mut pending: Vec<Option<T>> = values.into_iter().map(Some).collect();
    let mut work = vec![(0usize, pending.len(), raw::none::<I>(), Link::Root)];

    while let Some((lo, hi, parent, link)) = work.pop() {
        if lo >= hi {
            continue;
        }
        let mid = lo + (hi - lo) / 2;
        let Some(value) = pending[mid].take() else {
            unreachable!("midpoint {mid} visited twice");
        };
        let pos = arena.allocate(value)?;
        match link {
            Link::Root => root = pos,
            Link::Left => arena.node_mut(parent).left = pos,
            Link::Right => arena.node_mut(parent).right = pos,
        }
        work.push((mid + 1, hi, pos, Link::Right));
        work.push((lo, mid, pos, Link::Left));
    }
    Ok(root)
}

#[cfg(test)]
mod tests {
    use crate::ds::handle::Handle;
    use crate::traits::{Greater, Less};
    use crate::tree::FlatBst;

    fn preorder<C, I: crate::ds::handle::HandleRepr>(tree: &FlatBst<i32, C, I>) -> Vec<i32> {
        let mut out = Vec::new();
        tree.for_each_preorder(|v| out.push(*v));
        out
    }

    #[test]
    fn from_unsorted_input_with_duplicates() {
        let tree: FlatBst<i32> = [5, 2, 8, 1, 3, 7, 9, 3, 5].into_iter().collect();
        assert_eq!(tree.len(), 7);
        assert_eq!(tree.to_sorted_vec(), vec![1, 2, 3, 5, 7, 8, 9]);
        tree.debug_validate_invariants();
    }

    #[test]
    fn sorted_unique_input_takes_balanced_fast_path() {
        let tree: FlatBst<i32> = (1..=7).collect();
        assert_eq!(tree.len(), 7);
        assert_eq!(tree.to_sorted_vec(), vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(preorder(&tree), vec![4, 2, 1, 3, 6, 5, 7]);
    }

    #[test]
    fn literal_list_deduplicates() {
        let tree = FlatBst::from([3, 1, 4, 3, 1]);
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.to_sorted_vec(), vec![1, 3, 4]);
    }

    #[test]
    fn balanced_build_allocates_in_preorder() {
        let mut tree = FlatBst::new();
        tree.build_from_sorted_unique(1..=7);
        let slots: Vec<i32> = tree.entries().map(|(_, v)| *v).collect();
        assert_eq!(slots, vec![1, 2, 3, 4, 5, 6, 7]);

        let mut by_position: Vec<(u64, i32)> =
            tree.entries().map(|(h, v)| (h.position(), *v)).collect();
        by_position.sort();
        let order: Vec<i32> = by_position.into_iter().map(|(_, v)| v).collect();
        assert_eq!(order, vec![4, 2, 1, 3, 6, 5, 7]);
    }

    #[test]
    fn even_length_ranges_root_at_upper_middle() {
        let mut tree = FlatBst::new();
        tree.build_from_sorted_unique([10, 20, 30, 40]);
        assert_eq!(preorder(&tree), vec![30, 20, 10, 40]);

        tree.build_from_sorted_unique([1, 2]);
        assert_eq!(preorder(&tree), vec![2, 1]);
        assert_eq!(tree.height(), 2);
    }

    #[test]
    fn build_replaces_contents_and_stales_handles() {
        let mut tree = FlatBst::new();
        let (old, _) = tree.insert(100);
        tree.build_from_sorted_unique([1, 2, 3]);
        assert_eq!(tree.len(), 3);
        assert!(!tree.contains(&100));
        assert_eq!(tree.get(old), None);
        assert_eq!(tree.holes(), 0);

        tree.build_from_sorted_unique(std::iter::empty());
        assert!(tree.is_empty());
        assert_eq!(tree.root_handle(), Handle::NONE);
    }

    #[test]
    fn build_from_iter_sorts_and_dedups() {
        let mut tree = FlatBst::new();
        tree.build_from_iter([5, 2, 8, 1, 3, 7, 9, 3, 5]);
        assert_eq!(tree.len(), 7);
        assert_eq!(tree.to_sorted_vec(), vec![1, 2, 3, 5, 7, 8, 9]);
        assert_eq!(tree.height(), 3);
        tree.debug_validate_invariants();
    }

    #[test]
    fn first_equivalent_element_wins() {
        let by_key = |a: &(u8, char), b: &(u8, char)| a.0 < b.0;
        let tree = FlatBst::from_iter_with([(2, 'a'), (1, 'b'), (2, 'c'), (1, 'd')], by_key);
        assert_eq!(tree.to_sorted_vec(), vec![(1, 'b'), (2, 'a')]);
    }

    #[test]
    fn bulk_insert_counts_new_elements() {
        let mut tree = FlatBst::new();
        let a = [5, 2, 8, 1, 3, 7, 9];
        assert_eq!(tree.insert_iter(a), a.len());
        assert_eq!(tree.len(), a.len());
        assert_eq!(tree.to_sorted_vec(), vec![1, 2, 3, 5, 7, 8, 9]);

        let root = tree.root_handle();
        assert_eq!(tree.insert_iter([1, 2, 2, 10]), 1);
        assert_eq!(tree.len(), a.len() + 1);
        assert!(tree.contains(&10));
        assert_eq!(tree.root_handle(), root);
        assert_eq!(tree.to_sorted_vec(), vec![1, 2, 3, 5, 7, 8, 9, 10]);
    }

    #[test]
    fn rebalance_flattens_a_chain() {
        let mut tree = FlatBst::new();
        for v in 1..=7 {
            tree.insert(v);
        }
        assert_eq!(preorder(&tree), vec![1, 2, 3, 4, 5, 6, 7]);
        let h = tree.find_handle(&5);

        tree.rebalance();
        assert_eq!(tree.len(), 7);
        assert_eq!(tree.to_sorted_vec(), vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(preorder(&tree), vec![4, 2, 1, 3, 6, 5, 7]);
        assert_eq!(tree.get(h), None);

        assert!(tree.contains(&5));
        assert!(!tree.contains(&42));
        assert!(tree.erase(&4));
        assert_eq!(tree.to_sorted_vec(), vec![1, 2, 3, 5, 6, 7]);
        tree.debug_validate_invariants();
    }

    #[test]
    fn rebuild_compact_drops_holes() {
        let mut tree: FlatBst<i32> = (0..20).collect();
        for v in (0..20).step_by(2) {
            tree.erase(&v);
        }
        assert_eq!(tree.holes(), 10);
        tree.rebuild_compact();
        assert_eq!(tree.holes(), 0);
        assert_eq!(tree.slot_count(), 10);
        assert_eq!(tree.to_sorted_vec(), (1..20).step_by(2).collect::<Vec<_>>());
        tree.debug_validate_invariants();
    }

    #[test]
    fn rebalance_small_tree_is_noop() {
        let mut tree = FlatBst::new();
        let (h, _) = tree.insert(1);
        tree.insert(2);
        tree.erase(&2);
        tree.rebalance();
        assert_eq!(tree.get(h), Some(&1));
        assert_eq!(tree.holes(), 1);
    }

    #[test]
    fn rebalance_supports_move_only_values() {
        struct Token(u32);
        let mut tree = FlatBst::with_comparator(|a: &Token, b: &Token| a.0 < b.0);
        for v in [1, 2, 3, 4] {
            tree.insert(Token(v));
        }
        tree.rebalance();
        let mut seen = Vec::new();
        tree.for_each_inorder(|t| seen.push(t.0));
        assert_eq!(seen, vec![1, 2, 3, 4]);
    }

    #[test]
    fn oversized_build_leaves_tree_unchanged() {
        let mut tree: FlatBst<u32, Less, u8> = FlatBst::default();
        tree.insert(7);
        let err = tree.try_build_from_sorted_unique(0..64).unwrap_err();
        assert_eq!(err.max_slots(), 63);
        assert_eq!(tree.to_sorted_vec(), vec![7]);

        assert!(tree.try_build_from_iter((0..63).rev()).is_ok());
        assert_eq!(tree.len(), 63);
        assert_eq!(tree.height(), 6);
    }

    #[test]
    fn descending_comparator_builds_balanced() {
        let tree = FlatBst::from_iter_with([1, 2, 3, 4, 5], Greater);
        assert_eq!(tree.to_sorted_vec(), vec![5, 4, 3, 2, 1]);
        assert_eq!(preorder(&tree), vec![3, 4, 5, 1, 2]);
    }
}
