//! Traversals and iterators.
//!
//! All walks use an explicit stack bounded by the tree height, never the
//! call stack, so degenerate (chain-shaped) trees are safe to traverse.
//!
//! ## In-order cursor
//!
//! ```text
//!            5              stack (pending left ancestors)
//!          /   \            ┌───┬───┬───┐
//!         2     8           │ 5 │ 2 │ 1 │ ◄─ top = next to yield
//!        / \                └───┴───┴───┘
//!       1   3
//!
//!   next(): pop 1, push left spine of 1.right (none)  → yields 1
//!   next(): pop 2, push left spine of 2.right (3)     → yields 2
//! ```
//!
//! [`Iter`] borrows the tree, so the borrow checker rules out mutation for
//! as long as an iterator is alive.

use std::fmt;
use std::iter::FusedIterator;

use crate::ds::handle::{Handle, HandleRepr, raw};
use crate::ds::slot_arena::SlotArena;

use super::FlatBst;

/// Pending-ancestor stack shared by [`Iter`] and [`Entries`].
#[derive(Clone)]
struct InorderCursor<I> {
    stack: Vec<I>,
    remaining: usize,
}

impl<I: HandleRepr> InorderCursor<I> {
    fn new<T>(arena: &SlotArena<T, I>, root: I) -> Self {
        let mut cursor = Self {
            stack: Vec::with_capacity(16),
            remaining: arena.len(),
        };
        cursor.push_left_spine(arena, root);
        cursor
    }

    fn push_left_spine<T>(&mut self, arena: &SlotArena<T, I>, mut pos: I) {
        while !raw::is_none(pos) {
            self.stack.push(pos);
            pos = arena.node(pos).left;
        }
    }

    fn advance<T>(&mut self, arena: &SlotArena<T, I>) -> Option<I> {
        let pos = self.stack.pop()?;
        self.push_left_spine(arena, arena.node(pos).right);
        self.remaining -= 1;
        Some(pos)
    }

    /// Raw position the next call to `advance` yields.
    fn current(&self) -> I {
        self.stack.last().copied().unwrap_or_else(raw::none)
    }
}

/// Lazy in-order iterator over `&T`, ascending under the comparator.
///
/// Cloning an `Iter` yields an independent cursor at the same position.
/// Two iterators compare equal when they walk the same tree and stand at the
/// same node.
pub struct Iter<'a, T, C, I: HandleRepr> {
    tree: &'a FlatBst<T, C, I>,
    cursor: InorderCursor<I>,
}

impl<'a, T, C, I: HandleRepr> Iterator for Iter<'a, T, C, I> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        let tree = self.tree;
        let arena = &tree.arena;
        let pos = self.cursor.advance(arena)?;
        Some(&arena.node(pos).value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.cursor.remaining, Some(self.cursor.remaining))
    }
}

impl<T, C, I: HandleRepr> ExactSizeIterator for Iter<'_, T, C, I> {}

impl<T, C, I: HandleRepr> FusedIterator for Iter<'_, T, C, I> {}

impl<T, C, I: HandleRepr> Clone for Iter<'_, T, C, I> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            cursor: self.cursor.clone(),
        }
    }
}

impl<T, C, I: HandleRepr> PartialEq for Iter<'_, T, C, I> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.cursor.current() == other.cursor.current()
    }
}

impl<T, C, I: HandleRepr> Eq for Iter<'_, T, C, I> {}

impl<T: fmt::Debug, C, I: HandleRepr> fmt::Debug for Iter<'_, T, C, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// In-order iterator over `(Handle, &T)` pairs.
pub struct Entries<'a, T, C, I: HandleRepr> {
    tree: &'a FlatBst<T, C, I>,
    cursor: InorderCursor<I>,
}

impl<'a, T, C, I: HandleRepr> Iterator for Entries<'a, T, C, I> {
    type Item = (Handle<I>, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        let arena = &tree.arena;
        let pos = self.cursor.advance(arena)?;
        Some((arena.handle_of(pos), &arena.node(pos).value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.cursor.remaining, Some(self.cursor.remaining))
    }
}

impl<T, C, I: HandleRepr> ExactSizeIterator for Entries<'_, T, C, I> {}

impl<T, C, I: HandleRepr> FusedIterator for Entries<'_, T, C, I> {}

impl<T, C, I: HandleRepr> Clone for Entries<'_, T, C, I> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            cursor: self.cursor.clone(),
        }
    }
}

/// Owning in-order iterator; see [`FlatBst::into_sorted_vec`].
#[derive(Debug, Clone)]
pub struct IntoIter<T> {
    inner: std::vec::IntoIter<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        self.inner.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T, C, I: HandleRepr> FlatBst<T, C, I> {
    /// In-order iterator over the elements.
    pub fn iter(&self) -> Iter<'_, T, C, I> {
        Iter {
            tree: self,
            cursor: InorderCursor::new(&self.arena, self.root),
        }
    }

    /// In-order iterator over `(handle, element)` pairs.
    pub fn entries(&self) -> Entries<'_, T, C, I> {
        Entries {
            tree: self,
            cursor: InorderCursor::new(&self.arena, self.root),
        }
    }

    /// Calls `f` on every element in ascending order.
    pub fn for_each_inorder<F: FnMut(&T)>(&self, mut f: F) {
        let mut stack: Vec<I> = Vec::with_capacity(64);
        let mut pos = self.root;
        while !raw::is_none(pos) || !stack.is_empty() {
            while !raw::is_none(pos) {
                stack.push(pos);
                pos = self.arena.node(pos).left;
            }
            let Some(top) = stack.pop() else {
                break;
            };
            let node = self.arena.node(top);
            f(&node.value);
            pos = node.right;
        }
    }

    /// Calls `f` on every element, each node before its subtrees.
    pub fn for_each_preorder<F: FnMut(&T)>(&self, mut f: F) {
        if raw::is_none(self.root) {
            return;
        }
        let mut stack: Vec<I> = Vec::with_capacity(64);
        stack.push(self.root);
        while let Some(pos) = stack.pop() {
            let node = self.arena.node(pos);
            f(&node.value);
            if !raw::is_none(node.right) {
                stack.push(node.right);
            }
            if !raw::is_none(node.left) {
                stack.push(node.left);
            }
        }
    }

    /// Calls `f` on every element, each node after its subtrees.
    pub fn for_each_postorder<F: FnMut(&T)>(&self, mut f: F) {
        if raw::is_none(self.root) {
            return;
        }
        // reversed (node, right, left) order is postorder
        let mut pending: Vec<I> = Vec::with_capacity(64);
        let mut output: Vec<I> = Vec::with_capacity(self.len());
        pending.push(self.root);
        while let Some(pos) = pending.pop() {
            output.push(pos);
            let node = self.arena.node(pos);
            if !raw::is_none(node.left) {
                pending.push(node.left);
            }
            if !raw::is_none(node.right) {
                pending.push(node.right);
            }
        }
        for pos in output.into_iter().rev() {
            f(&self.arena.node(pos).value);
        }
    }

    /// Clones the elements out in ascending order.
    pub fn to_sorted_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    /// Consumes the tree and returns its elements in ascending order.
    pub fn into_sorted_vec(mut self) -> Vec<T> {
        self.inorder_positions()
            .into_iter()
            .map(|pos| self.arena.free(pos))
            .collect()
    }

    /// Raw positions of every live node, in order.
    pub(super) fn inorder_positions(&self) -> Vec<I> {
        let mut out = Vec::with_capacity(self.len());
        let mut cursor = InorderCursor::new(&self.arena, self.root);
        while let Some(pos) = cursor.advance(&self.arena) {
            out.push(pos);
        }
        out
    }
}

impl<'a, T, C, I: HandleRepr> IntoIterator for &'a FlatBst<T, C, I> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, C, I>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, C, I: HandleRepr> IntoIterator for FlatBst<T, C, I> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.into_sorted_vec().into_iter(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::tree::FlatBst;

    fn tree_of(values: &[i32]) -> FlatBst<i32> {
        let mut tree = FlatBst::new();
        tree.insert_iter(values.iter().copied());
        tree
    }

    fn dump(walk: impl FnOnce(&mut dyn FnMut(&i32))) -> Vec<i32> {
        let mut out = Vec::new();
        walk(&mut |v| out.push(*v));
        out
    }

    #[test]
    fn traversal_orders_on_known_tree() {
        let tree = tree_of(&[4, 2, 6, 1, 3, 5, 7]);
        assert_eq!(dump(|f| tree.for_each_inorder(f)), vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(dump(|f| tree.for_each_preorder(f)), vec![4, 2, 1, 3, 6, 5, 7]);
        assert_eq!(dump(|f| tree.for_each_postorder(f)), vec![1, 3, 2, 5, 7, 6, 4]);
    }

    #[test]
    fn traversals_on_empty_tree_visit_nothing() {
        let tree: FlatBst<i32> = FlatBst::new();
        assert!(dump(|f| tree.for_each_inorder(f)).is_empty());
        assert!(dump(|f| tree.for_each_preorder(f)).is_empty());
        assert!(dump(|f| tree.for_each_postorder(f)).is_empty());
        assert_eq!(tree.iter().next(), None);
    }

    #[test]
    fn iterator_matches_inorder_traversal() {
        let tree = tree_of(&[10, 5, 15, 3, 7, 12, 18]);
        let via_iter: Vec<i32> = tree.iter().copied().collect();
        assert_eq!(via_iter, dump(|f| tree.for_each_inorder(f)));
        assert!(via_iter.windows(2).all(|w| w[0] < w[1]));

        let via_for: Vec<i32> = (&tree).into_iter().copied().collect();
        assert_eq!(via_for, via_iter);
    }

    #[test]
    fn iterator_is_exact_size_and_fused() {
        let tree = tree_of(&[2, 1, 3]);
        let mut iter = tree.iter();
        assert_eq!(iter.len(), 3);
        iter.next();
        assert_eq!(iter.len(), 2);
        iter.next();
        iter.next();
        assert_eq!(iter.len(), 0);
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn clone_restarts_from_same_position() {
        let tree = tree_of(&[5, 2, 8, 1, 3]);
        let mut iter = tree.iter();
        iter.next();
        let snapshot = iter.clone();
        assert!(snapshot == iter);

        let rest: Vec<i32> = iter.copied().collect();
        let again: Vec<i32> = snapshot.copied().collect();
        assert_eq!(rest, again);
        assert_eq!(rest, vec![2, 3, 5, 8]);
    }

    #[test]
    fn iterators_compare_by_tree_and_position() {
        let a = tree_of(&[1, 2]);
        let b = tree_of(&[1, 2]);
        let mut it = a.iter();
        assert!(it == a.iter());
        assert!(it != b.iter());
        it.next();
        assert!(it != a.iter());

        let mut end_a = a.iter();
        end_a.by_ref().for_each(drop);
        let mut end_a2 = a.iter();
        end_a2.by_ref().for_each(drop);
        assert!(end_a == end_a2);
    }

    #[test]
    fn entries_pair_handles_with_values() {
        let tree = tree_of(&[20, 10, 30]);
        for (handle, value) in tree.entries() {
            assert_eq!(tree.get(handle), Some(value));
            assert_eq!(tree.find_handle(value), handle);
        }
        assert_eq!(tree.entries().len(), 3);
    }

    #[test]
    fn owned_iteration_moves_values_out_in_order() {
        let mut tree = FlatBst::new();
        for s in ["pear", "apple", "fig"] {
            tree.insert(s.to_string());
        }
        tree.erase(&"fig".to_string());
        let cloned = tree.to_sorted_vec();
        let owned: Vec<String> = tree.into_iter().collect();
        assert_eq!(owned, cloned);
        assert_eq!(owned, vec!["apple".to_string(), "pear".to_string()]);
    }

    #[test]
    fn into_sorted_vec_and_reverse_owned_iteration() {
        let tree = tree_of(&[3, 1, 2]);
        assert_eq!(tree.clone().into_sorted_vec(), vec![1, 2, 3]);
        let reversed: Vec<i32> = tree.into_iter().rev().collect();
        assert_eq!(reversed, vec![3, 2, 1]);
    }

    #[test]
    fn deep_chain_traverses_without_recursion() {
        let mut tree = FlatBst::new();
        for v in 0..5_000u32 {
            tree.insert(v);
        }
        assert_eq!(tree.height(), 5_000);
        assert_eq!(tree.iter().count(), 5_000);
        let mut last = None;
        tree.for_each_postorder(|v| last = Some(*v));
        assert_eq!(last, Some(0));
    }

    #[test]
    fn iterator_debug_lists_remaining() {
        let tree = tree_of(&[2, 1]);
        assert_eq!(format!("{:?}", tree.iter()), "[1, 2]");
    }
}
