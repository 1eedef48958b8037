//! Generational slot arena holding tree nodes.
//!
//! Every slot is either *occupied* (one payload plus two child links) or
//! *vacant* (threaded onto a LIFO free list). A per-slot generation counter
//! advances on every transition, and is folded into each [`Handle`] the
//! arena hands out, so a handle to a freed slot never resolves again, even
//! after the slot is reused.
//!
//! ## Architecture
//!
//! ```text
//!   slots: Vec<Slot<T, I>>
//!   ┌─────┬────────────┬──────────────────────────────────────────┐
//!   │ pos │ generation │ entry                                    │
//!   ├─────┼────────────┼──────────────────────────────────────────┤
//!   │ 0   │ 0 (even)   │ Occupied { value: A, left: 1, right: 3 } │
//!   │ 1   │ 2 (even)   │ Occupied { value: B, left: -, right: - } │
//!   │ 2   │ 1 (odd)    │ Vacant { next_free: 4 }                  │
//!   │ 3   │ 0 (even)   │ Occupied { value: C, left: -, right: - } │
//!   │ 4   │ 3 (odd)    │ Vacant { next_free: - }                  │
//!   └─────┴────────────┴──────────────────────────────────────────┘
//!
//!   free_head ─► [2] ─► [4] ─► NONE
//! ```
//!
//! ## Operations
//! - `insert(value)`: pop the free list head (generation odd → even) or
//!   push a new slot; fails with [`CapacityError`] at the sentinel
//! - `remove(handle)`: move the payload out, generation even → odd, push
//!   the slot on the free list
//! - `get(handle)`: resolves only if position, liveness and generation match
//!
//! ## Performance
//! - `insert` / `remove` / `get`: O(1)
//! - `iter`: O(slots)
//!
//! `debug_validate_invariants()` is available in debug/test builds.

use crate::ds::handle::{Handle, HandleRepr, max_slots, raw};
use crate::error::{CapacityError, HandleError, InvariantError};

/// Payload and child links of an occupied slot.
#[derive(Debug, Clone)]
pub(crate) struct Node<T, I> {
    pub(crate) value: T,
    pub(crate) left: I,
    pub(crate) right: I,
}

#[derive(Debug, Clone)]
enum Entry<T, I> {
    Occupied(Node<T, I>),
    Vacant { next_free: I },
}

#[derive(Debug, Clone)]
struct Slot<T, I> {
    /// Even while occupied, odd while vacant.
    generation: I,
    entry: Entry<T, I>,
}

/// Growable arena of tree-node slots addressed by generational handles.
#[derive(Debug, Clone)]
pub struct SlotArena<T, I: HandleRepr = u32> {
    slots: Vec<Slot<T, I>>,
    free_head: I,
    len: usize,
    holes: usize,
    /// Starting generation for a slot pushed at each position, carried over
    /// from earlier incarnations of the arena (`clear`, `succeeding`).
    /// Positions past the end start at 0.
    retired: Vec<I>,
}

impl<T, I: HandleRepr> SlotArena<T, I> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: raw::none(),
            len: 0,
            holes: 0,
            retired: Vec::new(),
        }
    }

    /// Creates an empty arena in which no handle issued by `previous`
    /// resolves.
    ///
    /// Each position starts from the next even generation after the last one
    /// it had in `previous`.
    pub(crate) fn succeeding(previous: &Self, capacity: usize) -> Self {
        let mut arena = Self::with_capacity(capacity);
        arena.retired = previous.retired_generations();
        arena
    }

    /// Stores `value` in a slot and returns its handle.
    pub fn insert(&mut self, value: T) -> Result<Handle<I>, CapacityError> {
        let pos = self.allocate(value)?;
        Ok(self.handle_of(pos))
    }

    /// Removes the value behind `handle`, if it is live.
    pub fn remove(&mut self, handle: Handle<I>) -> Option<T> {
        let pos = self.resolve(handle).ok()?;
        Some(self.free(pos))
    }

    pub fn get(&self, handle: Handle<I>) -> Option<&T> {
        self.try_get(handle).ok()
    }

    /// Strict lookup reporting why a handle does not resolve.
    pub fn try_get(&self, handle: Handle<I>) -> Result<&T, HandleError> {
        let pos = self.resolve(handle)?;
        Ok(&self.node(pos).value)
    }

    pub fn get_mut(&mut self, handle: Handle<I>) -> Option<&mut T> {
        let pos = self.resolve(handle).ok()?;
        Some(&mut self.node_mut(pos).value)
    }

    /// Returns `true` if `handle` refers to a live slot of this arena.
    pub fn contains(&self, handle: Handle<I>) -> bool {
        self.resolve(handle).is_ok()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of vacant slots waiting on the free list.
    pub fn holes(&self) -> usize {
        self.holes
    }

    /// Number of slots ever pushed (occupied + vacant).
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Reserves room for at least `additional` more slots.
    pub fn reserve(&mut self, additional: usize) {
        self.slots.reserve(additional);
    }

    /// Drops every value. Handles issued before the clear stay stale.
    pub fn clear(&mut self) {
        self.retired = self.retired_generations();
        self.slots.clear();
        self.free_head = raw::none();
        self.len = 0;
        self.holes = 0;
    }

    /// Returns an approximate memory footprint in bytes.
    pub fn approx_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.slots.capacity() * std::mem::size_of::<Slot<T, I>>()
            + self.retired.capacity() * std::mem::size_of::<I>()
    }

    /// Iterates live `(handle, value)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle<I>, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| match &slot.entry {
                Entry::Occupied(node) => Some((
                    Handle::new(index as u64, slot.generation.to_u64()),
                    &node.value,
                )),
                Entry::Vacant { .. } => None,
            })
    }

    // -- crate-internal slot access ----------------------------------------

    /// Places `value` in a slot with no children and returns its raw position.
    pub(crate) fn allocate(&mut self, value: T) -> Result<I, CapacityError> {
        let node = Node {
            value,
            left: raw::none(),
            right: raw::none(),
        };

        if !raw::is_none(self.free_head) {
            let pos = self.free_head;
            let slot = &mut self.slots[raw::to_index(pos)];
            let next_free = match slot.entry {
                Entry::Vacant { next_free } => next_free,
                Entry::Occupied(_) => unreachable!("free list reaches occupied slot {pos:?}"),
            };
            slot.entry = Entry::Occupied(node);
            slot.generation = raw::next_generation(slot.generation);
            self.free_head = next_free;
            self.holes -= 1;
            self.len += 1;
            return Ok(pos);
        }

        let index = self.slots.len();
        if index >= max_slots::<I>() {
            return Err(CapacityError::new(max_slots::<I>()));
        }
        let generation = self
            .retired
            .get(index)
            .copied()
            .unwrap_or_else(|| I::from_u64(0));
        self.slots.push(Slot {
            generation,
            entry: Entry::Occupied(node),
        });
        self.len += 1;
        Ok(raw::from_index(index))
    }

    /// Vacates the occupied slot at `pos` and hands back its value.
    pub(crate) fn free(&mut self, pos: I) -> T {
        let next_free = self.free_head;
        let slot = &mut self.slots[raw::to_index(pos)];
        debug_assert_eq!(slot.generation.to_u64() % 2, 0, "freeing slot with odd generation");
        let Entry::Occupied(_) = slot.entry else {
            unreachable!("freeing vacant slot {pos:?}");
        };
        let entry = std::mem::replace(&mut slot.entry, Entry::Vacant { next_free });
        slot.generation = raw::next_generation(slot.generation);
        self.free_head = pos;
        self.len -= 1;
        self.holes += 1;
        match entry {
            Entry::Occupied(node) => node.value,
            Entry::Vacant { .. } => unreachable!(),
        }
    }

    /// Maps a handle to a raw position if it is live.
    pub(crate) fn resolve(&self, handle: Handle<I>) -> Result<I, HandleError> {
        if handle.is_none() {
            return Err(HandleError::None);
        }
        let position = handle.position();
        let slot = usize::try_from(position)
            .ok()
            .and_then(|index| self.slots.get(index))
            .ok_or(HandleError::OutOfRange {
                position,
                slots: self.slots.len(),
            })?;
        let live = matches!(slot.entry, Entry::Occupied(_));
        if !live || slot.generation.to_u64() != handle.generation() {
            return Err(HandleError::Stale {
                position,
                generation: handle.generation(),
            });
        }
        Ok(I::from_u64(position))
    }

    /// Current handle for the occupied slot at `pos`.
    #[inline]
    pub(crate) fn handle_of(&self, pos: I) -> Handle<I> {
        if raw::is_none(pos) {
            return Handle::NONE;
        }
        let slot = &self.slots[raw::to_index(pos)];
        Handle::new(pos.to_u64(), slot.generation.to_u64())
    }

    #[inline]
    pub(crate) fn node(&self, pos: I) -> &Node<T, I> {
        match &self.slots[raw::to_index(pos)].entry {
            Entry::Occupied(node) => node,
            Entry::Vacant { .. } => unreachable!("slot {pos:?} is vacant"),
        }
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, pos: I) -> &mut Node<T, I> {
        match &mut self.slots[raw::to_index(pos)].entry {
            Entry::Occupied(node) => node,
            Entry::Vacant { .. } => unreachable!("slot {pos:?} is vacant"),
        }
    }

    /// Returns `true` if `pos` is in range and occupied.
    pub(crate) fn is_occupied(&self, pos: I) -> bool {
        self.slots
            .get(raw::to_index(pos))
            .is_some_and(|slot| matches!(slot.entry, Entry::Occupied(_)))
    }

    /// Per-position starting generations for the arena that replaces this
    /// one: the next even generation after each slot's current one, plus the
    /// carried-over entries for positions past `slot_count`.
    fn retired_generations(&self) -> Vec<I> {
        let mut retired = Vec::with_capacity(self.slots.len().max(self.retired.len()));
        retired.extend(
            self.slots
                .iter()
                .map(|slot| I::from_u64(((slot.generation.to_u64() | 1) + 1) & I::GENERATION_MASK)),
        );
        if let Some(rest) = self.retired.get(self.slots.len()..) {
            retired.extend_from_slice(rest);
        }
        retired
    }

    // -- invariants ----------------------------------------------------------

    /// Verifies slot parity, counters and free-list shape.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.len + self.holes != self.slots.len() {
            return Err(InvariantError::new(format!(
                "len {} + holes {} != slots {}",
                self.len,
                self.holes,
                self.slots.len()
            )));
        }

        let mut occupied = 0usize;
        for (index, slot) in self.slots.iter().enumerate() {
            let even = slot.generation.to_u64() % 2 == 0;
            match (&slot.entry, even) {
                (Entry::Occupied(_), true) => occupied += 1,
                (Entry::Vacant { .. }, false) => {},
                (Entry::Occupied(_), false) => {
                    return Err(InvariantError::new(format!(
                        "slot {index} is occupied with odd generation"
                    )));
                },
                (Entry::Vacant { .. }, true) => {
                    return Err(InvariantError::new(format!(
                        "slot {index} is vacant with even generation"
                    )));
                },
            }
        }
        if occupied != self.len {
            return Err(InvariantError::new(format!(
                "occupied slots {occupied} != len {}",
                self.len
            )));
        }

        let mut walked = 0usize;
        let mut cursor = self.free_head;
        while !raw::is_none(cursor) {
            walked += 1;
            if walked > self.holes {
                return Err(InvariantError::new("free list longer than hole count (cycle?)"));
            }
            match self.slots.get(raw::to_index(cursor)).map(|slot| &slot.entry) {
                Some(Entry::Vacant { next_free }) => cursor = *next_free,
                Some(Entry::Occupied(_)) => {
                    return Err(InvariantError::new(format!(
                        "free list reaches occupied slot {cursor:?}"
                    )));
                },
                None => {
                    return Err(InvariantError::new(format!(
                        "free list position {cursor:?} out of bounds"
                    )));
                },
            }
        }
        if walked != self.holes {
            return Err(InvariantError::new(format!(
                "free list length {walked} != holes {}",
                self.holes
            )));
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if let Err(err) = self.check_invariants() {
            panic!("slot arena invariant violated: {err}");
        }
    }
}

impl<T, I: HandleRepr> Default for SlotArena<T, I> {
    fn default() -> Self {
        Self::new()
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    proptest! {
        /// Property: the arena agrees with a HashMap model under arbitrary
        /// insert/remove sequences, and removed handles never come back.
        #[cfg_attr(miri, ignore)]
        #[test]
        fn prop_matches_reference_model(
            ops in prop::collection::vec((any::<bool>(), any::<u16>()), 0..200)
        ) {
            let mut arena: SlotArena<u16, u32> = SlotArena::new();
            let mut model: HashMap<Handle<u32>, u16> = HashMap::new();
            let mut dead: Vec<Handle<u32>> = Vec::new();

            for (is_insert, value) in ops {
                if is_insert || model.is_empty() {
                    let h = arena.insert(value).unwrap();
                    prop_assert!(model.insert(h, value).is_none());
                } else {
                    let mut keys: Vec<_> = model.keys().copied().collect();
                    keys.sort();
                    let h = keys[usize::from(value) % keys.len()];
                    prop_assert_eq!(arena.remove(h), model.remove(&h));
                    dead.push(h);
                }

                prop_assert_eq!(arena.len(), model.len());
                prop_assert!(arena.check_invariants().is_ok());
            }

            for (h, v) in &model {
                prop_assert_eq!(arena.get(*h), Some(v));
            }
            for h in dead {
                prop_assert!(!arena.contains(h));
            }
        }
    }
}
