//! Validated construction of trees.
//!
//! [`FlatBstBuilder`] collects the knobs a tree is created with (initial slot
//! reservation, comparator, handle width) and checks them against each other
//! before anything is allocated.
//!
//! ## Example
//!
//! ```rust
//! use flatbst::builder::FlatBstBuilder;
//! use flatbst::Greater;
//!
//! let mut tree = FlatBstBuilder::new()
//!     .capacity(64)
//!     .comparator(Greater)
//!     .build::<i32, u16>();
//! tree.insert(1);
//! tree.insert(3);
//! assert_eq!(tree.first(), Some(&3));
//! assert!(tree.capacity() >= 64);
//! ```

use crate::ds::handle::{HandleRepr, max_slots};
use crate::ds::slot_arena::SlotArena;
use crate::error::ConfigError;
use crate::traits::{Compare, Less};
use crate::tree::FlatBst;

/// Builder for [`FlatBst`] instances.
#[derive(Debug, Clone)]
pub struct FlatBstBuilder<C = Less> {
    capacity: usize,
    cmp: C,
}

impl FlatBstBuilder {
    /// Starts a builder with no reservation, ordering by `Ord`.
    pub fn new() -> Self {
        Self {
            capacity: 0,
            cmp: Less,
        }
    }
}

impl Default for FlatBstBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> FlatBstBuilder<C> {
    /// Number of node slots to reserve up front.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Replaces the comparator.
    pub fn comparator<C2>(self, cmp: C2) -> FlatBstBuilder<C2> {
        FlatBstBuilder {
            capacity: self.capacity,
            cmp,
        }
    }

    fn check_capacity<I: HandleRepr>(&self) -> Result<(), ConfigError> {
        let limit = max_slots::<I>();
        if self.capacity > limit {
            return Err(ConfigError::new(format!(
                "capacity {} exceeds the {} slots addressable by {}-bit handles",
                self.capacity,
                limit,
                I::BITS
            )));
        }
        Ok(())
    }

    /// Builds an empty tree with handle type `I`.
    ///
    /// Fails if the requested capacity exceeds what `I` can address.
    pub fn try_build<T, I: HandleRepr>(self) -> Result<FlatBst<T, C, I>, ConfigError>
    where
        C: Compare<T>,
    {
        self.check_capacity::<I>()?;
        Ok(FlatBst::from_arena(
            SlotArena::with_capacity(self.capacity),
            self.cmp,
        ))
    }

    /// Builds an empty tree with handle type `I`.
    ///
    /// # Panics
    /// Panics if the configuration is invalid; see
    /// [`try_build`](Self::try_build).
    pub fn build<T, I: HandleRepr>(self) -> FlatBst<T, C, I>
    where
        C: Compare<T>,
    {
        match self.try_build() {
            Ok(tree) => tree,
            Err(err) => panic!("{err}"),
        }
    }

    /// Builds a balanced tree holding the distinct elements of `iter`.
    ///
    /// Strictly ascending input skips the sort. Fails if the capacity or the
    /// number of distinct elements exceeds what `I` can address.
    pub fn try_build_from<T, I, It>(self, iter: It) -> Result<FlatBst<T, C, I>, ConfigError>
    where
        C: Compare<T>,
        I: HandleRepr,
        It: IntoIterator<Item = T>,
    {
        self.check_capacity::<I>()?;
        let capacity = self.capacity;
        let mut tree = FlatBst::try_collect_with(iter, self.cmp)?;
        tree.reserve(capacity.saturating_sub(tree.slot_count()));
        Ok(tree)
    }
}
