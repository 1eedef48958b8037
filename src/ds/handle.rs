//! Generational handles packed into one unsigned integer.
//!
//! A [`Handle`] names a tree node for as long as that node lives. It folds
//! the node's raw slot position and the slot's generation counter into a
//! single fixed-width integer, so it is `Copy`, hashable and cheap to store
//! outside the tree.
//!
//! ## Layout
//!
//! ```text
//!   MSB                                               LSB
//!   ┌─────────────────────────┬───────────────────────────┐
//!   │ generation (G bits)     │ raw position (N bits)     │
//!   └─────────────────────────┴───────────────────────────┘
//!
//!   raw position == 2^N - 1  ──►  NONE (never a real slot)
//! ```
//!
//! The split is a static policy keyed only by the integer width:
//!
//! | repr  | G (generation) | N (position) | addressable slots |
//! |-------|----------------|--------------|-------------------|
//! | `u8`  | 2              | 6            | 63                |
//! | `u16` | 4              | 12           | 4_095             |
//! | `u32` | 10             | 22           | 4_194_303         |
//! | `u64` | 32             | 32           | 4_294_967_295     |
//!
//! Generations wrap modulo `2^G`. Even generations mark alive slots, odd
//! generations free ones; wrapping preserves parity.
//!
//! ## Example
//!
//! ```
//! use flatbst::ds::handle::{self, Handle};
//!
//! let h: Handle<u32> = Handle::new(7, 4);
//! assert_eq!(h.position(), 7);
//! assert_eq!(h.generation(), 4);
//! assert_eq!(handle::unpack_position::<u32>(h.into_raw()), 7);
//! assert!(Handle::<u32>::NONE.is_none());
//! ```

use std::fmt;
use std::hash::Hash;

mod private {
    pub trait Sealed {}
}

/// Number of generation bits used for a handle of `width` bits.
///
/// Wider handles get proportionally more generation bits. At least one
/// position bit is always left over so the `NONE` pattern exists.
pub const fn generation_bits_for(width: u32) -> u32 {
    match width {
        64 => 32,
        32 => 10,
        16 => 4,
        8 => 2,
        w => {
            let g = w / 4;
            if g == 0 { 1 } else { g }
        },
    }
}

/// Unsigned integer types usable as handle storage.
///
/// Sealed; implemented for `u8`, `u16`, `u32` and `u64`.
pub trait HandleRepr:
    private::Sealed + Copy + Eq + Ord + Hash + fmt::Debug + Send + Sync + 'static
{
    /// Total width in bits.
    const BITS: u32;
    /// Width of the generation field.
    const GENERATION_BITS: u32 = generation_bits_for(Self::BITS);
    /// Width of the raw-position field.
    const INDEX_BITS: u32 = Self::BITS - Self::GENERATION_BITS;
    /// Largest raw-position value; reserved as `NONE`.
    const INDEX_MASK: u64 = (1u64 << Self::INDEX_BITS) - 1;
    /// Mask applied to generation counters.
    const GENERATION_MASK: u64 = (1u64 << Self::GENERATION_BITS) - 1;
    /// Every bit set.
    const ALL_ONES: Self;

    /// Truncating conversion from `u64`.
    fn from_u64(value: u64) -> Self;

    /// Widening conversion to `u64`.
    fn to_u64(self) -> u64;
}

macro_rules! impl_handle_repr {
    ($($ty:ty),* $(,)?) => {$(
        impl private::Sealed for $ty {}

        impl HandleRepr for $ty {
            const BITS: u32 = <$ty>::BITS;
            const ALL_ONES: Self = <$ty>::MAX;

            #[inline]
            fn from_u64(value: u64) -> Self {
                value as $ty
            }

            #[inline]
            fn to_u64(self) -> u64 {
                self as u64
            }
        }
    )*};
}

impl_handle_repr!(u8, u16, u32, u64);

/// Packs a raw position and a generation into one integer.
///
/// The generation is reduced modulo `2^GENERATION_BITS`.
#[inline]
pub fn pack<I: HandleRepr>(position: u64, generation: u64) -> I {
    debug_assert!(position <= I::INDEX_MASK, "position {position} exceeds index field");
    I::from_u64(((generation & I::GENERATION_MASK) << I::INDEX_BITS) | (position & I::INDEX_MASK))
}

/// Extracts the raw position field.
#[inline]
pub fn unpack_position<I: HandleRepr>(handle: I) -> u64 {
    handle.to_u64() & I::INDEX_MASK
}

/// Extracts the generation field.
#[inline]
pub fn unpack_generation<I: HandleRepr>(handle: I) -> u64 {
    (handle.to_u64() >> I::INDEX_BITS) & I::GENERATION_MASK
}

/// Maximum number of slots an arena keyed by `I` can hold.
#[inline]
pub fn max_slots<I: HandleRepr>() -> usize {
    usize::try_from(I::INDEX_MASK).unwrap_or(usize::MAX)
}

/// Raw positions as stored inside slots. Not exposed to callers.
pub(crate) mod raw {
    use super::HandleRepr;

    #[inline]
    pub(crate) fn none<I: HandleRepr>() -> I {
        I::from_u64(I::INDEX_MASK)
    }

    #[inline]
    pub(crate) fn is_none<I: HandleRepr>(pos: I) -> bool {
        pos.to_u64() == I::INDEX_MASK
    }

    #[inline]
    pub(crate) fn to_index<I: HandleRepr>(pos: I) -> usize {
        pos.to_u64() as usize
    }

    #[inline]
    pub(crate) fn from_index<I: HandleRepr>(index: usize) -> I {
        I::from_u64(index as u64)
    }

    /// Generation that follows `generation`, wrapping inside the field.
    #[inline]
    pub(crate) fn next_generation<I: HandleRepr>(generation: I) -> I {
        I::from_u64(generation.to_u64().wrapping_add(1) & I::GENERATION_MASK)
    }
}

/// Generation-checked reference to a tree node.
///
/// A handle outlives mutations of *other* nodes. It goes stale when its own
/// node is erased or when the tree is rebuilt; a stale handle never
/// resolves again, even after its slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Handle<I: HandleRepr = u32>(I);

impl<I: HandleRepr> Handle<I> {
    /// The "no node" sentinel.
    pub const NONE: Self = Handle(I::ALL_ONES);

    /// Packs `(position, generation)` into a handle.
    #[inline]
    pub fn new(position: u64, generation: u64) -> Self {
        Handle(pack(position, generation))
    }

    /// Raw slot position encoded in the handle.
    #[inline]
    pub fn position(self) -> u64 {
        unpack_position(self.0)
    }

    /// Generation encoded in the handle.
    #[inline]
    pub fn generation(self) -> u64 {
        unpack_generation(self.0)
    }

    /// Returns `true` if this is the `NONE` sentinel.
    #[inline]
    pub fn is_none(self) -> bool {
        self.position() == I::INDEX_MASK
    }

    #[inline]
    pub fn is_some(self) -> bool {
        !self.is_none()
    }

    /// Converts to `Option`, mapping the sentinel to `None`.
    #[inline]
    pub fn into_option(self) -> Option<Self> {
        if self.is_none() { None } else { Some(self) }
    }

    #[inline]
    pub fn into_raw(self) -> I {
        self.0
    }

    #[inline]
    pub fn from_raw(raw: I) -> Self {
        Handle(raw)
    }
}

impl<I: HandleRepr> Default for Handle<I> {
    fn default() -> Self {
        Self::NONE
    }
}

impl<I: HandleRepr> fmt::Debug for Handle<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            f.write_str("Handle(NONE)")
        } else {
            write!(f, "Handle({}#{})", self.position(), self.generation())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_widths_follow_policy() {
        assert_eq!(<u8 as HandleRepr>::GENERATION_BITS, 2);
        assert_eq!(<u8 as HandleRepr>::INDEX_BITS, 6);
        assert_eq!(<u16 as HandleRepr>::INDEX_BITS, 12);
        assert_eq!(<u32 as HandleRepr>::GENERATION_BITS, 10);
        assert_eq!(<u32 as HandleRepr>::INDEX_BITS, 22);
        assert_eq!(<u64 as HandleRepr>::GENERATION_BITS, 32);
        assert_eq!(<u64 as HandleRepr>::INDEX_BITS, 32);
    }

    #[test]
    fn fallback_policy_keeps_an_index_bit() {
        assert_eq!(generation_bits_for(128), 32);
        assert_eq!(generation_bits_for(4), 1);
        assert_eq!(generation_bits_for(2), 1);
        assert!(generation_bits_for(2) < 2);
    }

    #[test]
    fn pack_places_generation_above_position() {
        let raw: u32 = pack(5, 3);
        assert_eq!(raw, (3 << 22) | 5);
        assert_eq!(unpack_position(raw), 5);
        assert_eq!(unpack_generation(raw), 3);
    }

    #[test]
    fn generation_is_reduced_modulo_field() {
        let raw: u8 = pack(1, 6);
        assert_eq!(unpack_generation(raw), 2);
        assert_eq!(unpack_position(raw), 1);
    }

    #[test]
    fn none_is_all_ones_and_decodes_to_reserved_position() {
        let none = Handle::<u16>::NONE;
        assert_eq!(none.into_raw(), u16::MAX);
        assert_eq!(none.position(), <u16 as HandleRepr>::INDEX_MASK);
        assert!(none.is_none());
        assert_eq!(none.into_option(), None);
        assert_eq!(Handle::<u16>::default(), none);
    }

    #[test]
    fn same_position_different_generation_differs() {
        let a = Handle::<u32>::new(9, 0);
        let b = Handle::<u32>::new(9, 2);
        assert_eq!(a.position(), b.position());
        assert_ne!(a, b);
    }

    #[test]
    fn next_generation_wraps_and_keeps_parity() {
        let top: u8 = u8::from_u64(<u8 as HandleRepr>::GENERATION_MASK);
        assert_eq!(raw::next_generation(top), 0);
        assert_eq!(raw::next_generation(0u32), 1);
        assert_eq!(raw::next_generation(1u32) % 2, 0);
    }

    #[test]
    fn max_slots_excludes_sentinel() {
        assert_eq!(max_slots::<u8>(), 63);
        assert_eq!(max_slots::<u16>(), 4095);
        assert!(raw::is_none::<u8>(raw::none()));
        assert!(!raw::is_none::<u8>(raw::from_index(62)));
        assert_eq!(raw::to_index::<u8>(raw::from_index(62)), 62);
    }

    #[test]
    fn debug_output_names_fields() {
        assert_eq!(format!("{:?}", Handle::<u32>::new(4, 2)), "Handle(4#2)");
        assert_eq!(format!("{:?}", Handle::<u32>::NONE), "Handle(NONE)");
    }
}
