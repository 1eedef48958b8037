//! # Ordering Traits
//!
//! The tree never looks at its elements except through a [`Compare`]
//! implementation. The comparator is an opaque strict weak order: two
//! elements are *equivalent* when neither is less than the other, and an
//! equivalent element is treated as a duplicate.
//!
//! ## Provided comparators
//!
//! | Type        | Order                          |
//! |-------------|--------------------------------|
//! | [`Less`]    | ascending by `Ord` (default)   |
//! | [`Greater`] | descending by `Ord`            |
//! | closures    | any `Fn(&T, &T) -> bool`       |
//!
//! ## Example
//!
//! ```
//! use flatbst::FlatBst;
//!
//! // Case-insensitive set of words.
//! let mut words = FlatBst::with_comparator(|a: &String, b: &String| {
//!     a.to_lowercase() < b.to_lowercase()
//! });
//! words.insert("Apple".to_string());
//! let (_, inserted) = words.insert("APPLE".to_string());
//! assert!(!inserted);
//! assert_eq!(words.len(), 1);
//! ```
//!
//! The comparator must give the same answer for the same pair of values for
//! the whole lifetime of the tree.

use std::cmp::Ordering;

/// Strict weak ordering over `T`.
pub trait Compare<T: ?Sized> {
    /// Returns `true` if `a` orders strictly before `b`.
    fn less(&self, a: &T, b: &T) -> bool;

    /// Neither element orders before the other.
    #[inline]
    fn equivalent(&self, a: &T, b: &T) -> bool {
        !self.less(a, b) && !self.less(b, a)
    }

    /// Three-way comparison derived from [`less`](Compare::less).
    #[inline]
    fn ordering(&self, a: &T, b: &T) -> Ordering {
        if self.less(a, b) {
            Ordering::Less
        } else if self.less(b, a) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}

/// Ascending order via `Ord`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Less;

impl<T: Ord + ?Sized> Compare<T> for Less {
    #[inline]
    fn less(&self, a: &T, b: &T) -> bool {
        a < b
    }
}

/// Descending order via `Ord`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Greater;

impl<T: Ord + ?Sized> Compare<T> for Greater {
    #[inline]
    fn less(&self, a: &T, b: &T) -> bool {
        a > b
    }
}

impl<T: ?Sized, F> Compare<T> for F
where
    F: Fn(&T, &T) -> bool,
{
    #[inline]
    fn less(&self, a: &T, b: &T) -> bool {
        self(a, b)
    }
}
