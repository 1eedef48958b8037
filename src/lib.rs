//! flatbst: an index-linked binary search tree with generational handles.
//!
//! All nodes of a [`FlatBst`] live in one contiguous slot arena and link to
//! each other by integer position. Callers hold [`Handle`]s, small `Copy`
//! integers that fold a slot position together with the slot's generation,
//! so a handle to an erased element never resolves again.
//!
//! - [`ds`]: handle codec and the generational slot arena
//! - [`tree`]: the ordered set, its traversals and iterators
//! - [`builder`]: validated construction
//! - [`metrics`]: counters and Prometheus export (`--features metrics`)
//!
//! See `DESIGN.md` for internal architecture and invariants.

pub mod builder;
pub mod ds;
pub mod error;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
pub mod traits;
pub mod tree;

pub use crate::ds::{Handle, HandleRepr};
pub use crate::traits::{Compare, Greater, Less};
pub use crate::tree::FlatBst;
