//! Error types for the flatbst library.
//!
//! ## Key Components
//!
//! - [`CapacityError`]: The arena would need a slot at the reserved `NONE`
//!   position. Returned by [`FlatBst::try_insert`](crate::tree::FlatBst::try_insert).
//! - [`HandleError`]: A strict accessor was given a stale, absent or
//!   out-of-range handle.
//! - [`InvariantError`]: Returned by `check_invariants` when the arena or
//!   tree structure is inconsistent.
//! - [`ConfigError`]: Returned by the builder when a configuration cannot be
//!   honored (e.g. a reservation larger than the handle can address).
//!
//! ## Example Usage
//!
//! ```
//! use flatbst::FlatBst;
//! use flatbst::error::HandleError;
//!
//! let mut tree: FlatBst<i32> = FlatBst::new();
//! let (handle, _) = tree.insert(7);
//! assert!(tree.erase(&7));
//! assert!(matches!(tree.try_get(handle), Err(HandleError::Stale { .. })));
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// CapacityError
// ---------------------------------------------------------------------------

/// Error returned when the slot count would reach the reserved sentinel.
///
/// The arena is left exactly as it was before the failing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityError {
    max_slots: usize,
}

impl CapacityError {
    #[inline]
    pub fn new(max_slots: usize) -> Self {
        Self { max_slots }
    }

    /// Number of slots the handle type can address.
    #[inline]
    pub fn max_slots(&self) -> usize {
        self.max_slots
    }
}

impl fmt::Display for CapacityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "slot arena index overflow: at most {} slots are addressable",
            self.max_slots
        )
    }
}

impl std::error::Error for CapacityError {}

// ---------------------------------------------------------------------------
// HandleError
// ---------------------------------------------------------------------------

/// Error returned by strict handle accessors such as
/// [`FlatBst::try_get`](crate::tree::FlatBst::try_get).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleError {
    /// The handle is the `NONE` sentinel.
    None,
    /// The handle's position lies past the end of the arena.
    OutOfRange { position: u64, slots: usize },
    /// The slot is free, or was reused under a newer generation.
    Stale { position: u64, generation: u64 },
}

impl fmt::Display for HandleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleError::None => f.write_str("handle is NONE"),
            HandleError::OutOfRange { position, slots } => {
                write!(f, "handle position {position} out of range ({slots} slots)")
            },
            HandleError::Stale {
                position,
                generation,
            } => write!(
                f,
                "stale handle: slot {position} no longer has generation {generation}"
            ),
        }
    }
}

impl std::error::Error for HandleError {}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal arena or tree invariants are violated.
///
/// Produced by [`FlatBst::check_invariants`](crate::tree::FlatBst::check_invariants)
/// and [`SlotArena::check_invariants`](crate::ds::SlotArena::check_invariants).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when tree configuration parameters are invalid.
///
/// Produced by [`FlatBstBuilder::try_build`](crate::builder::FlatBstBuilder::try_build)
/// and [`FlatBstBuilder::try_build_from`](crate::builder::FlatBstBuilder::try_build_from).
///
/// # Example
///
/// ```
/// use flatbst::builder::FlatBstBuilder;
///
/// let err = FlatBstBuilder::new()
///     .capacity(1_000)
///     .try_build::<u8, u8>()
///     .unwrap_err();
/// assert!(err.to_string().contains("capacity"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

impl From<CapacityError> for ConfigError {
    fn from(err: CapacityError) -> Self {
        ConfigError::new(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
