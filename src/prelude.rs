pub use crate::builder::FlatBstBuilder;
pub use crate::ds::{Handle, HandleRepr, SlotArena};
pub use crate::error::{CapacityError, ConfigError, HandleError, InvariantError};
pub use crate::traits::{Compare, Greater, Less};
pub use crate::tree::{Entries, FlatBst, IntoIter, Iter};

#[cfg(feature = "concurrency")]
pub use crate::tree::ConcurrentFlatBst;
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::TreeMetricsSnapshot;
