//! # Metrics Trait Hierarchy
//!
//! Recording, snapshotting and export are split into small traits so the
//! tree algorithms only ever *write* counters.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────┐   ┌──────────────────────────────┐
//!   │     TreeMetricsRecorder      │   │   TreeMetricsReadRecorder    │
//!   │ (&mut self: insert / erase / │   │ (&self: find / bounds /      │
//!   │  build / rebalance / clear)  │   │  descent steps)              │
//!   └──────────────┬───────────────┘   └──────────────┬───────────────┘
//!                  │                                  │
//!                  └────────────────┬─────────────────┘
//!                                   ▼
//!                        ┌─────────────────────┐
//!                        │     TreeMetrics     │
//!                        └──────────┬──────────┘
//!                                   │ snapshot
//!                                   ▼
//!   ┌──────────────────────────────┐    ┌──────────────────────────────┐
//!   │ MetricsSnapshotProvider<S>   │    │ MetricsExporter<S>           │
//!   │ (bench/test)                 │    │ (production monitoring)      │
//!   └──────────────────────────────┘    └──────────────────────────────┘
//! ```
//!
//! Mutating operations record through `&mut self`; read-only queries record
//! through `&self` via [`MetricsCell`](crate::metrics::cell::MetricsCell).

/// Counters for operations that mutate the tree.
pub trait TreeMetricsRecorder {
    fn record_insert_call(&mut self);
    fn record_insert_new(&mut self);
    fn record_insert_duplicate(&mut self);
    /// A new node landed in a slot taken from the free list.
    fn record_slot_reused(&mut self);
    /// A new node required pushing a fresh slot.
    fn record_slot_appended(&mut self);
    fn record_erase_call(&mut self);
    fn record_erase_found(&mut self);
    /// Erase hit the two-child case and spliced the in-order successor.
    fn record_successor_splice(&mut self);
    fn record_bulk_build(&mut self);
    fn record_rebalance(&mut self);
    fn record_clear(&mut self);
}

/// Counters for `&self` queries.
pub trait TreeMetricsReadRecorder {
    fn record_find_call(&self);
    fn record_find_hit(&self);
    fn record_bound_query(&self);
    /// One node visited during a comparator-driven descent.
    fn record_descent_step(&self);
}

/// Produce a point-in-time snapshot (bench/test).
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Reset metrics between tests or benchmark iterations.
pub trait MetricsReset {
    fn reset_metrics(&mut self);
}

/// Export/publish metrics to production monitoring backends.
pub trait MetricsExporter<S> {
    fn export(&self, snapshot: &S);
}
