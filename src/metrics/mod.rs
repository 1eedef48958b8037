//! Feature-gated tree metrics (`--features metrics`).
//!
//! - [`traits`]: recorder, snapshot and exporter traits
//! - [`metrics_impl`]: the counters embedded in every `FlatBst`
//! - [`snapshot`]: plain-data copies of those counters plus gauges
//! - [`exporter`]: Prometheus text exposition

pub mod cell;
pub mod exporter;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;

pub use exporter::PrometheusTextExporter;
pub use metrics_impl::TreeMetrics;
pub use snapshot::TreeMetricsSnapshot;
pub use traits::{
    MetricsExporter, MetricsReset, MetricsSnapshotProvider, TreeMetricsReadRecorder,
    TreeMetricsRecorder,
};
