use crate::metrics::cell::MetricsCell;
use crate::metrics::traits::{MetricsReset, TreeMetricsReadRecorder, TreeMetricsRecorder};

/// Counters carried by every `FlatBst` when the `metrics` feature is on.
#[derive(Debug, Default)]
pub struct TreeMetrics {
    pub insert_calls: u64,
    pub insert_new: u64,
    pub insert_duplicates: u64,
    pub slots_reused: u64,
    pub slots_appended: u64,
    pub erase_calls: u64,
    pub erase_found: u64,
    pub successor_splices: u64,
    pub bulk_builds: u64,
    pub rebalances: u64,
    pub clears: u64,
    pub find_calls: MetricsCell,
    pub find_hits: MetricsCell,
    pub bound_queries: MetricsCell,
    pub descent_steps: MetricsCell,
}

impl TreeMetrics {
    pub fn new() -> TreeMetrics {
        TreeMetrics::default()
    }
}

impl TreeMetricsRecorder for TreeMetrics {
    fn record_insert_call(&mut self) {
        self.insert_calls += 1;
    }

    fn record_insert_new(&mut self) {
        self.insert_new += 1;
    }

    fn record_insert_duplicate(&mut self) {
        self.insert_duplicates += 1;
    }

    fn record_slot_reused(&mut self) {
        self.slots_reused += 1;
    }

    fn record_slot_appended(&mut self) {
        self.slots_appended += 1;
    }

    fn record_erase_call(&mut self) {
        self.erase_calls += 1;
    }

    fn record_erase_found(&mut self) {
        self.erase_found += 1;
    }

    fn record_successor_splice(&mut self) {
        self.successor_splices += 1;
    }

    fn record_bulk_build(&mut self) {
        self.bulk_builds += 1;
    }

    fn record_rebalance(&mut self) {
        self.rebalances += 1;
    }

    fn record_clear(&mut self) {
        self.clears += 1;
    }
}

impl TreeMetricsReadRecorder for &TreeMetrics {
    fn record_find_call(&self) {
        self.find_calls.incr();
    }

    fn record_find_hit(&self) {
        self.find_hits.incr();
    }

    fn record_bound_query(&self) {
        self.bound_queries.incr();
    }

    fn record_descent_step(&self) {
        self.descent_steps.incr();
    }
}

impl MetricsReset for TreeMetrics {
    fn reset_metrics(&mut self) {
        *self = TreeMetrics::default();
    }
}
