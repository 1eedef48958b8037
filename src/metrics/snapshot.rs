/// Point-in-time copy of a tree's counters plus shape gauges.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TreeMetricsSnapshot {
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

    pub find_calls: u64,
    pub find_hits: u64,
    pub bound_queries: u64,
    pub descent_steps: u64,

    // gauges captured at snapshot time
    pub len: usize,
    pub holes: usize,
    pub slot_count: usize,
    pub capacity: usize,
    pub height: usize,
}

impl TreeMetricsSnapshot {
    /// Fraction of `find` calls that located their key.
    pub fn find_hit_ratio(&self) -> f64 {
        if self.find_calls == 0 {
            0.0
        } else {
            self.find_hits as f64 / self.find_calls as f64
        }
    }

    /// Fraction of slots that are vacant.
    pub fn hole_ratio(&self) -> f64 {
        if self.slot_count == 0 {
            0.0
        } else {
            self.holes as f64 / self.slot_count as f64
        }
    }
}
