use std::io::Write;
use std::sync::Mutex;

use crate::metrics::snapshot::TreeMetricsSnapshot;
use crate::metrics::traits::MetricsExporter;

/// Prometheus text exporter for tree metrics snapshots.
///
/// Writes the Prometheus text exposition format, suitable for a scrape
/// endpoint or an OpenTelemetry collector.
///
/// ```
/// use flatbst::metrics::{MetricsExporter, PrometheusTextExporter, TreeMetricsSnapshot};
///
/// let exporter = PrometheusTextExporter::new("flatbst", Vec::new());
/// exporter.export(&TreeMetricsSnapshot { len: 3, ..Default::default() });
/// let text = String::from_utf8(exporter.into_inner()).unwrap();
/// assert!(text.contains("flatbst_len 3"));
/// ```
#[derive(Debug)]
pub struct PrometheusTextExporter<W: Write + Send + Sync> {
    prefix: String,
    writer: Mutex<W>,
}

impl<W: Write + Send + Sync> PrometheusTextExporter<W> {
    pub fn new(prefix: impl Into<String>, writer: W) -> Self {
        Self {
            prefix: prefix.into(),
            writer: Mutex::new(writer),
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_metric(&self, kind: &str, name: &str, value: u64) {
        let mut writer = match self.writer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let _ = writeln!(writer, "# TYPE {} {}", name, kind);
        let _ = writeln!(writer, "{} {}", name, value);
    }

    fn write_counter(&self, suffix: &str, value: u64) {
        self.write_metric("counter", &self.metric_name(suffix), value);
    }

    fn write_gauge(&self, suffix: &str, value: usize) {
        self.write_metric("gauge", &self.metric_name(suffix), value as u64);
    }

    fn metric_name(&self, suffix: &str) -> String {
        if self.prefix.is_empty() {
            suffix.to_string()
        } else {
            format!("{}_{}", self.prefix, suffix)
        }
    }
}

impl<W: Write + Send + Sync> MetricsExporter<TreeMetricsSnapshot> for PrometheusTextExporter<W> {
    fn export(&self, snapshot: &TreeMetricsSnapshot) {
        self.write_counter("insert_calls_total", snapshot.insert_calls);
        self.write_counter("insert_new_total", snapshot.insert_new);
        self.write_counter("insert_duplicates_total", snapshot.insert_duplicates);
        self.write_counter("slots_reused_total", snapshot.slots_reused);
        self.write_counter("slots_appended_total", snapshot.slots_appended);
        self.write_counter("erase_calls_total", snapshot.erase_calls);
        self.write_counter("erase_found_total", snapshot.erase_found);
        self.write_counter("successor_splices_total", snapshot.successor_splices);
        self.write_counter("bulk_builds_total", snapshot.bulk_builds);
        self.write_counter("rebalances_total", snapshot.rebalances);
        self.write_counter("clears_total", snapshot.clears);
        self.write_counter("find_calls_total", snapshot.find_calls);
        self.write_counter("find_hits_total", snapshot.find_hits);
        self.write_counter("bound_queries_total", snapshot.bound_queries);
        self.write_counter("descent_steps_total", snapshot.descent_steps);
        self.write_gauge("len", snapshot.len);
        self.write_gauge("holes", snapshot.holes);
        self.write_gauge("slot_count", snapshot.slot_count);
        self.write_gauge("capacity", snapshot.capacity);
        self.write_gauge("height", snapshot.height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(prefix: &str, snapshot: &TreeMetricsSnapshot) -> String {
        let exporter = PrometheusTextExporter::new(prefix, Vec::new());
        exporter.export(snapshot);
        String::from_utf8(exporter.into_inner()).unwrap()
    }

    #[test]
    fn counters_and_gauges_are_typed() {
        let snapshot = TreeMetricsSnapshot {
            insert_calls: 5,
            holes: 2,
            ..TreeMetricsSnapshot::default()
        };
        let text = render("bst", &snapshot);
        assert!(text.contains("# TYPE bst_insert_calls_total counter\nbst_insert_calls_total 5\n"));
        assert!(text.contains("# TYPE bst_holes gauge\nbst_holes 2\n"));
    }

    #[test]
    fn empty_prefix_uses_bare_names() {
        let text = render("", &TreeMetricsSnapshot::default());
        assert!(text.contains("\nrebalances_total 0\n"));
        assert!(!text.contains("_rebalances_total"));
    }
}
