use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;

// ============================================================================
// Metrics Module - Prometheus metrics for the repository
// ============================================================================
//
// Covers both directions of the repository:
// - Replay: pages fetched, events applied, load latency
// - Save: events written and saves completed, by write path
// - Optimistic concurrency conflicts
//
// Attach with `Repository::with_metrics`; expose with `render()`.
// ============================================================================

pub struct RepositoryMetrics {
    registry: Registry,

    // Replay Metrics
    pub pages_read: IntCounter,
    pub events_replayed: IntCounter,
    pub load_duration: Histogram,

    // Save Metrics
    pub events_written: IntCounterVec,
    pub saves: IntCounterVec,
    pub concurrency_conflicts: IntCounter,
}

impl RepositoryMetrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        // Replay Metrics
        let pages_read = IntCounter::new(
            "repository_pages_read_total",
            "Total stream pages fetched during replay",
        )?;
        registry.register(Box::new(pages_read.clone()))?;

        let events_replayed = IntCounter::new(
            "repository_events_replayed_total",
            "Total events applied to aggregates during replay",
        )?;
        registry.register(Box::new(events_replayed.clone()))?;

        let load_duration = Histogram::with_opts(
            HistogramOpts::new(
                "repository_load_duration_seconds",
                "Time to reconstruct an aggregate from its stream",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        )?;
        registry.register(Box::new(load_duration.clone()))?;

        // Save Metrics
        let events_written = IntCounterVec::new(
            Opts::new("repository_events_written_total", "Total events persisted"),
            &["path"],
        )?;
        registry.register(Box::new(events_written.clone()))?;

        let saves = IntCounterVec::new(
            Opts::new("repository_saves_total", "Total successful saves"),
            &["path"],
        )?;
        registry.register(Box::new(saves.clone()))?;

        let concurrency_conflicts = IntCounter::new(
            "repository_concurrency_conflicts_total",
            "Total saves rejected by the optimistic concurrency check",
        )?;
        registry.register(Box::new(concurrency_conflicts.clone()))?;

        Ok(Self {
            registry,
            pages_read,
            events_replayed,
            load_duration,
            events_written,
            saves,
            concurrency_conflicts,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_page_read(&self, events: usize) {
        self.pages_read.inc();
        self.events_replayed.inc_by(events as u64);
    }

    pub fn observe_load(&self, elapsed: Duration) {
        self.load_duration.observe(elapsed.as_secs_f64());
    }

    /// `path` is the write path label, `single` or `transaction`.
    pub fn record_save(&self, path: &str, events: usize) {
        self.saves.with_label_values(&[path]).inc();
        self.events_written.with_label_values(&[path]).inc_by(events as u64);
    }

    pub fn record_conflict(&self) {
        self.concurrency_conflicts.inc();
    }

    /// Prometheus text exposition of every registered metric.
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();

        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = RepositoryMetrics::new().unwrap();
        assert!(metrics.registry().gather().len() >= 4);
    }

    #[test]
    fn test_record_page_read() {
        let metrics = RepositoryMetrics::new().unwrap();
        metrics.record_page_read(500);
        metrics.record_page_read(12);

        assert_eq!(metrics.pages_read.get(), 2);
        assert_eq!(metrics.events_replayed.get(), 512);
    }

    #[test]
    fn test_record_save_by_path() {
        let metrics = RepositoryMetrics::new().unwrap();
        metrics.record_save("single", 3);
        metrics.record_save("transaction", 1200);
        metrics.record_save("single", 1);

        assert_eq!(metrics.saves.with_label_values(&["single"]).get(), 2);
        assert_eq!(metrics.events_written.with_label_values(&["single"]).get(), 4);
        assert_eq!(metrics.events_written.with_label_values(&["transaction"]).get(), 1200);
    }

    #[test]
    fn test_render_exposes_metrics() {
        let metrics = RepositoryMetrics::new().unwrap();
        metrics.record_conflict();
        metrics.observe_load(Duration::from_millis(3));

        let text = metrics.render().unwrap();
        assert!(text.contains("repository_concurrency_conflicts_total 1"));
        assert!(text.contains("repository_load_duration_seconds_count 1"));
    }
}
