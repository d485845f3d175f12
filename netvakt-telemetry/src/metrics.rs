//! ## netvakt-telemetry::metrics
//! **Prometheus counters for the capture pipeline**
//!
//! Tracks the volume moving through each pipeline stage and how often
//! enrichment or persistence degrades.

use prometheus::{Counter, Histogram, HistogramOpts, Registry};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub flows_captured: Counter,
    pub lines_dropped: Counter,
    pub batches_flushed: Counter,
    pub batch_failures: Counter,
    pub lookups_degraded: Counter,
    pub threats_recorded: Counter,
    pub flush_duration: Histogram,
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRecorder {
    pub fn new() -> Self {
        let registry = Registry::new();
        let flows_captured =
            Counter::new("netvakt_flows_total", "Flow records parsed from capture output").unwrap();
        let lines_dropped =
            Counter::new("netvakt_lines_dropped_total", "Capture lines dropped by the parser")
                .unwrap();
        let batches_flushed =
            Counter::new("netvakt_batches_total", "Batches persisted to the flow store").unwrap();
        let batch_failures = Counter::new(
            "netvakt_batch_failures_total",
            "Batches whose persistence failed",
        )
        .unwrap();
        let lookups_degraded = Counter::new(
            "netvakt_lookups_degraded_total",
            "Enrichment lookups that fell back to a placeholder",
        )
        .unwrap();
        let threats_recorded = Counter::new(
            "netvakt_threats_recorded_total",
            "Malicious detections written to the threat registry",
        )
        .unwrap();
        let flush_duration = Histogram::with_opts(
            HistogramOpts::new(
                "netvakt_flush_duration_seconds",
                "Wall time of enrich-and-persist per batch",
            )
            .buckets(vec![0.05, 0.25, 1.0, 5.0, 15.0]),
        )
        .unwrap();

        registry.register(Box::new(flows_captured.clone())).unwrap();
        registry.register(Box::new(lines_dropped.clone())).unwrap();
        registry.register(Box::new(batches_flushed.clone())).unwrap();
        registry.register(Box::new(batch_failures.clone())).unwrap();
        registry
            .register(Box::new(lookups_degraded.clone()))
            .unwrap();
        registry
            .register(Box::new(threats_recorded.clone()))
            .unwrap();
        registry.register(Box::new(flush_duration.clone())).unwrap();

        Self {
            registry,
            flows_captured,
            lines_dropped,
            batches_flushed,
            batch_failures,
            lookups_degraded,
            threats_recorded,
            flush_duration,
        }
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_register_and_gather() {
        let metrics = MetricsRecorder::new();
        metrics.flows_captured.inc();
        metrics.batches_flushed.inc();

        let text = metrics.gather_metrics().unwrap();
        assert!(text.contains("netvakt_flows_total 1"));
        assert!(text.contains("netvakt_batches_total 1"));
    }
}
