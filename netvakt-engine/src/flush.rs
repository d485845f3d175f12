//! Enrich-and-persist flush path.
//!
//! A detached batch fans out one resolution per record, preserving
//! capture order, then persists the enriched batch in one insert. The
//! registry updates depend on a successful insert; an insert failure
//! skips them for that batch only. Failed batches are not replayed.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use netvakt_core::flow::{EnrichedFlowRecord, FlowRecord};
use netvakt_enrichment::EnrichmentResolver;
use netvakt_storage::{FlowStore, ThreatRecorder};
use netvakt_telemetry::MetricsRecorder;

pub struct Flusher {
    resolver: Arc<EnrichmentResolver>,
    store: Arc<dyn FlowStore>,
    recorder: Arc<ThreatRecorder>,
    metrics: MetricsRecorder,
}

impl Flusher {
    pub fn new(
        resolver: Arc<EnrichmentResolver>,
        store: Arc<dyn FlowStore>,
        recorder: Arc<ThreatRecorder>,
        metrics: MetricsRecorder,
    ) -> Self {
        Self {
            resolver,
            store,
            recorder,
            metrics,
        }
    }

    /// Process one detached batch to completion. Never returns an error:
    /// every failure mode degrades locally and the scheduler resumes
    /// normal buffering afterwards.
    pub async fn flush(&self, batch: Vec<FlowRecord>) {
        let _timer = self.metrics.flush_duration.start_timer();
        let size = batch.len();
        debug!(size, "Processing batch");

        let enrichments = join_all(
            batch
                .iter()
                .map(|record| self.resolver.resolve(&record.source_ip)),
        )
        .await;

        let mut enriched = Vec::with_capacity(size);
        for (flow, enrichment) in batch.into_iter().zip(enrichments) {
            if enrichment.geo.is_degraded() {
                self.metrics.lookups_degraded.inc();
            }
            if enrichment.threat.is_degraded() {
                self.metrics.lookups_degraded.inc();
            }
            enriched.push(EnrichedFlowRecord::new(
                flow,
                enrichment.geo.into_value(),
                enrichment.threat.into_value(),
            ));
        }

        if let Err(err) = self.store.insert_flows(&enriched).await {
            warn!(%err, size, "Batch insert failed; skipping registry updates");
            self.metrics.batch_failures.inc();
            return;
        }
        self.metrics.batches_flushed.inc();
        info!(size, "Persisted batch");

        let malicious: Vec<&EnrichedFlowRecord> =
            enriched.iter().filter(|r| r.is_malicious).collect();
        if malicious.is_empty() {
            return;
        }
        info!(count = malicious.len(), "Malicious flows in batch");

        for record in malicious {
            match self.recorder.record_detection(record).await {
                Ok(()) => self.metrics.threats_recorded.inc(),
                Err(err) => {
                    warn!(
                        ip = %record.flow.source_ip,
                        %err,
                        "Threat registry update failed"
                    );
                }
            }
        }
    }
}
