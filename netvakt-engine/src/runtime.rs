//! Pipeline runtime - wires capture, parsing, scheduling, enrichment, and
//! persistence together and owns the shutdown sequence.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncBufReadExt;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use netvakt_capture::CaptureSupervisor;
use netvakt_config::NetvaktConfig;
use netvakt_core::buffer::FlowBuffer;
use netvakt_core::parser::parse_line;
use netvakt_enrichment::{
    AbuseIpDbClient, EnrichmentResolver, IpApiClient, ReputationCache,
};
use netvakt_storage::{FlowStore, RestStore, ThreatRecorder};
use netvakt_telemetry::MetricsRecorder;

use crate::error::PipelineError;
use crate::flush::Flusher;
use crate::scheduler::BatchScheduler;

/// Coordinates the capture-to-storage pipeline.
pub struct PipelineRuntime {
    config: NetvaktConfig,
    metrics: MetricsRecorder,
    cache: Arc<ReputationCache>,
    scheduler: Arc<BatchScheduler>,
    flusher: Arc<Flusher>,
}

impl PipelineRuntime {
    /// Build the full live wiring from configuration.
    pub fn new(config: NetvaktConfig) -> Result<Self, PipelineError> {
        let metrics = MetricsRecorder::new();

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.enrichment.lookup_timeout_secs))
            .build()?;

        let cache = Arc::new(ReputationCache::new(Duration::from_secs(
            config.enrichment.cache_ttl_secs,
        )));
        let resolver = Arc::new(EnrichmentResolver::new(
            cache.clone(),
            Arc::new(IpApiClient::new(
                client.clone(),
                config.enrichment.geo_endpoint.clone(),
            )),
            Arc::new(AbuseIpDbClient::new(
                client.clone(),
                config.enrichment.reputation_endpoint.clone(),
                config.enrichment.reputation_api_key.clone(),
            )),
        ));

        let store: Arc<dyn FlowStore> = Arc::new(RestStore::new(
            client,
            config.storage.endpoint.clone(),
            config.storage.api_key.clone(),
            config.storage.flows_table.clone(),
            config.storage.threats_table.clone(),
        ));
        let recorder = Arc::new(ThreatRecorder::new(
            store.clone(),
            config.storage.report_source.clone(),
        ));

        let scheduler = Arc::new(BatchScheduler::new(
            Arc::new(FlowBuffer::new()),
            config.pipeline.max_batch_size,
        ));
        let flusher = Arc::new(Flusher::new(resolver, store, recorder, metrics.clone()));

        Ok(Self {
            config,
            metrics,
            cache,
            scheduler,
            flusher,
        })
    }

    pub fn metrics(&self) -> &MetricsRecorder {
        &self.metrics
    }

    /// Live capture mode: supervise the capture process until a shutdown
    /// signal, a clean capture exit, or a fatal spawn failure.
    ///
    /// Shutdown stops capture and the cache sweeper without force-flushing
    /// the buffer; up to one batch's worth of records is dropped.
    pub async fn run(self) -> Result<(), PipelineError> {
        info!(
            interface = %self.config.capture.interface,
            batch_size = self.config.pipeline.max_batch_size,
            "Starting capture pipeline"
        );

        let sweeper = self.cache.start_sweeper(Duration::from_secs(
            self.config.enrichment.cache_sweep_interval_secs,
        ));

        let (line_tx, line_rx) = mpsc::channel(1024);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let supervisor = CaptureSupervisor::new(self.config.capture.clone(), line_tx);
        let mut capture_task = tokio::spawn(supervisor.run(shutdown_rx.clone()));

        let ingest_task = tokio::spawn(ingest_loop(
            line_rx,
            self.scheduler.clone(),
            self.flusher.clone(),
            self.metrics.clone(),
        ));
        let timer_task = tokio::spawn(timer_loop(
            Duration::from_secs(self.config.pipeline.flush_interval_secs),
            self.scheduler.clone(),
            self.flusher.clone(),
            shutdown_rx,
        ));

        let capture_result = tokio::select! {
            signal = shutdown_signal() => {
                signal?;
                info!("Shutdown signal received; stopping capture");
                let _ = shutdown_tx.send(true);
                (&mut capture_task).await
            }
            result = &mut capture_task => {
                let _ = shutdown_tx.send(true);
                result
            }
        };

        // Supervisor gone -> line channel closed -> ingest drains and ends.
        let _ = ingest_task.await;
        let _ = timer_task.await;
        sweeper.stop().await;

        let dropped = self.scheduler.buffer().len();
        if dropped > 0 {
            info!(dropped, "Pipeline stopped with unflushed records");
        } else {
            info!("Pipeline stopped");
        }

        capture_result??;
        Ok(())
    }

    /// Replay mode: feed a saved capture-output file through the same
    /// parse/enrich/persist path, draining the buffer completely.
    pub async fn replay<P: AsRef<Path>>(self, path: P) -> Result<(), PipelineError> {
        let file = tokio::fs::File::open(path.as_ref()).await?;
        let mut lines = tokio::io::BufReader::new(file).lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            if ingest_line(&line, &self.scheduler, &self.metrics)
                && self.scheduler.size_trigger(self.scheduler.buffer().len())
            {
                self.flush_pending().await;
            }
        }
        self.flush_pending().await;

        info!(
            flows = self.metrics.flows_captured.get(),
            "Replay complete"
        );
        Ok(())
    }

    /// Sequentially flush until the buffer is empty.
    async fn flush_pending(&self) {
        while let Some((batch, permit)) = self.scheduler.begin_flush() {
            self.flusher.flush(batch).await;
            drop(permit);
        }
    }
}

/// Parse one line into the buffer; true when a record was appended.
fn ingest_line(line: &str, scheduler: &BatchScheduler, metrics: &MetricsRecorder) -> bool {
    match parse_line(line) {
        Ok(Some(record)) => {
            metrics.flows_captured.inc();
            scheduler.buffer().push(record);
            true
        }
        Ok(None) => {
            metrics.lines_dropped.inc();
            false
        }
        Err(err) => {
            metrics.lines_dropped.inc();
            debug!(%err, line, "Dropped unparseable capture line");
            false
        }
    }
}

async fn ingest_loop(
    mut lines: mpsc::Receiver<String>,
    scheduler: Arc<BatchScheduler>,
    flusher: Arc<Flusher>,
    metrics: MetricsRecorder,
) {
    while let Some(line) = lines.recv().await {
        if ingest_line(&line, &scheduler, &metrics)
            && scheduler.size_trigger(scheduler.buffer().len())
        {
            spawn_flush(&scheduler, &flusher);
        }
    }
    debug!("Capture line stream ended");
}

async fn timer_loop(
    interval: Duration,
    scheduler: Arc<BatchScheduler>,
    flusher: Arc<Flusher>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // The first tick completes immediately; skip it.
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if !scheduler.buffer().is_empty() {
                    spawn_flush(&scheduler, &flusher);
                }
            }
            _ = shutdown.changed() => break,
        }
    }
}

/// Start a flush task if the in-flight slot is free; otherwise the
/// trigger is dropped and the next one retries.
fn spawn_flush(scheduler: &Arc<BatchScheduler>, flusher: &Arc<Flusher>) {
    if let Some((batch, permit)) = scheduler.begin_flush() {
        let flusher = flusher.clone();
        tokio::spawn(async move {
            flusher.flush(batch).await;
            drop(permit);
        });
    }
}

/// Resolve on SIGINT or SIGTERM.
async fn shutdown_signal() -> Result<(), std::io::Error> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
    }
    Ok(())
}
