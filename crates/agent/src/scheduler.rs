//! The cycle loop: collect, build snapshot, deliver, sleep.

use std::future::Future;
use std::time::{Duration, Instant};

use metrics::{gauge, histogram};
use radar_collect::{BatchBuilder, Collector};
use radar_deliver::{DeliveryOutcome, SnapshotSink};
use radar_kubehub::ObjectStore;
use tracing::{debug, info};

pub struct Scheduler<S, D> {
    collector: Collector<S>,
    batch: BatchBuilder,
    sink: D,
    interval: Duration,
}

impl<S: ObjectStore, D: SnapshotSink> Scheduler<S, D> {
    pub fn new(collector: Collector<S>, batch: BatchBuilder, sink: D, interval: Duration) -> Self {
        Self { collector, batch, sink, interval }
    }

    pub fn interval(&self) -> Duration { self.interval }

    /// One complete cycle. The snapshot is dropped once delivery returns.
    pub async fn run_cycle(&self) -> DeliveryOutcome {
        let started = Instant::now();
        let snapshot = self.batch.build(self.collector.collect().await);
        info!(
            cluster = %snapshot.cluster_identity,
            records = snapshot.len(),
            collect_ms = started.elapsed().as_millis() as u64,
            "snapshot built"
        );
        if tracing::enabled!(tracing::Level::DEBUG) {
            match serde_json::to_string(&snapshot) {
                Ok(payload) => debug!(%payload, "snapshot payload"),
                Err(e) => debug!(error = %e, "snapshot payload not printable"),
            }
        }
        gauge!("radar_snapshot_records", snapshot.len() as f64);
        let outcome = self.sink.deliver(&snapshot).await;
        histogram!("radar_cycle_ms", started.elapsed().as_secs_f64() * 1000.0);
        debug!(outcome = outcome.label(), cycle_ms = started.elapsed().as_millis() as u64, "cycle finished");
        outcome
    }

    /// Run cycles until `shutdown` resolves; it is only observed while sleeping between cycles.
    /// Returns the number of completed cycles.
    pub async fn run<F>(&self, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut cycles = 0u64;
        loop {
            self.run_cycle().await;
            cycles += 1;
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = &mut shutdown => {
                    info!(cycles, "shutdown requested; leaving cycle loop");
                    break;
                }
            }
        }
        cycles
    }
}
