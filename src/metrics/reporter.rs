use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use super::collector::{CollectorSnapshot, MetricsCollector};
use crate::observer::records::{self, RecordSink, SnapshotRecord, TracingSink, SNAPSHOT_RECORD_TYPE};

/// Reporting period used when none (or zero) is configured.
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(60);

// ─── SnapshotReporter ────────────────────────────────────────────

/// Periodically turns a collector snapshot into one structured record.
#[derive(Clone)]
pub struct SnapshotReporter {
    collector: Option<Arc<MetricsCollector>>,
    sink: Arc<dyn RecordSink>,
}

/// Owned background reporter started by [`SnapshotReporter::spawn`].
pub struct ReporterHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SnapshotReporter {
    pub fn new(collector: Option<Arc<MetricsCollector>>, sink: Arc<dyn RecordSink>) -> Self {
        Self { collector, sink }
    }

    pub fn with_tracing(collector: Option<Arc<MetricsCollector>>) -> Self {
        Self::new(collector, Arc::new(TracingSink))
    }

    /// Tick every `interval` until `shutdown` turns `true` or its sender
    /// goes away. The first report happens one interval after start.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>, interval: Duration) {
        let Some(collector) = &self.collector else {
            return;
        };
        let interval = if interval.is_zero() {
            DEFAULT_REPORT_INTERVAL
        } else {
            interval
        };

        let mut ticker = time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::debug!(?interval, "snapshot reporter running");
        loop {
            if *shutdown.borrow_and_update() {
                break;
            }

            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    self.emit_snapshot(&collector.snapshot());
                }
            }
        }
        tracing::debug!("snapshot reporter stopped");
    }

    /// One tick's work. Returns whether a record was emitted; snapshots
    /// without any method are skipped.
    pub fn emit_snapshot(&self, snapshot: &CollectorSnapshot) -> bool {
        if snapshot.is_empty() {
            return false;
        }

        let record = SnapshotRecord {
            at: records::format_timestamp(snapshot.collected_at),
            metrics: &snapshot.methods,
            kind: SNAPSHOT_RECORD_TYPE,
        };

        match records::encode(SNAPSHOT_RECORD_TYPE, &record) {
            Ok(line) => {
                self.sink.emit(&line);
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "observability: dropping metrics snapshot");
                false
            }
        }
    }

    /// Run on a background task until the returned handle is shut down.
    pub fn spawn(self, interval: Duration) -> ReporterHandle {
        let (shutdown, rx) = watch::channel(false);
        let task = tokio::spawn(async move { self.run(rx, interval).await });
        ReporterHandle { shutdown, task }
    }
}

impl ReporterHandle {
    /// Signal the reporter and wait for its loop to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "snapshot reporter task failed");
        }
    }
}
