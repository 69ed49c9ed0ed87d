//! In-process RPC observability engine.
//!
//! - `metrics`: per-method collector, p95 estimator, periodic reporter
//! - `observer`: per-call wrapper and structured access log
//! - `middleware`: axum adapter that observes every routed request
//! - `server` / `handlers` / `load_generator`: demo host

pub mod config;
pub mod error;
pub mod handlers;
pub mod load_generator;
pub mod metrics;
pub mod middleware;
pub mod observer;
pub mod server;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use config::ObservatoryConfig;
use load_generator::LoadProfile;
use metrics::{CollectorSnapshot, MetricsCollector, SnapshotReporter};
use observer::CallObserver;

/// Shared application state available to every handler via `State<Arc<AppState>>`.
pub struct AppState {
    pub config: ObservatoryConfig,

    /// Central metrics engine — the observer records, the reporter reads.
    pub collector: Arc<MetricsCollector>,

    /// Wraps every observed call.
    pub observer: CallObserver,

    /// Flag checked by every load-generator worker on each iteration.
    pub load_running: Arc<AtomicBool>,

    /// Handle to the spawned load-generator task so we can await clean shutdown.
    pub load_handle: tokio::sync::Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl AppState {
    pub fn new(config: ObservatoryConfig) -> Self {
        let collector = Arc::new(MetricsCollector::new(config.max_latency_samples()));
        let observer = CallObserver::with_tracing(Some(Arc::clone(&collector)));
        Self::with_observer(config, collector, observer)
    }

    /// State around a caller-built observer (custom sinks, tests).
    pub fn with_observer(
        config: ObservatoryConfig,
        collector: Arc<MetricsCollector>,
        observer: CallObserver,
    ) -> Self {
        Self {
            config,
            collector,
            observer,
            load_running: Arc::new(AtomicBool::new(false)),
            load_handle: tokio::sync::Mutex::new(None),
        }
    }

    pub fn snapshot(&self) -> CollectorSnapshot {
        self.collector.snapshot()
    }

    /// Reporter over this state's collector, logging through `tracing`.
    pub fn reporter(&self) -> SnapshotReporter {
        SnapshotReporter::with_tracing(Some(Arc::clone(&self.collector)))
    }

    /// Start a load run. Returns `false` if one is already in progress.
    pub async fn start_load(&self, profile: LoadProfile) -> bool {
        let mut guard = self.load_handle.lock().await;
        // Flip the flag before spawning so workers see it immediately
        if self.load_running.swap(true, Ordering::SeqCst) {
            return false;
        }

        tracing::info!(?profile, "load generator starting");
        let running = self.load_running.clone();
        let observer = self.observer.clone();
        *guard = Some(tokio::spawn(load_generator::run(running, observer, profile)));
        true
    }

    /// Stop the current load run and wait for it. Returns `false` if idle.
    pub async fn stop_load(&self) -> bool {
        // Hold the slot across the flag flip so a concurrent start cannot
        // slip in between and have its handle detached.
        let mut guard = self.load_handle.lock().await;
        let was_running = self.load_running.swap(false, Ordering::SeqCst);

        if let Some(handle) = guard.take() {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "load generator task failed");
            }
        }
        was_running
    }
}
