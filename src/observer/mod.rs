//! Per-call observation: timing, outcome classification, collector
//! ingestion and the structured access log.

pub mod context;
pub mod records;

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;

use crate::metrics::collector::{latency_to_ms, normalize_method_name};
use crate::metrics::{Classify, MetricsCollector, Outcome};

pub use context::{CallContext, CallMetadata};
pub use records::{MemorySink, RecordSink, TracingSink};

use records::{AccessRecord, ACCESS_RECORD_TYPE};

// ─── CallObserver ────────────────────────────────────────────────

/// Wraps handler execution for the transport layer.
///
/// Cheap to clone; every clone feeds the same collector and sink. Without
/// a collector the observer still times and logs calls but records nothing.
#[derive(Clone)]
pub struct CallObserver {
    collector: Option<Arc<MetricsCollector>>,
    sink: Arc<dyn RecordSink>,
}

impl CallObserver {
    pub fn new(collector: Option<Arc<MetricsCollector>>, sink: Arc<dyn RecordSink>) -> Self {
        Self { collector, sink }
    }

    /// Observer that writes access records through `tracing`.
    pub fn with_tracing(collector: Option<Arc<MetricsCollector>>) -> Self {
        Self::new(collector, Arc::new(TracingSink))
    }

    pub fn collector(&self) -> Option<&Arc<MetricsCollector>> {
        self.collector.as_ref()
    }

    /// Run `handler` once and observe it.
    ///
    /// The handler's result is returned untouched. If the future is dropped
    /// before completing, or the handler panics, the call is still recorded
    /// (as `Canceled` or `Internal`).
    pub async fn observe<C, F, Fut, R>(&self, method: Option<&str>, ctx: &C, handler: F) -> R
    where
        C: CallContext + ?Sized,
        F: FnOnce() -> Fut,
        Fut: Future<Output = R>,
        R: Classify,
    {
        let in_flight = InFlight::start(self, method, ctx);
        let result = handler().await;
        in_flight.finish(result.outcome());
        result
    }

    /// Synchronous counterpart of [`observe`](Self::observe).
    pub fn observe_sync<C, F, R>(&self, method: Option<&str>, ctx: &C, handler: F) -> R
    where
        C: CallContext + ?Sized,
        F: FnOnce() -> R,
        R: Classify,
    {
        let in_flight = InFlight::start(self, method, ctx);
        let result = handler();
        in_flight.finish(result.outcome());
        result
    }

    fn complete<C>(&self, method: Option<&str>, ctx: &C, outcome: Outcome, elapsed: Duration)
    where
        C: CallContext + ?Sized,
    {
        let method = normalize_method_name(method.unwrap_or_default());

        if let Some(collector) = &self.collector {
            collector.record_rpc(method, outcome, elapsed);
        }
        self.log_access(ctx, method, outcome, elapsed);
    }

    fn log_access<C>(&self, ctx: &C, method: &str, outcome: Outcome, elapsed: Duration)
    where
        C: CallContext + ?Sized,
    {
        let record = AccessRecord {
            at: records::format_timestamp(Utc::now()),
            kind: ACCESS_RECORD_TYPE,
            latency_ms: latency_to_ms(elapsed),
            method,
            request_id: ctx.request_id().unwrap_or_default(),
            status: outcome.as_str(),
            user_id: ctx.user_id().unwrap_or_default(),
        };

        match records::encode(ACCESS_RECORD_TYPE, &record) {
            Ok(line) => self.sink.emit(&line),
            Err(e) => tracing::warn!(error = %e, method, "observability: dropping access record"),
        }
    }
}

// ─── In-flight guard ─────────────────────────────────────────────

/// Completes the observation exactly once, on `finish` or on drop.
struct InFlight<'a, C: CallContext + ?Sized> {
    observer: &'a CallObserver,
    method: Option<&'a str>,
    ctx: &'a C,
    started_at: Instant,
    done: bool,
}

impl<'a, C> InFlight<'a, C>
where
    C: CallContext + ?Sized,
{
    fn start(observer: &'a CallObserver, method: Option<&'a str>, ctx: &'a C) -> Self {
        Self {
            observer,
            method,
            ctx,
            started_at: Instant::now(),
            done: false,
        }
    }

    fn finish(mut self, outcome: Outcome) {
        self.done = true;
        self.observer
            .complete(self.method, self.ctx, outcome, self.started_at.elapsed());
    }
}

impl<C> Drop for InFlight<'_, C>
where
    C: CallContext + ?Sized,
{
    fn drop(&mut self) {
        if self.done {
            return;
        }
        let outcome = if std::thread::panicking() {
            Outcome::Internal
        } else {
            Outcome::Canceled
        };
        self.observer
            .complete(self.method, self.ctx, outcome, self.started_at.elapsed());
    }
}
