use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

use super::outcome::Outcome;
use super::percentiles;

// ─── Configuration ───────────────────────────────────────────────

/// Latency samples retained per method when no capacity is given.
pub const DEFAULT_MAX_LATENCY_SAMPLES: usize = 512;

/// Key used for calls that arrive without a usable method name.
pub const UNKNOWN_METHOD: &str = "unknown";

// ─── Public types ────────────────────────────────────────────────

/// Thread-safe per-method RPC metrics.
/// The call observer calls `record_rpc()`, the reporter calls `snapshot()`.
pub struct MetricsCollector {
    max_latency_samples: usize,
    inner: Mutex<HashMap<String, MethodState>>,
}

/// Aggregated statistics for one method at snapshot time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodMetricsSnapshot {
    pub method: String,
    pub request_count: u64,
    pub error_count: u64,
    pub error_rate: f64,
    pub p95_latency_ms: f64,
}

/// Point-in-time copy of every method, sorted by method name.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectorSnapshot {
    pub collected_at: DateTime<Utc>,
    pub methods: Vec<MethodMetricsSnapshot>,
}

impl CollectorSnapshot {
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Look up a method by its normalized name.
    pub fn method(&self, name: &str) -> Option<&MethodMetricsSnapshot> {
        self.methods.iter().find(|m| m.method == name)
    }
}

// ─── Internal state ──────────────────────────────────────────────

/// Fixed-capacity FIFO of latencies in milliseconds.
#[derive(Debug, Clone)]
pub(crate) struct LatencyWindow {
    capacity: usize,
    samples: VecDeque<f64>,
}

impl LatencyWindow {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a sample, evicting the oldest first when full.
    fn push(&mut self, latency_ms: f64) {
        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(latency_ms);
    }

    fn to_vec(&self) -> Vec<f64> {
        self.samples.iter().copied().collect()
    }
}

#[derive(Debug)]
struct MethodState {
    request_count: u64,
    error_count: u64,
    latency_samples: LatencyWindow,
}

impl MethodState {
    fn new(capacity: usize) -> Self {
        Self {
            request_count: 0,
            error_count: 0,
            latency_samples: LatencyWindow::new(capacity),
        }
    }

    fn record(&mut self, outcome: Outcome, latency_ms: f64) {
        self.request_count += 1;
        if outcome.is_error() {
            self.error_count += 1;
        }
        self.latency_samples.push(latency_ms);
    }
}

/// Raw state copied out of the critical section.
struct CopiedState {
    method: String,
    request_count: u64,
    error_count: u64,
    latency_samples: Vec<f64>,
}

// ─── MetricsCollector impl ───────────────────────────────────────

impl MetricsCollector {
    /// Create a collector keeping at most `max_latency_samples` latencies
    /// per method. Zero falls back to [`DEFAULT_MAX_LATENCY_SAMPLES`].
    pub fn new(max_latency_samples: usize) -> Self {
        let max_latency_samples = if max_latency_samples == 0 {
            DEFAULT_MAX_LATENCY_SAMPLES
        } else {
            max_latency_samples
        };

        Self {
            max_latency_samples,
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Effective per-method window capacity.
    pub fn capacity(&self) -> usize {
        self.max_latency_samples
    }

    /// Record one finished call. Never fails.
    pub fn record_rpc(&self, method: &str, outcome: Outcome, latency: Duration) {
        let method = normalize_method_name(method);
        let latency_ms = latency_to_ms(latency);

        let mut by_method = self.inner.lock();
        match by_method.get_mut(method) {
            Some(state) => state.record(outcome, latency_ms),
            None => {
                let mut state = MethodState::new(self.max_latency_samples);
                state.record(outcome, latency_ms);
                by_method.insert(method.to_owned(), state);
            }
        }
    }

    /// Copy every method's counters and window, then derive rates and p95
    /// without holding the lock.
    pub fn snapshot(&self) -> CollectorSnapshot {
        let copied: Vec<CopiedState> = {
            let by_method = self.inner.lock();
            by_method
                .iter()
                .map(|(method, state)| CopiedState {
                    method: method.clone(),
                    request_count: state.request_count,
                    error_count: state.error_count,
                    latency_samples: state.latency_samples.to_vec(),
                })
                .collect()
        };

        let mut methods: Vec<MethodMetricsSnapshot> = copied
            .into_iter()
            .map(|state| {
                let error_rate = if state.request_count > 0 {
                    state.error_count as f64 / state.request_count as f64
                } else {
                    0.0
                };

                MethodMetricsSnapshot {
                    method: state.method,
                    request_count: state.request_count,
                    error_count: state.error_count,
                    error_rate,
                    p95_latency_ms: percentiles::p95(state.latency_samples),
                }
            })
            .collect();

        methods.sort_by(|a, b| a.method.cmp(&b.method));

        CollectorSnapshot {
            collected_at: Utc::now(),
            methods,
        }
    }

    /// Current latency window of one method, oldest first.
    #[cfg(test)]
    pub(crate) fn latency_samples(&self, method: &str) -> Option<Vec<f64>> {
        self.inner
            .lock()
            .get(normalize_method_name(method))
            .map(|s| s.latency_samples.to_vec())
    }

    /// `(request_count, error_count, window_len)` of one method, read
    /// under a single lock acquisition.
    #[cfg(test)]
    pub(crate) fn counters(&self, method: &str) -> Option<(u64, u64, usize)> {
        self.inner
            .lock()
            .get(normalize_method_name(method))
            .map(|s| (s.request_count, s.error_count, s.latency_samples.samples.len()))
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LATENCY_SAMPLES)
    }
}

/// Trim a raw method name; blank names collapse onto [`UNKNOWN_METHOD`].
pub fn normalize_method_name(method: &str) -> &str {
    let trimmed = method.trim();
    if trimmed.is_empty() {
        UNKNOWN_METHOD
    } else {
        trimmed
    }
}

/// Milliseconds with microsecond precision.
pub fn latency_to_ms(latency: Duration) -> f64 {
    latency.as_micros() as f64 / 1000.0
}
