use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use serde::Serialize;

use crate::error::{ObservabilityError, Result};
use crate::metrics::MethodMetricsSnapshot;

/// Type tag of the per-call record.
pub const ACCESS_RECORD_TYPE: &str = "access";
/// Type tag of the per-tick record.
pub const SNAPSHOT_RECORD_TYPE: &str = "metrics-snapshot";

// ─── Sinks ───────────────────────────────────────────────────────

/// Destination for structured records, one JSON line each.
pub trait RecordSink: Send + Sync {
    fn emit(&self, line: &str);
}

/// Default sink: one `info` event per record.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl RecordSink for TracingSink {
    fn emit(&self, line: &str) {
        tracing::info!(target: "rpc_observatory::records", "{line}");
    }
}

/// Keeps every emitted line in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }
}

impl RecordSink for MemorySink {
    fn emit(&self, line: &str) {
        self.lines.lock().push(line.to_owned());
    }
}

// ─── Records ─────────────────────────────────────────────────────

/// One line per observed call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRecord<'a> {
    pub at: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub latency_ms: f64,
    pub method: &'a str,
    pub request_id: &'a str,
    pub status: &'a str,
    pub user_id: &'a str,
}

/// One line per reporting tick.
#[derive(Debug, Serialize)]
pub struct SnapshotRecord<'a> {
    pub at: String,
    pub metrics: &'a [MethodMetricsSnapshot],
    #[serde(rename = "type")]
    pub kind: &'static str,
}

/// UTC, RFC 3339 with nanoseconds.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Serialize a record to a single JSON line.
pub fn encode<T: Serialize>(kind: &'static str, record: &T) -> Result<String> {
    serde_json::to_string(record).map_err(|source| ObservabilityError::Encode { kind, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamp_has_nanoseconds_and_z() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 5).unwrap();
        assert_eq!(format_timestamp(at), "2024-03-01T12:00:05.000000000Z");
    }

    #[test]
    fn access_record_field_names() {
        let record = AccessRecord {
            at: "t".into(),
            kind: ACCESS_RECORD_TYPE,
            latency_ms: 1.5,
            method: "m",
            request_id: "r",
            status: "OK",
            user_id: "",
        };
        let json: serde_json::Value =
            serde_json::from_str(&encode(ACCESS_RECORD_TYPE, &record).unwrap()).unwrap();
        assert_eq!(json["type"], "access");
        assert_eq!(json["latencyMs"], 1.5);
        assert_eq!(json["requestId"], "r");
        assert_eq!(json["userId"], "");
        assert_eq!(json["status"], "OK");
    }

    #[test]
    fn memory_sink_collects() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());
        sink.emit("a");
        sink.emit("b");
        assert_eq!(sink.lines(), vec!["a", "b"]);
    }
}
