#![allow(clippy::unwrap_used)]

//! Collector, estimator and reporter behaviour through the public API.

use std::sync::Arc;
use std::time::Duration;

use rpc_observatory::metrics::{MetricsCollector, Outcome, SnapshotReporter, UNKNOWN_METHOD};
use rpc_observatory::observer::{CallMetadata, CallObserver, MemorySink};
use tokio::sync::watch;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

#[test]
fn counts_match_call_sequence() {
    let collector = MetricsCollector::new(4);
    let outcomes = [
        Outcome::Ok,
        Outcome::NotFound,
        Outcome::Ok,
        Outcome::Unavailable,
        Outcome::Ok,
        Outcome::Ok,
        Outcome::Internal,
    ];
    for (i, outcome) in outcomes.iter().enumerate() {
        collector.record_rpc("/svc/Method", *outcome, ms(i as u64));
    }

    let snapshot = collector.snapshot();
    let m = snapshot.method("/svc/Method").unwrap();
    assert_eq!(m.request_count, 7);
    assert_eq!(m.error_count, 3);
    assert_eq!(m.error_rate, 3.0 / 7.0);
    // Window holds 3,4,5,6 → rank ceil(3.8) = 4
    assert_eq!(m.p95_latency_ms, 6.0);
}

#[test]
fn capacity_three_window() {
    let collector = MetricsCollector::new(3);
    for v in [10, 20, 30, 40] {
        collector.record_rpc("m", Outcome::Ok, ms(v));
    }
    assert_eq!(collector.snapshot().methods[0].p95_latency_ms, 40.0);

    // Feeding small values pushes the 40 out of the window.
    for v in [1, 2, 3] {
        collector.record_rpc("m", Outcome::Ok, ms(v));
    }
    assert_eq!(collector.snapshot().methods[0].p95_latency_ms, 3.0);
}

#[test]
fn one_error_in_five_is_exactly_a_fifth() {
    let collector = MetricsCollector::default();
    for i in 0..5 {
        let outcome = if i == 2 { Outcome::Aborted } else { Outcome::Ok };
        collector.record_rpc("m", outcome, ms(10 * (i + 1)));
    }
    let m = &collector.snapshot().methods[0];
    assert_eq!(m.error_rate, 0.2);
    assert_eq!(m.p95_latency_ms, 50.0);
}

#[test]
fn sorted_and_normalized() {
    let collector = MetricsCollector::default();
    collector.record_rpc("  /b/Call ", Outcome::Ok, ms(1));
    collector.record_rpc("", Outcome::Ok, ms(1));
    collector.record_rpc("/a/Call", Outcome::Ok, ms(1));
    collector.record_rpc("/b/Call", Outcome::Ok, ms(1));

    let snapshot = collector.snapshot();
    let names: Vec<&str> = snapshot.methods.iter().map(|m| m.method.as_str()).collect();
    assert_eq!(names, vec!["/a/Call", "/b/Call", UNKNOWN_METHOD]);
    assert_eq!(snapshot.method("/b/Call").unwrap().request_count, 2);
}

#[tokio::test(start_paused = true)]
async fn observer_feeds_reporter() {
    let collector = Arc::new(MetricsCollector::new(16));
    let access = Arc::new(MemorySink::new());
    let reports = Arc::new(MemorySink::new());
    let observer = CallObserver::new(Some(Arc::clone(&collector)), access.clone());
    let reporter = SnapshotReporter::new(Some(Arc::clone(&collector)), reports.clone());

    let (tx, rx) = watch::channel(false);
    let task = tokio::spawn(async move { reporter.run(rx, Duration::from_millis(300)).await });

    let meta = CallMetadata::new().with_request_id("corr-1");
    for _ in 0..4 {
        let _: Result<(), Outcome> = observer
            .observe(Some("/quiz.v1.QuizService/Answer"), &meta, || async {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok(())
            })
            .await;
    }
    assert_eq!(access.len(), 4);

    // First tick lands at 300ms, the next one not before 600ms.
    tokio::time::sleep(Duration::from_millis(450)).await;
    tx.send(true).unwrap();
    task.await.unwrap();

    let lines = reports.lines();
    assert_eq!(lines.len(), 1);
    let record: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(record["type"], "metrics-snapshot");
    assert_eq!(record["metrics"][0]["method"], "/quiz.v1.QuizService/Answer");
    assert_eq!(record["metrics"][0]["requestCount"], 4);
    // Latency is wall-clock time, which the paused clock does not advance.
    assert!(record["metrics"][0]["p95LatencyMs"].as_f64().unwrap() >= 0.0);
}
