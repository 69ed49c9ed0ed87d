use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt;

use super::collector::CollectorSnapshot;
use crate::AppState;

/// Push period of the live snapshot stream.
const STREAM_INTERVAL: Duration = Duration::from_secs(1);

// ─── GET /api/metrics ────────────────────────────────────────────
/// Returns a single JSON snapshot — useful for curl / debugging.

pub async fn get_metrics(State(state): State<Arc<AppState>>) -> Json<CollectorSnapshot> {
    Json(state.snapshot())
}

// ─── GET /api/metrics/stream ─────────────────────────────────────
/// Server-Sent Events endpoint.
/// Pushes a full `CollectorSnapshot` as JSON every second.

pub async fn metrics_stream(
    State(state): State<Arc<AppState>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let interval = tokio::time::interval(STREAM_INTERVAL);

    let stream = IntervalStream::new(interval)
        .filter_map(move |_| snapshot_event(&state.snapshot()).map(Ok::<_, Infallible>));

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// One SSE event per snapshot; a snapshot that fails to encode is skipped.
fn snapshot_event<T: Serialize>(snapshot: &T) -> Option<Event> {
    match serde_json::to_string(snapshot) {
        Ok(json) => Some(Event::default().data(json)),
        Err(e) => {
            tracing::warn!(error = %e, "observability: skipping stream snapshot");
            None
        }
    }
}
