use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;

use crate::observer::CallMetadata;
use crate::AppState;

const METRICS_PATH_PREFIX: &str = "/api/metrics";

/// Axum middleware that runs every routed request through the
/// `CallObserver` and adds two response headers:
///
///   X-Response-Time-Us  — total handler wall time in microseconds
///   Server-Timing       — same value in the standard Server-Timing format
///
/// The method id is `"<VERB> <route>"`; requests that matched no route
/// are aggregated under `unknown`. The metrics endpoints themselves are
/// not observed.
pub async fn observe_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    if req.uri().path().starts_with(METRICS_PATH_PREFIX) {
        return next.run(req).await;
    }

    let method = rpc_method(&req);
    let meta = CallMetadata::from_headers(req.headers());

    let start = Instant::now();
    let mut response = state
        .observer
        .observe(method.as_deref(), &meta, || next.run(req))
        .await;
    let elapsed = start.elapsed();

    // ── Inject response headers ─────────────────────────────────
    if let Ok(val) = elapsed.as_micros().to_string().parse() {
        response.headers_mut().insert("X-Response-Time-Us", val);
    }

    let server_timing = format!("total;dur={:.3}", elapsed.as_secs_f64() * 1000.0);
    if let Ok(val) = server_timing.parse() {
        response.headers_mut().insert("Server-Timing", val);
    }

    response
}

fn rpc_method(req: &Request) -> Option<String> {
    req.extensions()
        .get::<MatchedPath>()
        .map(|path| format!("{} {}", req.method(), path.as_str()))
}
