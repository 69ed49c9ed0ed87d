use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use crate::load_generator::{LoadProfile, MAX_CONCURRENCY, MAX_DURATION_SECS};
use crate::AppState;

use super::AppError;

// ─── Request / response types ────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct LoadConfig {
    /// Number of concurrent Tokio tasks generating calls
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// How long the run lasts (seconds)
    #[serde(default = "default_duration")]
    pub duration_secs: u64,

    /// Percentage of calls that fail (0–100)
    #[serde(default = "default_error_pct")]
    pub error_pct: u8,
}

fn default_concurrency() -> u32 {
    10
}
fn default_duration() -> u64 {
    30
}
fn default_error_pct() -> u8 {
    5
}

#[derive(Debug, Serialize)]
pub struct LoadStatus {
    pub running: bool,
    pub message: String,
}

// ─── POST /api/load/start ────────────────────────────────────────

pub async fn start_load(
    State(state): State<Arc<AppState>>,
    Json(config): Json<LoadConfig>,
) -> Result<Json<LoadStatus>, AppError> {
    if !(1..=MAX_CONCURRENCY).contains(&config.concurrency) {
        return Err(AppError::BadRequest(format!(
            "concurrency must be between 1 and {MAX_CONCURRENCY}"
        )));
    }
    if !(1..=MAX_DURATION_SECS).contains(&config.duration_secs) {
        return Err(AppError::BadRequest(format!(
            "duration_secs must be between 1 and {MAX_DURATION_SECS}"
        )));
    }
    if config.error_pct > 100 {
        return Err(AppError::BadRequest(
            "error_pct must be between 0 and 100".into(),
        ));
    }

    let profile = LoadProfile {
        concurrency: config.concurrency,
        duration: Duration::from_secs(config.duration_secs),
        error_pct: config.error_pct,
    };
    if !state.start_load(profile).await {
        return Err(AppError::AlreadyRunning);
    }

    Ok(Json(LoadStatus {
        running: true,
        message: format!(
            "Started: {} workers × {}s, {}% errors",
            config.concurrency, config.duration_secs, config.error_pct,
        ),
    }))
}

// ─── POST /api/load/stop ─────────────────────────────────────────

pub async fn stop_load(State(state): State<Arc<AppState>>) -> Json<LoadStatus> {
    let message = if state.stop_load().await {
        "Load generator stopped"
    } else {
        "No load generator is running"
    };

    Json(LoadStatus {
        running: false,
        message: message.into(),
    })
}

// ─── GET /api/load/status ────────────────────────────────────────

pub async fn load_status(State(state): State<Arc<AppState>>) -> Json<LoadStatus> {
    let running = state.load_running.load(Ordering::SeqCst);
    Json(LoadStatus {
        running,
        message: if running {
            "Load in progress".into()
        } else {
            "Idle".into()
        },
    })
}
