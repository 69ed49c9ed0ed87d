use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

use rpc_observatory::load_generator::LoadProfile;
use rpc_observatory::{config, server, AppState};

#[tokio::main]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // ── 1. Config ────────────────────────────────────────────────
    let cfg = match config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(error = %e, "config load failed");
            return ExitCode::FAILURE;
        }
    };
    let listen: SocketAddr = match cfg.listen.parse() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!(listen = %cfg.listen, error = %e, "listen must be a valid SocketAddr");
            return ExitCode::FAILURE;
        }
    };

    // ── 2. Shared state + background reporter ────────────────────
    let state = Arc::new(AppState::new(cfg.clone()));
    let reporter = state.reporter().spawn(cfg.report_interval());

    if cfg.load_workers > 0 {
        state
            .start_load(LoadProfile {
                concurrency: cfg.load_workers,
                duration: Duration::from_secs(cfg.load_duration_secs),
                error_pct: cfg.load_error_pct,
            })
            .await;
    }

    // ── 3. Serve until Ctrl-C ────────────────────────────────────
    let app = server::create_router(state.clone());
    let listener = match tokio::net::TcpListener::bind(listen).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(%listen, error = %e, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        %listen,
        max_latency_samples = state.collector.capacity(),
        report_interval = ?cfg.report_interval(),
        "rpc-observatory starting"
    );

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "ctrl-c handler failed");
                std::future::pending::<()>().await;
            }
        })
        .await;

    // ── 4. Shutdown ──────────────────────────────────────────────
    state.stop_load().await;
    reporter.shutdown().await;
    tracing::info!("rpc-observatory stopped");

    match served {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "server exited with error");
            ExitCode::FAILURE
        }
    }
}
