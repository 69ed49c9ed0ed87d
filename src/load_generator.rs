use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::metrics::Outcome;
use crate::observer::{CallMetadata, CallObserver};

// ─── Synthetic RPC surface ───────────────────────────────────────

static METHODS: &[&str] = &[
    "/catalog.v1.ProductService/GetProduct",
    "/catalog.v1.ProductService/ListProducts",
    "/orders.v1.OrderService/CreateOrder",
    "/users.v1.UserService/GetProfile",
];

static ERRORS: &[Outcome] = &[
    Outcome::Internal,
    Outcome::Unavailable,
    Outcome::DeadlineExceeded,
    Outcome::NotFound,
];

/// Upper bound on concurrent workers for one run.
pub const MAX_CONCURRENCY: u32 = 500;

/// Upper bound on the length of one run, in seconds.
pub const MAX_DURATION_SECS: u64 = 300;

/// Parameters of one synthetic load run.
#[derive(Debug, Clone, Copy)]
pub struct LoadProfile {
    pub concurrency: u32,
    pub duration: Duration,
    /// Percentage of calls that fail (0–100).
    pub error_pct: u8,
}

// ─── Public entry point ──────────────────────────────────────────

/// Spawns `concurrency` Tokio tasks that push synthetic calls through the
/// observer until the deadline or the `running` flag is set to false.
pub async fn run(running: Arc<AtomicBool>, observer: CallObserver, profile: LoadProfile) {
    let deadline = Instant::now() + profile.duration;

    let mut handles = Vec::with_capacity(profile.concurrency as usize);

    for worker_id in 0..profile.concurrency {
        let running = running.clone();
        let observer = observer.clone();

        handles.push(tokio::spawn(async move {
            worker(worker_id, running, observer, deadline, profile.error_pct).await;
        }));
    }

    for h in handles {
        if let Err(e) = h.await {
            tracing::warn!(error = %e, "load worker failed");
        }
    }

    running.store(false, Ordering::SeqCst);
    tracing::info!("load generator finished");
}

// ─── Worker loop ─────────────────────────────────────────────────

async fn worker(
    id: u32,
    running: Arc<AtomicBool>,
    observer: CallObserver,
    deadline: Instant,
    error_pct: u8,
) {
    // Each worker gets its own deterministic RNG seeded uniquely.
    let mut rng = StdRng::seed_from_u64(1000 + id as u64);

    while running.load(Ordering::Relaxed) && Instant::now() < deadline {
        let method = METHODS[rng.gen_range(0..METHODS.len())];
        let latency = synthetic_latency(&mut rng);
        let outcome = if rng.gen_range(0u8..100) < error_pct {
            ERRORS[rng.gen_range(0..ERRORS.len())]
        } else {
            Outcome::Ok
        };
        let meta = CallMetadata::new()
            .with_request_id(uuid::Uuid::new_v4().to_string())
            .with_user_id(format!("usr_{:08}", rng.gen_range(1..=10_000u32)));

        observer
            .observe(Some(method), &meta, || async move {
                tokio::time::sleep(latency).await;
                outcome
            })
            .await;
    }
}

/// Mostly fast calls with a 2 % slow tail.
fn synthetic_latency(rng: &mut StdRng) -> Duration {
    let micros = if rng.gen_bool(0.02) {
        rng.gen_range(100_000..=300_000u64)
    } else {
        rng.gen_range(500..=25_000u64)
    };
    Duration::from_micros(micros)
}
