//! Process configuration: JSON file plus environment overrides.
//!
//! Unparseable environment values never stop the process; they fall back
//! to the defaults and a warning is logged. Load-generator settings outside
//! the bounds the HTTP API enforces are rejected by `validate`.

use std::fs;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ObservabilityError, Result};
use crate::load_generator::{MAX_CONCURRENCY, MAX_DURATION_SECS};
use crate::metrics::{DEFAULT_MAX_LATENCY_SAMPLES, DEFAULT_REPORT_INTERVAL};

pub const ENV_CONFIG_PATH: &str = "OBSERVATORY_CONFIG";
pub const ENV_LISTEN: &str = "OBSERVATORY_LISTEN";
pub const ENV_MAX_LATENCY_SAMPLES: &str = "OBSERVATORY_MAX_LATENCY_SAMPLES";
pub const ENV_REPORT_INTERVAL_SECONDS: &str = "OBSERVATORY_REPORT_INTERVAL_SECONDS";
pub const ENV_LOAD_WORKERS: &str = "OBSERVATORY_LOAD_WORKERS";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObservatoryConfig {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Latency samples kept per method.
    #[serde(default = "default_max_latency_samples")]
    pub max_latency_samples: usize,

    #[serde(default = "default_report_interval_secs")]
    pub report_interval_secs: u64,

    /// Synthetic load workers started at boot; 0 disables.
    #[serde(default)]
    pub load_workers: u32,

    #[serde(default = "default_load_duration_secs")]
    pub load_duration_secs: u64,

    /// Share of synthetic calls that fail (0–100).
    #[serde(default = "default_load_error_pct")]
    pub load_error_pct: u8,
}

fn default_listen() -> String {
    "0.0.0.0:3000".into()
}
fn default_max_latency_samples() -> usize {
    DEFAULT_MAX_LATENCY_SAMPLES
}
fn default_report_interval_secs() -> u64 {
    DEFAULT_REPORT_INTERVAL.as_secs()
}
fn default_load_duration_secs() -> u64 {
    30
}
fn default_load_error_pct() -> u8 {
    5
}

impl Default for ObservatoryConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            max_latency_samples: default_max_latency_samples(),
            report_interval_secs: default_report_interval_secs(),
            load_workers: 0,
            load_duration_secs: default_load_duration_secs(),
            load_error_pct: default_load_error_pct(),
        }
    }
}

impl ObservatoryConfig {
    /// Window capacity, with 0 corrected to the default.
    pub fn max_latency_samples(&self) -> usize {
        if self.max_latency_samples == 0 {
            DEFAULT_MAX_LATENCY_SAMPLES
        } else {
            self.max_latency_samples
        }
    }

    /// Reporting period, with 0 corrected to the default.
    pub fn report_interval(&self) -> Duration {
        if self.report_interval_secs == 0 {
            DEFAULT_REPORT_INTERVAL
        } else {
            Duration::from_secs(self.report_interval_secs)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.load_error_pct > 100 {
            return Err(ObservabilityError::Config(
                "load_error_pct must be between 0 and 100".into(),
            ));
        }
        if self.load_workers > MAX_CONCURRENCY {
            return Err(ObservabilityError::Config(format!(
                "load_workers must be between 0 and {MAX_CONCURRENCY}"
            )));
        }
        if !(1..=MAX_DURATION_SECS).contains(&self.load_duration_secs) {
            return Err(ObservabilityError::Config(format!(
                "load_duration_secs must be between 1 and {MAX_DURATION_SECS}"
            )));
        }
        if self.listen.trim().is_empty() {
            return Err(ObservabilityError::Config("listen must not be empty".into()));
        }
        Ok(())
    }

    /// Override fields from `OBSERVATORY_*` variables.
    pub fn apply_env(&mut self) {
        self.apply_vars(|name| std::env::var(name).ok());
    }

    fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(listen) = lookup(ENV_LISTEN).filter(|v| !v.trim().is_empty()) {
            self.listen = listen;
        }
        if let Some(v) = positive(ENV_MAX_LATENCY_SAMPLES, lookup(ENV_MAX_LATENCY_SAMPLES)) {
            self.max_latency_samples = v as usize;
        }
        if let Some(v) = positive(ENV_REPORT_INTERVAL_SECONDS, lookup(ENV_REPORT_INTERVAL_SECONDS)) {
            self.report_interval_secs = v;
        }
        if let Some(v) = lookup(ENV_LOAD_WORKERS) {
            match v.trim().parse::<u32>() {
                Ok(n) => self.load_workers = n,
                Err(e) => tracing::warn!(var = ENV_LOAD_WORKERS, value = %v, error = %e, "ignoring invalid value"),
            }
        }
    }
}

/// Parse a strictly positive integer; anything else is ignored with a warning.
fn positive(var: &str, raw: Option<String>) -> Option<u64> {
    let raw = raw?;
    if raw.is_empty() {
        return None;
    }
    match raw.trim().parse::<i64>() {
        Ok(n) if n > 0 => Some(n as u64),
        _ => {
            tracing::warn!(var, value = %raw, "expected a positive integer, keeping default");
            None
        }
    }
}

pub fn load_from_file(path: &str) -> Result<ObservatoryConfig> {
    let s = fs::read_to_string(path)?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ObservatoryConfig> {
    let cfg: ObservatoryConfig = serde_json::from_str(s)
        .map_err(|e| ObservabilityError::Config(format!("invalid json: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Config file named by `OBSERVATORY_CONFIG` (or defaults), then env
/// overrides, validated once more after the overrides land.
pub fn load() -> Result<ObservatoryConfig> {
    let mut cfg = match std::env::var(ENV_CONFIG_PATH) {
        Ok(path) if !path.is_empty() => load_from_file(&path)?,
        _ => ObservatoryConfig::default(),
    };
    cfg.apply_env();
    cfg.validate()?;
    Ok(cfg)
}
