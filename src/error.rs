//! Error type shared by record encoding and config loading.
//!
//! None of these reach RPC callers: the engine logs them and carries on.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ObservabilityError>;

#[derive(Debug, Error)]
pub enum ObservabilityError {
    #[error("failed to encode {kind} record: {source}")]
    Encode {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Config(String),
    #[error("read config failed: {0}")]
    Io(#[from] std::io::Error),
}
