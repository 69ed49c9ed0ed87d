use std::fmt;

use axum::http::StatusCode;
use axum::response::Response;

// ─── Outcome codes ───────────────────────────────────────────────

/// Completion status of a single RPC, using the canonical RPC status
/// vocabulary. Everything except `Ok` counts as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Ok,
    Canceled,
    Unknown,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    ResourceExhausted,
    FailedPrecondition,
    Aborted,
    OutOfRange,
    Unimplemented,
    Internal,
    Unavailable,
    DataLoss,
    Unauthenticated,
}

impl Outcome {
    /// Whether this outcome increments the error counter.
    pub fn is_error(self) -> bool {
        self != Outcome::Ok
    }

    /// Canonical name, used as the `status` field of access records.
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Ok => "OK",
            Outcome::Canceled => "Canceled",
            Outcome::Unknown => "Unknown",
            Outcome::InvalidArgument => "InvalidArgument",
            Outcome::DeadlineExceeded => "DeadlineExceeded",
            Outcome::NotFound => "NotFound",
            Outcome::AlreadyExists => "AlreadyExists",
            Outcome::PermissionDenied => "PermissionDenied",
            Outcome::ResourceExhausted => "ResourceExhausted",
            Outcome::FailedPrecondition => "FailedPrecondition",
            Outcome::Aborted => "Aborted",
            Outcome::OutOfRange => "OutOfRange",
            Outcome::Unimplemented => "Unimplemented",
            Outcome::Internal => "Internal",
            Outcome::Unavailable => "Unavailable",
            Outcome::DataLoss => "DataLoss",
            Outcome::Unauthenticated => "Unauthenticated",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<StatusCode> for Outcome {
    fn from(status: StatusCode) -> Self {
        match status.as_u16() {
            400 => Outcome::InvalidArgument,
            401 => Outcome::Unauthenticated,
            403 => Outcome::PermissionDenied,
            404 => Outcome::NotFound,
            408 | 504 => Outcome::DeadlineExceeded,
            409 => Outcome::AlreadyExists,
            412 => Outcome::FailedPrecondition,
            429 => Outcome::ResourceExhausted,
            499 => Outcome::Canceled,
            501 => Outcome::Unimplemented,
            503 => Outcome::Unavailable,
            400..=499 => Outcome::FailedPrecondition,
            500..=599 => Outcome::Internal,
            _ => Outcome::Ok,
        }
    }
}

// ─── Classification ──────────────────────────────────────────────

/// Anything a handler can return that knows how its call ended.
pub trait Classify {
    fn outcome(&self) -> Outcome;
}

impl Classify for Outcome {
    fn outcome(&self) -> Outcome {
        *self
    }
}

impl Classify for StatusCode {
    fn outcome(&self) -> Outcome {
        Outcome::from(*self)
    }
}

impl Classify for Response {
    fn outcome(&self) -> Outcome {
        Outcome::from(self.status())
    }
}

impl<T, E: Classify> Classify for Result<T, E> {
    fn outcome(&self) -> Outcome {
        match self {
            Ok(_) => Outcome::Ok,
            Err(e) => e.outcome(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_ok_is_success() {
        assert!(!Outcome::Ok.is_error());
        assert!(Outcome::Internal.is_error());
        assert!(Outcome::Canceled.is_error());
        assert_eq!(Outcome::Ok.as_str(), "OK");
        assert_eq!(Outcome::Unauthenticated.to_string(), "Unauthenticated");
    }

    #[test]
    fn http_statuses_map_onto_outcomes() {
        assert_eq!(Outcome::from(StatusCode::OK), Outcome::Ok);
        assert_eq!(Outcome::from(StatusCode::NO_CONTENT), Outcome::Ok);
        assert_eq!(Outcome::from(StatusCode::FOUND), Outcome::Ok);
        assert_eq!(Outcome::from(StatusCode::BAD_REQUEST), Outcome::InvalidArgument);
        assert_eq!(Outcome::from(StatusCode::NOT_FOUND), Outcome::NotFound);
        assert_eq!(Outcome::from(StatusCode::IM_A_TEAPOT), Outcome::FailedPrecondition);
        assert_eq!(Outcome::from(StatusCode::GATEWAY_TIMEOUT), Outcome::DeadlineExceeded);
        assert_eq!(Outcome::from(StatusCode::BAD_GATEWAY), Outcome::Internal);
    }

    #[test]
    fn results_classify_by_their_error() {
        let ok: Result<u32, Outcome> = Ok(1);
        let err: Result<u32, Outcome> = Err(Outcome::NotFound);
        assert_eq!(ok.outcome(), Outcome::Ok);
        assert_eq!(err.outcome(), Outcome::NotFound);
    }
}
