pub mod load;
pub mod products;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::metrics::{Classify, Outcome};

// ─── GET /api/ping ───────────────────────────────────────────────

pub async fn ping() -> &'static str {
    "pong"
}

// ─── Unified error type ──────────────────────────────────────────

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
    AlreadyRunning,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::AlreadyRunning => StatusCode::CONFLICT,
        }
    }
}

impl Classify for AppError {
    fn outcome(&self) -> Outcome {
        match self {
            Self::NotFound(_) => Outcome::NotFound,
            Self::BadRequest(_) => Outcome::InvalidArgument,
            Self::Internal(_) => Outcome::Internal,
            Self::AlreadyRunning => Outcome::FailedPrecondition,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::NotFound(msg) | Self::BadRequest(msg) | Self::Internal(msg) => msg,
            Self::AlreadyRunning => "Load generator already running".into(),
        };

        let body = serde_json::json!({
            "error":  message,
            "status": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}
