//! HTTP error type and its JSON response mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::model::PayloadError;
use crate::proof::SubmissionError;

/// Errors surfaced by the HTTP layer.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error("Stored payload unreadable: {0}")]
    Payload(#[from] PayloadError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, code) = match &self {
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Submission(SubmissionError::Expired { .. }) => {
                (StatusCode::UNAUTHORIZED, "CHALLENGE_EXPIRED")
            }
            AppError::Submission(SubmissionError::BadSignature(_)) => {
                (StatusCode::UNAUTHORIZED, "BAD_SIGNATURE")
            }
            AppError::Submission(SubmissionError::MalformedChallenge(_)) => {
                (StatusCode::BAD_REQUEST, "MALFORMED_CHALLENGE")
            }
            AppError::Submission(SubmissionError::LedgerRejected(_)) => {
                (StatusCode::CONFLICT, "LEDGER_REJECTED")
            }
            AppError::Payload(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CORRUPT_PAYLOAD"),
        };

        let body = Json(json!({
            "error": code,
            "message": message,
        }));

        (status, body).into_response()
    }
}
