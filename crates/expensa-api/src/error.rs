//! API error type.
//!
//! Every failure is answered with a JSON body `{"error": "<message>"}`.
//! Internal error details are logged but never returned to clients.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use expensa_core::IngestError;

/// JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Application-level error type that implements [`IntoResponse`] for axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// The upload is missing, not a PDF, or holds no transactions (400).
    #[error("{0}")]
    BadRequest(String),

    /// Missing or unknown bearer token (401).
    #[error("{0}")]
    Unauthorized(String),

    /// Request body above the configured upload limit (413).
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Pipeline or store failure (500). Message is logged only.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::UnreadablePdf(e) => Self::BadRequest(format!("Could not read PDF: {}", e)),
            IngestError::NoTransactions => Self::BadRequest(
                "No transactions found in the PDF. Please ensure the PDF contains transaction data in a recognizable format.".to_string(),
            ),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self {
            Self::Internal(_) => {
                tracing::error!(error = %self, "internal server error");
                "An internal error occurred".to_string()
            }
            other => {
                tracing::debug!(error = %other, status = %status, "request rejected");
                other.to_string()
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
