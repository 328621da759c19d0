//! PhonePe statement upload.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use expensa_core::{ExpenseCandidate, IngestionResult, PaymentMethod};

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Multipart field carrying the statement.
pub const PDF_FIELD: &str = "pdf_file";

/// A saved expense as reported to the uploader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedTransaction {
    pub merchant_name: String,
    /// Two-decimal rupee amount, e.g. `"450.00"`.
    pub amount: String,
    pub transaction_date: NaiveDate,
    pub payment_method: PaymentMethod,
    pub category: String,
}

impl From<&ExpenseCandidate> for SavedTransaction {
    fn from(candidate: &ExpenseCandidate) -> Self {
        Self {
            merchant_name: candidate.merchant_name().to_string(),
            amount: format!("{:.2}", candidate.amount()),
            transaction_date: candidate.date(),
            payment_method: candidate.payment_method(),
            category: candidate.category.clone(),
        }
    }
}

/// Successful upload response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub total_extracted: usize,
    pub total_saved: usize,
    pub transactions: Vec<SavedTransaction>,
}

impl From<IngestionResult> for UploadResponse {
    fn from(result: IngestionResult) -> Self {
        Self {
            message: format!("Successfully processed {} transactions", result.total_saved),
            total_extracted: result.total_extracted,
            total_saved: result.total_saved,
            transactions: result.saved.iter().map(SavedTransaction::from).collect(),
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/phonepe/upload/", post(upload_statement))
}

/// POST /api/phonepe/upload/
async fn upload_statement(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let mut multipart = multipart
        .map_err(|_| AppError::BadRequest("Expected a multipart/form-data upload".to_string()))?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(PDF_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(multipart_error)?;
        upload = Some((file_name, data));
    }

    let (file_name, data) =
        upload.ok_or_else(|| AppError::BadRequest("No PDF file provided".to_string()))?;
    if !file_name.to_lowercase().ends_with(".pdf") {
        return Err(AppError::BadRequest("File must be a PDF".to_string()));
    }

    tracing::info!(user = %user, file = %file_name, bytes = data.len(), "statement upload");

    let result = tokio::task::spawn_blocking(move || state.ingest(&data, user))
        .await
        .map_err(|e| AppError::Internal(format!("ingestion task failed: {}", e)))??;

    Ok((StatusCode::CREATED, Json(result.into())))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Uploaded file is too large".to_string())
    } else {
        AppError::BadRequest(err.body_text())
    }
}
