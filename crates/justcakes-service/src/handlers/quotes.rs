//! Custom quote requests.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use justcakes_core::QuoteRequest;

use crate::error::ApiError;
use crate::notifications::SendOutcome;
use crate::state::AppState;

/// Response for `POST /v1/quote-requests`.
#[derive(Debug, Serialize, Deserialize)]
pub struct QuoteResponse {
    /// Whether the request reached the business.
    pub success: bool,
    /// Human-readable result.
    pub message: String,
}

/// `POST /v1/quote-requests`
///
/// Validates the request and emails it to the business. Nothing is stored, so a send
/// that cannot happen is an error rather than a silent success.
pub async fn request_quote(
    State(state): State<Arc<AppState>>,
    Json(quote): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, ApiError> {
    quote.validate()?;

    match state.notifier.quote_requested(&quote, Utc::now()).await {
        SendOutcome::Sent => Ok(Json(QuoteResponse {
            success: true,
            message: "Quote request sent successfully".into(),
        })),
        SendOutcome::Skipped(reason) => Err(ApiError::Internal(format!(
            "quote request not sent: {reason}"
        ))),
        SendOutcome::Failed(e) => Err(ApiError::Internal(format!(
            "quote request email failed: {e}"
        ))),
    }
}
