//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use justcakes_core::CommerceError;
use justcakes_store::StoreError;

use crate::stripe::StripeError;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unauthorized - missing or invalid credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Request failed domain validation.
    #[error("validation failed: {0}")]
    Validation(#[from] CommerceError),

    /// Conflict - invalid state transition or concurrent update.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// External service error.
    #[error("external service error: {0}")]
    ExternalService(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                self.to_string(),
                None,
            ),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone(), None),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone(), None),
            Self::Validation(err) => validation_parts(err),
            Self::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone(), None),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            Self::ExternalService(msg) => {
                tracing::error!(error = %msg, "External service error");
                (
                    StatusCode::BAD_GATEWAY,
                    "external_service_error",
                    "The payment provider could not be reached, please try again".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

fn validation_parts(
    err: &CommerceError,
) -> (StatusCode, &'static str, String, Option<serde_json::Value>) {
    match err {
        CommerceError::InvalidTransition { from, to } => (
            StatusCode::CONFLICT,
            "invalid_transition",
            err.to_string(),
            Some(serde_json::json!({ "from": from, "to": to })),
        ),
        CommerceError::DeliveryTooSoon { earliest } => (
            StatusCode::BAD_REQUEST,
            "delivery_too_soon",
            err.to_string(),
            Some(serde_json::json!({ "earliest": earliest })),
        ),
        CommerceError::InvalidQuantity { item_id }
        | CommerceError::InvalidPrice { item_id }
        | CommerceError::UnavailableProduct { item_id } => (
            StatusCode::BAD_REQUEST,
            "validation_error",
            err.to_string(),
            Some(serde_json::json!({ "itemId": item_id })),
        ),
        _ => (
            StatusCode::BAD_REQUEST,
            "validation_error",
            err.to_string(),
            None,
        ),
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => Self::NotFound(format!("{entity} not found: {id}")),
            StoreError::Conflict(msg) => Self::Conflict(msg),
            StoreError::Rejected(err) => Self::Validation(err),
            StoreError::Database(msg) | StoreError::Serialization(msg) => Self::Internal(msg),
        }
    }
}

impl From<StripeError> for ApiError {
    fn from(err: StripeError) -> Self {
        match err {
            StripeError::Configuration(msg) => Self::Internal(msg),
            other => Self::ExternalService(other.to_string()),
        }
    }
}
