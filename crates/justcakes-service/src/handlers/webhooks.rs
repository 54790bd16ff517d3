//! Stripe webhook endpoint.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::lifecycle::LifecycleOutcome;
use crate::state::AppState;
use crate::stripe::types::Event;
use crate::stripe::{verify_signature, PaymentEvent, SIGNATURE_HEADER};

/// Webhook response.
#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookResponse {
    /// Whether the webhook was processed.
    pub received: bool,
}

/// Handle Stripe webhooks.
///
/// The body is taken as raw bytes because the signature covers the exact payload.
/// Nothing is parsed or stored until the signature checks out.
pub async fn stripe_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, ApiError> {
    let secret = state.config.stripe_webhook_secret.as_deref().ok_or_else(|| {
        ApiError::Internal("Stripe webhook secret not configured".into())
    })?;

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            tracing::warn!("Stripe webhook without signature header");
            ApiError::BadRequest("Missing Stripe signature".into())
        })?;

    verify_signature(
        &body,
        signature,
        secret,
        state.config.webhook_tolerance_seconds,
        Utc::now().timestamp(),
    )
    .map_err(|e| {
        tracing::warn!(error = %e, "Invalid Stripe webhook signature");
        ApiError::BadRequest("Invalid webhook signature".into())
    })?;

    let event: Event =
        serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    tracing::info!(
        event_type = %event.event_type,
        event_id = %event.id,
        "Received Stripe webhook"
    );

    let event_id = event.id.clone();
    let payment_event = PaymentEvent::from_event(event).map_err(|e| {
        tracing::warn!(event_id = %event_id, error = %e, "Malformed Stripe event object");
        ApiError::BadRequest(e.to_string())
    })?;

    let outcome = state.lifecycle().apply(payment_event).await.map_err(|e| {
        tracing::error!(event_id = %event_id, error = %e, "Failed to apply Stripe event");
        ApiError::Internal(e.to_string())
    })?;

    if let LifecycleOutcome::Created(order) = &outcome {
        tracing::debug!(event_id = %event_id, order_id = %order.id, "Webhook created order");
    }

    Ok(Json(WebhookResponse { received: true }))
}
