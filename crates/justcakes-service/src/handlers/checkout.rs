//! Checkout session creation.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use justcakes_core::{
    price_lines, validate_delivery_date, CheckoutItem, CommerceError, OrderItem, PricedLine,
};

use crate::error::ApiError;
use crate::lifecycle::{CART_ITEMS_KEY, DELIVERY_DATE_KEY};
use crate::state::AppState;
use crate::stripe::{CheckoutLineItem, NewCheckoutSession};

/// Largest metadata value the provider stores.
pub const METADATA_VALUE_LIMIT: usize = 500;

/// Request body for `POST /v1/checkout`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    /// Cart lines.
    pub items: Vec<CheckoutItem>,
    /// Requested delivery date, `YYYY-MM-DD`.
    #[serde(default)]
    pub delivery_date: Option<String>,
}

/// Response for `POST /v1/checkout`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    /// Provider session ID.
    pub session_id: String,
    /// Hosted checkout page to redirect to.
    pub url: String,
}

/// `POST /v1/checkout`
///
/// Validates the cart, then asks the provider for a hosted payment session. The cart
/// projection and delivery date ride along as session metadata and come back on the
/// completion webhook.
pub async fn create_checkout(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let lines = price_lines(&req.items)?;

    for line in &lines {
        if let Some(product) = state.catalog.get_product(line.id.as_str()) {
            if !product.available {
                return Err(CommerceError::UnavailableProduct {
                    item_id: line.id.to_string(),
                }
                .into());
            }
        }
    }

    let delivery_date = req
        .delivery_date
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(|raw| {
            validate_delivery_date(
                raw,
                Utc::now().date_naive(),
                state.config.min_delivery_lead_days,
            )
        })
        .transpose()?;

    let stripe = state
        .stripe
        .as_ref()
        .ok_or_else(|| ApiError::Internal("Stripe not configured".into()))?;

    let mut metadata = vec![(CART_ITEMS_KEY.to_string(), cart_metadata(&lines)?)];
    if let Some(date) = delivery_date {
        metadata.push((DELIVERY_DATE_KEY.to_string(), date.format("%Y-%m-%d").to_string()));
    }

    let params = NewCheckoutSession {
        currency: state.config.store_currency.clone(),
        line_items: lines
            .iter()
            .map(|line| CheckoutLineItem {
                name: line.name.clone(),
                description: line.description.clone(),
                images: line
                    .image
                    .iter()
                    .map(|image| state.config.image_url(image))
                    .collect(),
                unit_amount: line.unit_amount,
                quantity: line.quantity,
            })
            .collect(),
        success_url: state.config.success_url(),
        cancel_url: state.config.cancel_url(),
        allowed_countries: state.config.shipping_countries.clone(),
        metadata,
    };

    let session = stripe.create_checkout_session(&params).await?;
    let url = session
        .url
        .ok_or_else(|| ApiError::ExternalService("checkout session has no URL".into()))?;

    tracing::info!(
        session_id = %session.id,
        line_items = lines.len(),
        amount = lines.iter().map(PricedLine::line_amount).sum::<i64>(),
        delivery_date = ?delivery_date,
        "Created checkout session"
    );

    Ok(Json(CheckoutResponse {
        session_id: session.id,
        url,
    }))
}

/// Serialize the `{id, name, quantity, price}` projection stored in session metadata.
fn cart_metadata(lines: &[PricedLine]) -> Result<String, ApiError> {
    let items: Vec<OrderItem> = lines.iter().map(OrderItem::from).collect();
    let json = serde_json::to_string(&items)
        .map_err(|e| ApiError::Internal(format!("failed to serialize cart: {e}")))?;

    if json.chars().count() > METADATA_VALUE_LIMIT {
        tracing::warn!(
            length = json.chars().count(),
            limit = METADATA_VALUE_LIMIT,
            "Cart metadata exceeds the provider's value limit"
        );
    }
    Ok(json)
}
