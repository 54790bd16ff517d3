//! Admin order views and fulfillment updates.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use justcakes_core::{filter_by_status, Order, OrderId, OrderSummary, StatusFilter};
use justcakes_store::FulfillmentUpdate;

use crate::auth::AdminAuth;
use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for listing orders.
#[derive(Debug, Default, Deserialize)]
pub struct ListOrdersQuery {
    /// Fulfillment status, or `all`.
    #[serde(default)]
    pub status: Option<String>,
}

/// `GET /v1/admin/orders`
///
/// Orders newest first. The status filter is applied over the full list.
pub async fn list_orders(
    _admin: AdminAuth,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let filter: StatusFilter = query.status.as_deref().unwrap_or("all").parse()?;
    let orders = state.store.list_orders().await?;
    Ok(Json(filter_by_status(orders, filter)))
}

/// `GET /v1/admin/orders/summary`
pub async fn order_summary(
    _admin: AdminAuth,
    State(state): State<Arc<AppState>>,
) -> Result<Json<OrderSummary>, ApiError> {
    let orders = state.store.list_orders().await?;
    Ok(Json(OrderSummary::from_orders(
        &orders,
        &state.config.store_currency,
    )))
}

/// `GET /v1/admin/orders/:id`
pub async fn get_order(
    _admin: AdminAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let order_id = parse_order_id(&id)?;
    state
        .store
        .get_order(&order_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("order not found: {id}")))
}

/// `PATCH /v1/admin/orders/:id`
pub async fn update_order(
    admin: AdminAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<FulfillmentUpdate>,
) -> Result<Json<Order>, ApiError> {
    let order_id = parse_order_id(&id)?;
    if update.is_empty() {
        return Err(ApiError::BadRequest("no changes requested".into()));
    }

    let order = state.store.update_fulfillment(&order_id, &update).await?;

    tracing::info!(
        order_id = %order.id,
        status = %order.status,
        issued_at = admin.claims.iat,
        "Order updated by admin"
    );

    Ok(Json(order))
}

fn parse_order_id(raw: &str) -> Result<OrderId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::NotFound(format!("order not found: {raw}")))
}
