//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{admin, checkout, health, orders, products, quotes, webhooks};
use crate::state::AppState;

/// Maximum concurrent requests for the public and admin API.
const API_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
/// - `GET /v1/products` - List available products
/// - `GET /v1/products/:id` - Get one product
/// - `POST /v1/checkout` - Create a checkout session
/// - `POST /v1/quote-requests` - Email a custom quote request to the business
///
/// ## Admin (session cookie or Bearer token)
/// - `POST /v1/admin/auth` - Log in
/// - `GET /v1/admin/auth` - Check the session
/// - `DELETE /v1/admin/auth` - Log out
/// - `GET /v1/admin/orders` - List orders, optionally by `?status=`
/// - `GET /v1/admin/orders/summary` - Order counts and paid revenue
/// - `GET /v1/admin/orders/:id` - Get one order
/// - `PATCH /v1/admin/orders/:id` - Update fulfillment status, tracking or notes
///
/// ## Webhooks (Signature verification)
/// - `POST /webhooks/stripe` - Stripe webhooks
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    let admin_routes = Router::new()
        .route(
            "/auth",
            post(admin::login).get(admin::status).delete(admin::logout),
        )
        .route("/orders", get(orders::list_orders))
        .route("/orders/summary", get(orders::order_summary))
        .route(
            "/orders/:id",
            get(orders::get_order).patch(orders::update_order),
        );

    let api_routes = Router::new()
        .route("/products", get(products::list_products))
        .route("/products/:id", get(products::get_product))
        .route("/checkout", post(checkout::create_checkout))
        .route("/quote-requests", post(quotes::request_quote))
        .nest("/admin", admin_routes)
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS));

    Router::new()
        // Health (public, no rate limit)
        .route("/health", get(health::health))
        // API v1 routes (rate limited)
        .nest("/v1", api_routes)
        // Webhooks (no rate limit - controlled by the provider)
        .route("/webhooks/stripe", post(webhooks::stripe_webhook))
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
