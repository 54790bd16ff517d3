//! Just Cakes order service - HTTP API for checkout, payment webhooks and admin orders.
//!
//! This is the main entry point for the service.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use justcakes_core::{seed::seed_catalog, Catalog, StaticCatalog};
use justcakes_service::{create_router, AppState, ServiceConfig};
use justcakes_store::{MemoryStore, PgStore, Store};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,justcakes=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Just Cakes order service");

    // Load configuration from environment
    let config = ServiceConfig::from_env();

    tracing::info!(
        listen_addr = %config.listen_addr,
        site_base_url = %config.site_base_url,
        currency = %config.store_currency,
        database_configured = %config.database_url.is_some(),
        stripe_configured = %config.stripe_api_key.is_some(),
        email_configured = %config.email_api_key.is_some(),
        "Service configuration loaded"
    );

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => {
            tracing::info!("Connecting to PostgreSQL");
            Arc::new(PgStore::connect(url).await?)
        }
        None => {
            tracing::warn!("DATABASE_URL not set - orders are kept in memory and lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let catalog: Arc<dyn Catalog> = match &config.catalog_path {
        Some(path) => {
            let json = tokio::fs::read_to_string(path).await?;
            let catalog = StaticCatalog::from_json(&json)?;
            tracing::info!(path = %path, products = catalog.len(), "Loaded catalog from file");
            Arc::new(catalog)
        }
        None => {
            let catalog = seed_catalog();
            tracing::info!(products = catalog.len(), "Using built-in catalog");
            Arc::new(catalog)
        }
    };

    // Build app state
    let state = AppState::new(store, catalog, config.clone());

    // Create the router
    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    // Start HTTP server
    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
