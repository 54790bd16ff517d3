//! Application state.

use std::sync::Arc;

use justcakes_core::Catalog;
use justcakes_store::Store;

use crate::config::ServiceConfig;
use crate::email::{HttpMailer, Mailer};
use crate::lifecycle::OrderLifecycle;
use crate::notifications::NotificationDispatcher;
use crate::stripe::StripeClient;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The order store.
    pub store: Arc<dyn Store>,

    /// Product lookup.
    pub catalog: Arc<dyn Catalog>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// Stripe client for checkout sessions (optional).
    pub stripe: Option<Arc<StripeClient>>,

    /// Order email dispatcher.
    pub notifier: NotificationDispatcher,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, catalog: Arc<dyn Catalog>, config: ServiceConfig) -> Self {
        // Create Stripe client if configured
        let stripe = config.stripe_api_key.as_ref().and_then(|key| {
            match StripeClient::new(key, &config.stripe_api_base) {
                Ok(client) => {
                    tracing::info!("Stripe integration enabled");
                    Some(Arc::new(client))
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create Stripe client");
                    None
                }
            }
        });

        if stripe.is_none() {
            tracing::warn!("Stripe not configured - checkout will not be available");
        }
        if config.stripe_webhook_secret.is_none() {
            tracing::warn!("Stripe webhook secret not configured - webhooks will be rejected");
        }

        // Create email client if configured
        let mailer: Option<Arc<dyn Mailer>> = config.email_api_key.as_ref().and_then(|key| {
            match HttpMailer::new(key, &config.email_api_base) {
                Ok(client) => {
                    tracing::info!(email_api = %config.email_api_base, "Email notifications enabled");
                    Some(Arc::new(client) as Arc<dyn Mailer>)
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create email client");
                    None
                }
            }
        });

        if mailer.is_none() {
            tracing::warn!("Email not configured - order notifications will not be sent");
        }
        if config.admin_password.is_none() || config.admin_jwt_secret.is_none() {
            tracing::warn!("Admin credentials not configured - admin endpoints are disabled");
        }

        let notifier = NotificationDispatcher::new(
            mailer,
            config.email_from.clone(),
            config.business_email.clone(),
        );

        Self {
            store,
            catalog,
            config,
            stripe,
            notifier,
        }
    }

    /// Replace the mailer, keeping the configured sender and business address.
    #[must_use]
    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.notifier = NotificationDispatcher::new(
            Some(mailer),
            self.config.email_from.clone(),
            self.config.business_email.clone(),
        );
        self
    }

    /// The webhook-driven order lifecycle over this state's store.
    #[must_use]
    pub fn lifecycle(&self) -> OrderLifecycle {
        OrderLifecycle::new(
            Arc::clone(&self.store),
            self.notifier.clone(),
            self.config.store_currency.clone(),
        )
    }

    /// Check if Stripe is configured.
    #[must_use]
    pub fn has_stripe(&self) -> bool {
        self.stripe.is_some()
    }
}
