//! Order and quote notifications.
//!
//! Order email delivery is best effort: a failed or unconfigured send is logged and
//! reported, never propagated to the webhook that created the order. A quote request
//! has nothing but its email, so the caller decides what a skipped or failed send means.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use justcakes_core::{Order, QuoteRequest};

use crate::email::templates::{self, RenderedEmail};
use crate::email::{Mailer, OutgoingEmail};

/// What happened to one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The provider accepted the message.
    Sent,
    /// Not attempted.
    Skipped(&'static str),
    /// Attempted and failed.
    Failed(String),
}

/// Outcome of the two order-placed notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    /// Confirmation to the customer.
    pub customer: SendOutcome,
    /// Alert to the business.
    pub business: SendOutcome,
}

/// Sends the emails that follow a new order.
#[derive(Clone)]
pub struct NotificationDispatcher {
    mailer: Option<Arc<dyn Mailer>>,
    from: String,
    business_email: Option<String>,
}

impl std::fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field("enabled", &self.mailer.is_some())
            .field("from", &self.from)
            .field("business_email", &self.business_email)
            .finish()
    }
}

impl NotificationDispatcher {
    /// Create a dispatcher. With no mailer every send is skipped.
    #[must_use]
    pub fn new(
        mailer: Option<Arc<dyn Mailer>>,
        from: impl Into<String>,
        business_email: Option<String>,
    ) -> Self {
        Self {
            mailer,
            from: from.into(),
            business_email: business_email.filter(|e| !e.trim().is_empty()),
        }
    }

    /// A dispatcher that never sends.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(None, String::new(), None)
    }

    /// Whether a mailer is configured.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.mailer.is_some()
    }

    /// Send the customer confirmation and the business alert concurrently.
    pub async fn order_placed(&self, order: &Order) -> DispatchReport {
        let Some(mailer) = &self.mailer else {
            tracing::debug!(order_id = %order.id, "Email not configured - skipping notifications");
            return DispatchReport {
                customer: SendOutcome::Skipped("email not configured"),
                business: SendOutcome::Skipped("email not configured"),
            };
        };

        let customer = async {
            if order.customer_email.trim().is_empty() {
                tracing::warn!(order_id = %order.id, "Order has no customer email - skipping confirmation");
                return SendOutcome::Skipped("no customer email");
            }
            let email = self.compose(
                templates::customer_confirmation(order),
                order.customer_email.clone(),
            );
            deliver(mailer.as_ref(), &email, order, "customer confirmation").await
        };

        let business = async {
            let Some(to) = &self.business_email else {
                return SendOutcome::Skipped("no business address");
            };
            let email = self.compose(templates::business_alert(order), to.clone());
            deliver(mailer.as_ref(), &email, order, "business alert").await
        };

        let (customer, business) = futures::join!(customer, business);
        DispatchReport { customer, business }
    }

    /// Forward a quote request to the business address.
    pub async fn quote_requested(
        &self,
        quote: &QuoteRequest,
        submitted_at: DateTime<Utc>,
    ) -> SendOutcome {
        let Some(mailer) = &self.mailer else {
            tracing::error!("Email not configured - cannot forward quote request");
            return SendOutcome::Skipped("email not configured");
        };
        let Some(to) = &self.business_email else {
            tracing::error!("Business email not configured - cannot forward quote request");
            return SendOutcome::Skipped("no business address");
        };

        let email = self.compose(templates::quote_request(quote, submitted_at), to.clone());
        match mailer.send(&email).await {
            Ok(()) => {
                tracing::info!(
                    occasion = %quote.occasion,
                    servings = quote.servings.unwrap_or_default(),
                    "Sent quote request email"
                );
                SendOutcome::Sent
            }
            Err(e) => {
                tracing::error!(occasion = %quote.occasion, error = %e, "Failed to send quote request email");
                SendOutcome::Failed(e.to_string())
            }
        }
    }

    fn compose(&self, rendered: RenderedEmail, to: String) -> OutgoingEmail {
        OutgoingEmail {
            from: self.from.clone(),
            to: vec![to],
            subject: rendered.subject,
            html: rendered.html,
            text: rendered.text,
        }
    }
}

async fn deliver(mailer: &dyn Mailer, email: &OutgoingEmail, order: &Order, kind: &str) -> SendOutcome {
    match mailer.send(email).await {
        Ok(()) => {
            tracing::info!(order_id = %order.id, kind, "Sent order email");
            SendOutcome::Sent
        }
        Err(e) => {
            tracing::error!(order_id = %order.id, kind, error = %e, "Failed to send order email");
            SendOutcome::Failed(e.to_string())
        }
    }
}
