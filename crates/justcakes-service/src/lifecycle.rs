//! Webhook-driven order lifecycle.
//!
//! [`OrderLifecycle::apply`] is the single place where verified payment events change
//! order state. It is called only after the webhook signature has been checked.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use justcakes_core::{from_minor_units, NewOrder, Order, OrderId, OrderItem, PaymentStatus};
use justcakes_store::{InsertOutcome, Store, StoreError};

use crate::notifications::NotificationDispatcher;
use crate::stripe::types::CompletedSession;
use crate::stripe::PaymentEvent;

/// Session metadata key holding the serialized cart projection.
pub const CART_ITEMS_KEY: &str = "cart_items";

/// Session metadata key holding the requested delivery date.
pub const DELIVERY_DATE_KEY: &str = "delivery_date";

/// What applying an event did.
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleOutcome {
    /// A new order was persisted and notifications were dispatched.
    Created(Order),
    /// The session already had an order; nothing changed.
    Replayed {
        /// The existing order.
        existing_id: OrderId,
    },
    /// The order's payment was marked failed (or was already refunded).
    PaymentFailed(Order),
    /// The order was refunded and cancelled.
    Refunded(Order),
    /// No order references the event's payment intent.
    NoMatchingOrder,
    /// The event needs no state change.
    Ignored,
}

/// Applies payment events to the order store.
#[derive(Clone)]
pub struct OrderLifecycle {
    store: Arc<dyn Store>,
    notifier: NotificationDispatcher,
    default_currency: String,
}

impl OrderLifecycle {
    /// Create a lifecycle over a store.
    #[must_use]
    pub fn new(
        store: Arc<dyn Store>,
        notifier: NotificationDispatcher,
        default_currency: impl Into<String>,
    ) -> Self {
        Self {
            store,
            notifier,
            default_currency: default_currency.into(),
        }
    }

    /// Apply one verified event.
    ///
    /// Replays and lookup misses are successes. A storage failure is returned so the
    /// webhook answers with an error and the provider retries.
    pub async fn apply(&self, event: PaymentEvent) -> Result<LifecycleOutcome, StoreError> {
        match event {
            PaymentEvent::CheckoutCompleted(session) => self.checkout_completed(&session).await,
            PaymentEvent::PaymentSucceeded { payment_intent_id } => {
                tracing::info!(payment_intent_id = %payment_intent_id, "Payment succeeded");
                Ok(LifecycleOutcome::Ignored)
            }
            PaymentEvent::PaymentFailed { payment_intent_id } => {
                match self.store.mark_payment_failed(&payment_intent_id).await? {
                    Some(order) => {
                        tracing::warn!(
                            order_id = %order.id,
                            payment_intent_id = %payment_intent_id,
                            payment_status = %order.payment_status,
                            "Payment failed"
                        );
                        Ok(LifecycleOutcome::PaymentFailed(order))
                    }
                    None => {
                        tracing::info!(payment_intent_id = %payment_intent_id, "Payment failed for unknown order");
                        Ok(LifecycleOutcome::NoMatchingOrder)
                    }
                }
            }
            PaymentEvent::ChargeRefunded {
                charge_id,
                payment_intent_id,
            } => {
                let Some(payment_intent_id) = payment_intent_id else {
                    tracing::info!(charge_id = %charge_id, "Refunded charge has no payment intent");
                    return Ok(LifecycleOutcome::NoMatchingOrder);
                };
                match self.store.mark_refunded(&payment_intent_id).await? {
                    Some(order) => {
                        tracing::info!(
                            order_id = %order.id,
                            charge_id = %charge_id,
                            "Order refunded and cancelled"
                        );
                        Ok(LifecycleOutcome::Refunded(order))
                    }
                    None => {
                        tracing::info!(
                            charge_id = %charge_id,
                            payment_intent_id = %payment_intent_id,
                            "Refund for unknown order"
                        );
                        Ok(LifecycleOutcome::NoMatchingOrder)
                    }
                }
            }
            PaymentEvent::Unhandled { event_type } => {
                tracing::debug!(event_type = %event_type, "Unhandled Stripe event");
                Ok(LifecycleOutcome::Ignored)
            }
        }
    }

    /// Insert the order and dispatch its notifications on a task of their own, so a
    /// dropped webhook handler cannot leave an inserted order without its emails.
    async fn checkout_completed(
        &self,
        session: &CompletedSession,
    ) -> Result<LifecycleOutcome, StoreError> {
        let order = materialize_order(session, &self.default_currency)
            .into_order(OrderId::generate(), Utc::now());
        let store = Arc::clone(&self.store);
        let notifier = self.notifier.clone();

        tokio::spawn(async move {
            match store.insert_order(&order).await? {
                InsertOutcome::Duplicate { existing_id } => {
                    tracing::info!(
                        session_id = %order.payment_session_id,
                        order_id = %existing_id,
                        "Checkout session already has an order - skipping"
                    );
                    Ok::<_, StoreError>(LifecycleOutcome::Replayed { existing_id })
                }
                InsertOutcome::Created => {
                    tracing::info!(
                        order_id = %order.id,
                        session_id = %order.payment_session_id,
                        total = %order.total_amount,
                        currency = %order.currency,
                        items = order.order_items.len(),
                        "Order created"
                    );
                    spawn_notifications(notifier, order.clone());
                    Ok::<_, StoreError>(LifecycleOutcome::Created(order))
                }
            }
        })
        .await
        .map_err(|e| StoreError::Database(format!("order creation task failed: {e}")))?
    }
}

fn spawn_notifications(notifier: NotificationDispatcher, order: Order) {
    tokio::spawn(async move {
        let report = notifier.order_placed(&order).await;
        tracing::debug!(order_id = %order.id, ?report, "Order notifications finished");
    });
}

/// Build the order record for a completed session.
///
/// Customer and address fields come from the provider's session only. The total is
/// the provider-reported amount. A missing or malformed cart snapshot yields an order
/// with no items rather than an error.
#[must_use]
pub fn materialize_order(session: &CompletedSession, default_currency: &str) -> NewOrder {
    let order_items = parse_cart_items(session);
    let delivery_date = parse_delivery_date(session);

    let details = session.customer_details.as_ref();
    let customer_email = details
        .and_then(|d| d.email.clone())
        .or_else(|| session.customer_email.clone())
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| {
            tracing::warn!(session_id = %session.id, "Completed session has no customer email");
            String::new()
        });

    let payment_status = if session.payment_status.as_deref() == Some("paid") {
        PaymentStatus::Paid
    } else {
        PaymentStatus::Unpaid
    };

    NewOrder {
        payment_session_id: session.id.clone(),
        payment_intent_id: session.payment_intent.as_ref().map(|pi| pi.id().to_string()),
        customer_email,
        customer_name: details.and_then(|d| d.name.clone()),
        customer_phone: details.and_then(|d| d.phone.clone()),
        order_items,
        total_amount: from_minor_units(session.amount_total.unwrap_or(0)),
        currency: session
            .currency
            .clone()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| default_currency.to_string())
            .to_ascii_lowercase(),
        shipping_address: session.shipping().cloned(),
        billing_address: details.and_then(|d| d.address.clone()),
        payment_status,
        delivery_date,
    }
}

fn parse_cart_items(session: &CompletedSession) -> Vec<OrderItem> {
    let Some(raw) = session.metadata_str(CART_ITEMS_KEY) else {
        tracing::warn!(session_id = %session.id, "Completed session has no cart metadata");
        return Vec::new();
    };
    serde_json::from_str(raw).unwrap_or_else(|e| {
        tracing::warn!(session_id = %session.id, error = %e, "Malformed cart metadata");
        Vec::new()
    })
}

fn parse_delivery_date(session: &CompletedSession) -> Option<NaiveDate> {
    let raw = session
        .metadata_str(DELIVERY_DATE_KEY)
        .map(str::trim)
        .filter(|d| !d.is_empty())?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| {
            tracing::warn!(session_id = %session.id, error = %e, "Malformed delivery date metadata");
        })
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::tests::RecordingMailer;
    use justcakes_core::FulfillmentStatus;
    use justcakes_store::MemoryStore;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use std::time::Duration;

    fn session(value: serde_json::Value) -> CompletedSession {
        serde_json::from_value(value).unwrap()
    }

    fn completed(id: &str, intent: &str) -> CompletedSession {
        session(json!({
            "id": id,
            "payment_intent": intent,
            "payment_status": "paid",
            "amount_total": 9198,
            "currency": "gbp",
            "customer_details": {
                "email": "ada@example.com",
                "name": "Ada Lovelace",
                "phone": "+441234567890",
                "address": {"line1": "1 High St", "country": "GB"}
            },
            "metadata": {
                "cart_items": r#"[{"id":"cake-1","name":"Chocolate Delight Cake","quantity":2,"price":45.99}]"#,
                "delivery_date": "2030-06-01"
            }
        }))
    }

    fn lifecycle(store: Arc<MemoryStore>) -> OrderLifecycle {
        OrderLifecycle::new(store, NotificationDispatcher::disabled(), "usd")
    }

    #[test]
    fn materializes_from_provider_fields() {
        let order = materialize_order(&completed("cs_test_1", "pi_1"), "usd");
        assert_eq!(order.payment_session_id, "cs_test_1");
        assert_eq!(order.payment_intent_id.as_deref(), Some("pi_1"));
        assert_eq!(order.customer_email, "ada@example.com");
        assert_eq!(order.customer_name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(order.total_amount, dec!(91.98));
        assert_eq!(order.currency, "gbp");
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert_eq!(order.order_items.len(), 1);
        assert_eq!(order.order_items[0].price, dec!(45.99));
        assert_eq!(order.delivery_date, NaiveDate::from_ymd_opt(2030, 6, 1));
        assert_eq!(order.billing_address.unwrap()["country"], "GB");
    }

    #[test]
    fn malformed_metadata_gives_empty_items() {
        let order = materialize_order(
            &session(json!({
                "id": "cs_test_2",
                "amount_total": 500,
                "metadata": {"cart_items": "not json", "delivery_date": "next tuesday"}
            })),
            "usd",
        );
        assert!(order.order_items.is_empty());
        assert_eq!(order.delivery_date, None);
        assert_eq!(order.currency, "usd");
        assert_eq!(order.payment_status, PaymentStatus::Unpaid);
        assert_eq!(order.customer_email, "");
        assert_eq!(order.total_amount, dec!(5.00));
    }

    #[test]
    fn non_string_metadata_gives_empty_items() {
        let order = materialize_order(
            &session(json!({
                "id": "cs_test_4",
                "metadata": {"cart_items": [{"id": "cake-1"}], "delivery_date": 20300601}
            })),
            "usd",
        );
        assert!(order.order_items.is_empty());
        assert_eq!(order.delivery_date, None);

        let order = materialize_order(&session(json!({"id": "cs_test_5", "metadata": null})), "usd");
        assert!(order.order_items.is_empty());
    }

    #[test]
    fn email_falls_back_to_session_field() {
        let order = materialize_order(
            &session(json!({
                "id": "cs_test_3",
                "customer_email": "fallback@example.com",
                "payment_intent": {"id": "pi_expanded", "object": "payment_intent"}
            })),
            "usd",
        );
        assert_eq!(order.customer_email, "fallback@example.com");
        assert_eq!(order.payment_intent_id.as_deref(), Some("pi_expanded"));
        assert!(order.order_items.is_empty());
    }

    #[tokio::test]
    async fn replay_creates_one_order() {
        let store = Arc::new(MemoryStore::new());
        let lifecycle = lifecycle(store.clone());
        let event = PaymentEvent::CheckoutCompleted(Box::new(completed("cs_test_1", "pi_1")));

        let first = lifecycle.apply(event.clone()).await.unwrap();
        let LifecycleOutcome::Created(order) = first else {
            panic!("expected Created, got {first:?}");
        };
        let second = lifecycle.apply(event).await.unwrap();
        assert_eq!(second, LifecycleOutcome::Replayed { existing_id: order.id });
        assert_eq!(store.list_orders().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failure_then_refund() {
        let store = Arc::new(MemoryStore::new());
        let lifecycle = lifecycle(store.clone());
        lifecycle
            .apply(PaymentEvent::CheckoutCompleted(Box::new(completed("cs_test_1", "pi_1"))))
            .await
            .unwrap();

        let failed = lifecycle
            .apply(PaymentEvent::PaymentFailed {
                payment_intent_id: "pi_1".into(),
            })
            .await
            .unwrap();
        let LifecycleOutcome::PaymentFailed(order) = failed else {
            panic!("expected PaymentFailed, got {failed:?}");
        };
        assert_eq!(order.payment_status, PaymentStatus::Failed);
        assert_eq!(order.status, FulfillmentStatus::Pending);

        let refunded = lifecycle
            .apply(PaymentEvent::ChargeRefunded {
                charge_id: "ch_1".into(),
                payment_intent_id: Some("pi_1".into()),
            })
            .await
            .unwrap();
        let LifecycleOutcome::Refunded(order) = refunded else {
            panic!("expected Refunded, got {refunded:?}");
        };
        assert_eq!(order.payment_status, PaymentStatus::Refunded);
        assert_eq!(order.status, FulfillmentStatus::Cancelled);
    }

    #[tokio::test]
    async fn unknown_intents_are_no_ops() {
        let store = Arc::new(MemoryStore::new());
        let lifecycle = lifecycle(store.clone());

        let outcome = lifecycle
            .apply(PaymentEvent::ChargeRefunded {
                charge_id: "ch_x".into(),
                payment_intent_id: Some("pi_missing".into()),
            })
            .await
            .unwrap();
        assert_eq!(outcome, LifecycleOutcome::NoMatchingOrder);

        let outcome = lifecycle
            .apply(PaymentEvent::Unhandled {
                event_type: "customer.created".into(),
            })
            .await
            .unwrap();
        assert_eq!(outcome, LifecycleOutcome::Ignored);
        assert!(store.is_empty().await);
    }

    /// Delays every insert, long enough for a caller to give up first.
    struct SlowStore {
        inner: MemoryStore,
        delay: Duration,
    }

    #[async_trait::async_trait]
    impl Store for SlowStore {
        async fn insert_order(&self, order: &Order) -> justcakes_store::Result<InsertOutcome> {
            tokio::time::sleep(self.delay).await;
            self.inner.insert_order(order).await
        }
        async fn get_order(&self, id: &OrderId) -> justcakes_store::Result<Option<Order>> {
            self.inner.get_order(id).await
        }
        async fn get_order_by_session(&self, id: &str) -> justcakes_store::Result<Option<Order>> {
            self.inner.get_order_by_session(id).await
        }
        async fn list_orders(&self) -> justcakes_store::Result<Vec<Order>> {
            self.inner.list_orders().await
        }
        async fn mark_payment_failed(&self, pi: &str) -> justcakes_store::Result<Option<Order>> {
            self.inner.mark_payment_failed(pi).await
        }
        async fn mark_refunded(&self, pi: &str) -> justcakes_store::Result<Option<Order>> {
            self.inner.mark_refunded(pi).await
        }
        async fn update_fulfillment(
            &self,
            id: &OrderId,
            update: &justcakes_store::FulfillmentUpdate,
        ) -> justcakes_store::Result<Order> {
            self.inner.update_fulfillment(id, update).await
        }
    }

    #[tokio::test]
    async fn abandoned_webhook_still_creates_and_notifies() {
        let store = Arc::new(SlowStore {
            inner: MemoryStore::new(),
            delay: Duration::from_millis(100),
        });
        let mailer = Arc::new(RecordingMailer::default());
        let lifecycle = OrderLifecycle::new(
            store.clone(),
            NotificationDispatcher::new(Some(mailer.clone()), "orders@justcakes.com", Some("hello@justcakes.com".into())),
            "usd",
        );
        let event = PaymentEvent::CheckoutCompleted(Box::new(completed("cs_test_1", "pi_1")));

        let abandoned = tokio::time::timeout(Duration::from_millis(10), lifecycle.apply(event)).await;
        assert!(abandoned.is_err());

        for _ in 0..100 {
            if mailer.sent.lock().await.len() >= 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(store.inner.list_orders().await.unwrap().len(), 1);
        assert_eq!(mailer.sent.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn notifies_only_new_orders() {
        let store = Arc::new(MemoryStore::new());
        let mailer = Arc::new(RecordingMailer::default());
        let lifecycle = OrderLifecycle::new(
            store,
            NotificationDispatcher::new(Some(mailer.clone()), "orders@justcakes.com", Some("hello@justcakes.com".into())),
            "usd",
        );
        let event = PaymentEvent::CheckoutCompleted(Box::new(completed("cs_test_1", "pi_1")));
        lifecycle.apply(event.clone()).await.unwrap();
        lifecycle.apply(event).await.unwrap();

        for _ in 0..100 {
            if mailer.sent.lock().await.len() >= 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(mailer.sent.lock().await.len(), 2);
    }
}
