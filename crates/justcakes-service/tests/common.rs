//! Common test utilities for Just Cakes integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use axum_test::{TestResponse, TestServer};
use serde_json::{json, Value};
use tokio::sync::Mutex;

use justcakes_core::seed::seed_catalog;
use justcakes_service::stripe::webhook::signature_header;
use justcakes_service::{create_router, AppState, EmailError, Mailer, OutgoingEmail, ServiceConfig};
use justcakes_core::{Order, OrderId};
use justcakes_store::{FulfillmentUpdate, InsertOutcome, MemoryStore, Store, StoreError};

pub const WEBHOOK_SECRET: &str = "whsec_test_secret";
pub const ADMIN_PASSWORD: &str = "let-them-eat-cake";
pub const ADMIN_JWT_SECRET: &str = "test-admin-jwt-secret";
pub const BUSINESS_EMAIL: &str = "hello@justcakes.com";

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// The store behind the server, for direct inspection.
    pub store: Arc<MemoryStore>,
}

/// Base configuration shared by all tests.
pub fn test_config() -> ServiceConfig {
    ServiceConfig {
        listen_addr: "127.0.0.1:0".into(),
        site_base_url: "https://justcakes.test".into(),
        stripe_webhook_secret: Some(WEBHOOK_SECRET.into()),
        store_currency: "gbp".into(),
        shipping_countries: vec!["GB".into()],
        business_email: Some(BUSINESS_EMAIL.into()),
        admin_password: Some(ADMIN_PASSWORD.into()),
        admin_jwt_secret: Some(ADMIN_JWT_SECRET.into()),
        ..ServiceConfig::default()
    }
}

impl TestHarness {
    /// Create a new test harness with an empty in-memory store.
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Create a harness with a specific configuration.
    pub fn with_config(config: ServiceConfig) -> Self {
        Self::build(config, None)
    }

    /// Create a harness whose order emails go to `mailer`.
    pub fn with_mailer(mailer: Arc<dyn Mailer>) -> Self {
        Self::build(test_config(), Some(mailer))
    }

    /// Create a harness with a specific configuration whose emails go to `mailer`.
    pub fn with_config_and_mailer(config: ServiceConfig, mailer: Arc<dyn Mailer>) -> Self {
        Self::build(config, Some(mailer))
    }

    /// Create a harness whose checkout calls go to a mock provider at `stripe_base`.
    pub fn with_stripe(stripe_base: &str) -> Self {
        Self::with_config(ServiceConfig {
            stripe_api_key: Some("sk_test_123".into()),
            stripe_api_base: stripe_base.to_string(),
            ..test_config()
        })
    }

    /// Create a harness over a store whose inserts can be made to fail.
    pub fn with_flaky_store(store: Arc<FlakyStore>, mailer: Arc<dyn Mailer>) -> Self {
        let memory = Arc::clone(&store.inner);
        Self::build_with(store, memory, test_config(), Some(mailer))
    }

    fn build(config: ServiceConfig, mailer: Option<Arc<dyn Mailer>>) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::build_with(store.clone(), store, config, mailer)
    }

    fn build_with(
        backend: Arc<dyn Store>,
        store: Arc<MemoryStore>,
        config: ServiceConfig,
        mailer: Option<Arc<dyn Mailer>>,
    ) -> Self {
        let mut state = AppState::new(backend, Arc::new(seed_catalog()), config);
        if let Some(mailer) = mailer {
            state = state.with_mailer(mailer);
        }
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self { server, store }
    }

    /// Post a correctly signed webhook.
    pub async fn post_webhook(&self, event: &Value) -> TestResponse {
        let body = serde_json::to_vec(event).expect("event serializes");
        let signature = signature_header(&body, WEBHOOK_SECRET, chrono::Utc::now().timestamp());
        self.post_webhook_raw(body, &signature).await
    }

    /// Post a webhook body with an arbitrary signature header.
    pub async fn post_webhook_raw(&self, body: Vec<u8>, signature: &str) -> TestResponse {
        self.server
            .post("/webhooks/stripe")
            .add_header(
                HeaderName::from_static("stripe-signature"),
                HeaderValue::from_str(signature).expect("valid header value"),
            )
            .bytes(Bytes::from(body))
            .await
    }

    /// Log in as admin and return the bearer header value.
    pub async fn admin_bearer(&self) -> HeaderValue {
        let response = self
            .server
            .post("/v1/admin/auth")
            .json(&json!({ "password": ADMIN_PASSWORD }))
            .await;
        response.assert_status_ok();
        let token = admin_token_from(&response).expect("login sets admin cookie");
        HeaderValue::from_str(&format!("Bearer {token}")).expect("valid header value")
    }

    /// Number of orders in the store.
    pub async fn order_count(&self) -> usize {
        self.store.list_orders().await.expect("list orders").len()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the admin token from a login response's `Set-Cookie` header.
pub fn admin_token_from(response: &TestResponse) -> Option<String> {
    let cookie = response.headers().get("set-cookie")?.to_str().ok()?;
    let value = cookie.split(';').next()?.strip_prefix("admin_token=")?;
    Some(value.to_string()).filter(|v| !v.is_empty())
}

pub fn authorization() -> HeaderName {
    HeaderName::from_static("authorization")
}

/// A `checkout.session.completed` event for one cake at 45.99 x 2.
pub fn completed_event(session_id: &str, payment_intent: &str) -> Value {
    json!({
        "id": format!("evt_{session_id}"),
        "type": "checkout.session.completed",
        "created": 1_700_000_000,
        "data": {
            "object": {
                "id": session_id,
                "object": "checkout.session",
                "payment_intent": payment_intent,
                "payment_status": "paid",
                "amount_total": 9198,
                "currency": "gbp",
                "customer_details": {
                    "email": "ada@example.com",
                    "name": "Ada Lovelace",
                    "phone": "+447700900123",
                    "address": {"line1": "1 High Street", "city": "London", "country": "GB"}
                },
                "shipping_details": {
                    "name": "Ada Lovelace",
                    "address": {"line1": "1 High Street", "city": "London", "country": "GB"}
                },
                "metadata": {
                    "cart_items": r#"[{"id":"cake-1","name":"Chocolate Delight Cake","quantity":2,"price":45.99}]"#,
                    "delivery_date": "2030-06-01"
                }
            }
        }
    })
}

/// A `payment_intent.payment_failed` event.
pub fn payment_failed_event(payment_intent: &str) -> Value {
    json!({
        "id": format!("evt_failed_{payment_intent}"),
        "type": "payment_intent.payment_failed",
        "created": 1_700_000_100,
        "data": {"object": {"id": payment_intent, "object": "payment_intent"}}
    })
}

/// A `charge.refunded` event.
pub fn charge_refunded_event(payment_intent: &str) -> Value {
    json!({
        "id": format!("evt_refund_{payment_intent}"),
        "type": "charge.refunded",
        "created": 1_700_000_200,
        "data": {"object": {"id": format!("ch_{payment_intent}"), "object": "charge", "payment_intent": payment_intent}}
    })
}

/// Mailer that records every message.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingEmail>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        self.sent.lock().await.push(email.clone());
        Ok(())
    }
}

impl RecordingMailer {
    /// Wait until at least `count` messages were sent, or give up after a second.
    pub async fn wait_for(&self, count: usize) -> Vec<OutgoingEmail> {
        for _ in 0..100 {
            if self.sent.lock().await.len() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.sent.lock().await.clone()
    }
}

/// Mailer that rejects every message and counts attempts.
#[derive(Default)]
pub struct FailingMailer {
    pub attempts: Mutex<usize>,
}

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _email: &OutgoingEmail) -> Result<(), EmailError> {
        *self.attempts.lock().await += 1;
        Err(EmailError::Rejected {
            status: 500,
            message: "provider down".into(),
        })
    }
}

/// Store whose inserts fail with a database error while `failing` is set.
pub struct FlakyStore {
    pub inner: Arc<MemoryStore>,
    pub failing: AtomicBool,
}

impl FlakyStore {
    pub fn new_failing() -> Self {
        Self {
            inner: Arc::new(MemoryStore::new()),
            failing: AtomicBool::new(true),
        }
    }

    pub fn recover(&self) {
        self.failing.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl Store for FlakyStore {
    async fn insert_order(&self, order: &Order) -> justcakes_store::Result<InsertOutcome> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Database("connection reset".into()));
        }
        self.inner.insert_order(order).await
    }

    async fn get_order(&self, id: &OrderId) -> justcakes_store::Result<Option<Order>> {
        self.inner.get_order(id).await
    }

    async fn get_order_by_session(
        &self,
        payment_session_id: &str,
    ) -> justcakes_store::Result<Option<Order>> {
        self.inner.get_order_by_session(payment_session_id).await
    }

    async fn list_orders(&self) -> justcakes_store::Result<Vec<Order>> {
        self.inner.list_orders().await
    }

    async fn mark_payment_failed(
        &self,
        payment_intent_id: &str,
    ) -> justcakes_store::Result<Option<Order>> {
        self.inner.mark_payment_failed(payment_intent_id).await
    }

    async fn mark_refunded(&self, payment_intent_id: &str) -> justcakes_store::Result<Option<Order>> {
        self.inner.mark_refunded(payment_intent_id).await
    }

    async fn update_fulfillment(
        &self,
        id: &OrderId,
        update: &FulfillmentUpdate,
    ) -> justcakes_store::Result<Order> {
        self.inner.update_fulfillment(id, update).await
    }
}
