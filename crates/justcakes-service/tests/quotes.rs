//! Quote request integration tests.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{test_config, FailingMailer, RecordingMailer, TestHarness, BUSINESS_EMAIL};
use justcakes_service::ServiceConfig;

fn quote() -> Value {
    json!({
        "occasion": "baby-shower",
        "servings": 24,
        "allergies": ["nuts", "gluten"],
        "description": "Pastel blue <b>cupcakes</b> with little bears",
        "contact": "07700 900123"
    })
}

#[tokio::test]
async fn quote_is_emailed_to_business() {
    let mailer = Arc::new(RecordingMailer::default());
    let harness = TestHarness::with_mailer(mailer.clone());

    let response = harness.server.post("/v1/quote-requests").json(&quote()).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);

    let sent = mailer.sent.lock().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, vec![BUSINESS_EMAIL.to_string()]);
    assert_eq!(sent[0].subject, "New Custom Cupcake Quote Request - Baby Shower");
    assert!(sent[0].html.contains("Pastel blue &lt;b&gt;cupcakes&lt;/b&gt;"));
    assert!(sent[0].text.contains("Dietary Restrictions: nuts, gluten"));
    assert!(sent[0].text.contains("Contact: 07700 900123"));
}

#[tokio::test]
async fn invalid_quotes_are_rejected_before_sending() {
    let mailer = Arc::new(RecordingMailer::default());
    let harness = TestHarness::with_mailer(mailer.clone());

    let cases = [
        ("servings", json!(0)),
        ("servings", json!(501)),
        ("description", json!("tiny")),
        ("occasion", json!("")),
    ];
    for (field, value) in cases {
        let mut body = quote();
        body[field] = value;

        let response = harness.server.post("/v1/quote-requests").json(&body).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let error: Value = response.json();
        assert_eq!(error["error"]["code"], "validation_error");
    }

    assert!(mailer.sent.lock().await.is_empty());
}

#[tokio::test]
async fn unconfigured_email_is_an_error() {
    let harness = TestHarness::new();

    let response = harness.server.post("/v1/quote-requests").json(&quote()).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn missing_business_address_is_an_error() {
    let mailer = Arc::new(RecordingMailer::default());
    let harness = TestHarness::with_config_and_mailer(
        ServiceConfig {
            business_email: None,
            ..test_config()
        },
        mailer.clone(),
    );

    let response = harness.server.post("/v1/quote-requests").json(&quote()).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert!(mailer.sent.lock().await.is_empty());
}

#[tokio::test]
async fn provider_failure_is_an_error() {
    let mailer = Arc::new(FailingMailer::default());
    let harness = TestHarness::with_mailer(mailer.clone());

    let response = harness.server.post("/v1/quote-requests").json(&quote()).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(*mailer.attempts.lock().await, 1);
}
