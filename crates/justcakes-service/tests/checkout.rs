//! Checkout session integration tests.

mod common;

use axum::http::StatusCode;
use chrono::{Days, Utc};
use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::TestHarness;

fn session_response() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "cs_test_1",
        "object": "checkout.session",
        "url": "https://checkout.stripe.com/c/pay/cs_test_1",
        "amount_total": 9198
    }))
}

fn cake_line(quantity: i64) -> Value {
    json!({
        "id": "cake-1",
        "name": "Chocolate Delight Cake",
        "description": "Rich chocolate cake",
        "price": 45.99,
        "image": "/images/cakes/chocolate-delight.jpg",
        "quantity": quantity
    })
}

fn form_body(request: &wiremock::Request) -> String {
    String::from_utf8(request.body.clone()).unwrap()
}

/// Integer form field by its bracketed key, e.g. `line_items[0][quantity]`.
fn form_int(form: &str, key: &str) -> Option<i64> {
    form.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k.replace("%5B", "[").replace("%5D", "]") == key).then(|| v.parse().ok())?
    })
}

#[tokio::test]
async fn creates_session_with_minor_unit_prices() {
    let stripe = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/checkout/sessions"))
        .respond_with(session_response())
        .expect(1)
        .mount(&stripe)
        .await;
    let harness = TestHarness::with_stripe(&stripe.uri());

    let response = harness
        .server
        .post("/v1/checkout")
        .json(&json!({ "items": [cake_line(2)] }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["sessionId"], "cs_test_1");
    assert_eq!(body["url"], "https://checkout.stripe.com/c/pay/cs_test_1");

    let requests = stripe.received_requests().await.unwrap();
    let form = form_body(&requests[0]);
    assert!(form.contains("line_items%5B0%5D%5Bprice_data%5D%5Bunit_amount%5D=4599"));
    assert!(form.contains("line_items%5B0%5D%5Bquantity%5D=2"));
    assert!(form.contains("line_items%5B0%5D%5Bprice_data%5D%5Bcurrency%5D=gbp"));
    assert!(form.contains("mode=payment"));
    assert!(form.contains("shipping_address_collection%5Ballowed_countries%5D%5B0%5D=GB"));
    assert!(form.contains("metadata%5Bcart_items%5D="));
    assert!(form.contains(
        "images%5D%5B0%5D=https%3A%2F%2Fjustcakes.test%2Fimages%2Fcakes%2Fchocolate-delight.jpg"
    ));
}

#[tokio::test]
async fn line_total_matches_sum_of_items() {
    let stripe = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/checkout/sessions"))
        .respond_with(session_response())
        .mount(&stripe)
        .await;
    let harness = TestHarness::with_stripe(&stripe.uri());

    let items = json!([
        cake_line(2),
        {"id": "cupcake-1", "name": "Vanilla Cupcakes", "price": 3.5, "quantity": 6},
        {"id": "slice-1", "name": "Fudge Slice", "price": 6.99, "quantity": 1}
    ]);
    harness
        .server
        .post("/v1/checkout")
        .json(&json!({ "items": items }))
        .await
        .assert_status_ok();

    let requests = stripe.received_requests().await.unwrap();
    let form = form_body(&requests[0]);
    let total: i64 = (0..3)
        .map(|i| {
            let unit = form_int(&form, &format!("line_items[{i}][price_data][unit_amount]")).unwrap();
            let quantity = form_int(&form, &format!("line_items[{i}][quantity]")).unwrap();
            unit * quantity
        })
        .sum();
    assert_eq!(total, 2 * 4599 + 6 * 350 + 699);
    assert_eq!(form_int(&form, "line_items[3][quantity]"), None);
}

#[tokio::test]
async fn delivery_date_travels_as_metadata() {
    let stripe = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/checkout/sessions"))
        .and(body_string_contains("metadata%5Bdelivery_date%5D="))
        .respond_with(session_response())
        .expect(1)
        .mount(&stripe)
        .await;
    let harness = TestHarness::with_stripe(&stripe.uri());
    let date = Utc::now()
        .date_naive()
        .checked_add_days(Days::new(14))
        .unwrap()
        .format("%Y-%m-%d")
        .to_string();

    harness
        .server
        .post("/v1/checkout")
        .json(&json!({ "items": [cake_line(1)], "deliveryDate": date }))
        .await
        .assert_status_ok();

    let requests = stripe.received_requests().await.unwrap();
    assert!(form_body(&requests[0]).contains(&format!("metadata%5Bdelivery_date%5D={date}")));
}

#[tokio::test]
async fn empty_cart_is_rejected_without_calling_provider() {
    let stripe = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(session_response())
        .expect(0)
        .mount(&stripe)
        .await;
    let harness = TestHarness::with_stripe(&stripe.uri());

    let response = harness
        .server
        .post("/v1/checkout")
        .json(&json!({ "items": [] }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn invalid_lines_are_rejected() {
    let stripe = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(session_response())
        .expect(0)
        .mount(&stripe)
        .await;
    let harness = TestHarness::with_stripe(&stripe.uri());

    for items in [
        json!([cake_line(0)]),
        json!([{"id": "cake-1", "name": "Cake", "price": 0, "quantity": 1}]),
        json!([{"id": "cake-1", "name": "Cake", "price": -4.5, "quantity": 1}]),
    ] {
        harness
            .server
            .post("/v1/checkout")
            .json(&json!({ "items": items }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn unavailable_product_is_rejected() {
    let stripe = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(session_response())
        .expect(0)
        .mount(&stripe)
        .await;
    let harness = TestHarness::with_stripe(&stripe.uri());

    let response = harness
        .server
        .post("/v1/checkout")
        .json(&json!({ "items": [{"id": "cake-4", "name": "Red Velvet", "price": 42.99, "quantity": 1}] }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["details"]["itemId"], "cake-4");
}

#[tokio::test]
async fn delivery_too_soon_is_rejected() {
    let stripe = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(session_response())
        .expect(0)
        .mount(&stripe)
        .await;
    let harness = TestHarness::with_stripe(&stripe.uri());
    let tomorrow = Utc::now()
        .date_naive()
        .checked_add_days(Days::new(1))
        .unwrap()
        .to_string();

    let response = harness
        .server
        .post("/v1/checkout")
        .json(&json!({ "items": [cake_line(1)], "deliveryDate": tomorrow }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "delivery_too_soon");
}

#[tokio::test]
async fn provider_error_surfaces_as_server_error() {
    let stripe = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"type": "api_error", "message": "Something went wrong"}
        })))
        .mount(&stripe)
        .await;
    let harness = TestHarness::with_stripe(&stripe.uri());

    let response = harness
        .server
        .post("/v1/checkout")
        .json(&json!({ "items": [cake_line(1)] }))
        .await;

    assert!(response.status_code().is_server_error());
}

#[tokio::test]
async fn unconfigured_provider_is_a_server_error() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/checkout")
        .json(&json!({ "items": [cake_line(1)] }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}
