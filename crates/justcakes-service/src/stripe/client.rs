//! Stripe API client implementation.

use std::time::Duration;

use reqwest::Client;

use super::types::{CheckoutSession, NewCheckoutSession, StripeErrorResponse};

/// Error type for Stripe operations.
#[derive(Debug, thiserror::Error)]
pub enum StripeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Stripe API returned an error.
    #[error("Stripe API error: {error_type} - {message}")]
    Api {
        /// Error type.
        error_type: String,
        /// Error message.
        message: String,
        /// Error code.
        code: Option<String>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Stripe API client.
#[derive(Debug, Clone)]
pub struct StripeClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl StripeClient {
    /// Stripe API base URL.
    pub const BASE_URL: &'static str = "https://api.stripe.com/v1";

    /// Create a new Stripe client.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Stripe secret API key (`sk_test_...` or `sk_live_...`)
    /// * `base_url` - API base, normally [`Self::BASE_URL`]
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self, StripeError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(StripeError::Configuration("empty API key".into()));
        }

        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create a hosted Checkout session.
    pub async fn create_checkout_session(
        &self,
        session: &NewCheckoutSession,
    ) -> Result<CheckoutSession, StripeError> {
        let params = session.form_params();

        tracing::debug!(
            line_items = session.line_items.len(),
            currency = %session.currency,
            "Creating Stripe checkout session"
        );

        let response = self
            .client
            .post(format!("{}/checkout/sessions", self.base_url))
            .basic_auth(&self.api_key, Option::<&str>::None)
            .form(&params)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, StripeError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let error_body: Result<StripeErrorResponse, _> = response.json().await;

        match error_body {
            Ok(stripe_error) => Err(StripeError::Api {
                error_type: stripe_error.error.error_type,
                message: stripe_error.error.message,
                code: stripe_error.error.code,
            }),
            Err(_) => Err(StripeError::Api {
                error_type: "unknown".to_string(),
                message: format!("HTTP {status}"),
                code: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stripe::types::CheckoutLineItem;
    use wiremock::matchers::{body_string_contains, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session() -> NewCheckoutSession {
        NewCheckoutSession {
            currency: "usd".into(),
            line_items: vec![CheckoutLineItem {
                name: "Chocolate Fudge Slice".into(),
                description: None,
                images: Vec::new(),
                unit_amount: 699,
                quantity: 1,
            }],
            success_url: "http://localhost:3000/success".into(),
            cancel_url: "http://localhost:3000/cart".into(),
            allowed_countries: vec!["US".into()],
            metadata: Vec::new(),
        }
    }

    #[test]
    fn rejects_empty_key() {
        assert!(matches!(
            StripeClient::new(" ", StripeClient::BASE_URL),
            Err(StripeError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn creates_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/checkout/sessions"))
            .and(header_exists("authorization"))
            .and(body_string_contains("mode=payment"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "cs_test_1",
                "url": "https://checkout.stripe.com/c/pay/cs_test_1",
                "amount_total": 699
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = StripeClient::new("sk_test_xxx", server.uri()).unwrap();
        let created = client.create_checkout_session(&session()).await.unwrap();
        assert_eq!(created.id, "cs_test_1");
        assert_eq!(created.amount_total, Some(699));
    }

    #[tokio::test]
    async fn maps_api_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {"type": "invalid_request_error", "message": "No such price", "code": "resource_missing"}
            })))
            .mount(&server)
            .await;

        let client = StripeClient::new("sk_test_xxx", server.uri()).unwrap();
        let err = client.create_checkout_session(&session()).await.unwrap_err();
        match err {
            StripeError::Api { error_type, code, .. } => {
                assert_eq!(error_type, "invalid_request_error");
                assert_eq!(code.as_deref(), Some("resource_missing"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
