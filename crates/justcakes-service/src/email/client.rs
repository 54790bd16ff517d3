//! HTTP email client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{EmailError, Mailer, OutgoingEmail};

/// Client for a Resend-compatible `POST /emails` API.
#[derive(Debug, Clone)]
pub struct HttpMailer {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: String,
}

impl HttpMailer {
    /// Default API base URL.
    pub const BASE_URL: &'static str = "https://api.resend.com";

    /// Create a new email client.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self, EmailError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        if email.to.iter().all(|to| to.trim().is_empty()) {
            return Err(EmailError::InvalidMessage("no recipients".into()));
        }

        let response = self
            .client
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let sent: SendResponse = response.json().await.unwrap_or(SendResponse { id: None });
            tracing::debug!(email_id = ?sent.id, subject = %email.subject, "Email sent");
            return Ok(());
        }

        let message = response
            .json::<ErrorResponse>()
            .await
            .map(|e| e.message)
            .unwrap_or_default();
        Err(EmailError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}
