//! Transactional email.
//!
//! [`Mailer`] is the seam between order notifications and the delivery provider.
//! [`HttpMailer`] talks to a Resend-compatible HTTP API; tests substitute their own.

mod client;
pub mod templates;

use async_trait::async_trait;
use serde::Serialize;

pub use client::HttpMailer;

/// Errors from sending an email.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider rejected the message.
    #[error("email provider rejected message ({status}): {message}")]
    Rejected {
        /// HTTP status.
        status: u16,
        /// Provider message.
        message: String,
    },

    /// The message cannot be sent as addressed.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

/// A rendered message ready to send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingEmail {
    /// Sender, e.g. `Just Cakes <orders@justcakes.com>`.
    pub from: String,
    /// Recipients.
    pub to: Vec<String>,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html: String,
    /// Plain-text body.
    pub text: String,
}

/// Sends rendered email.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send one message.
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError>;
}
