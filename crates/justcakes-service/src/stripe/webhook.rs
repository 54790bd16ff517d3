//! Webhook signature verification and event classification.
//!
//! The signature header has the form `t=<unix>,v1=<hex>[,v1=<hex>...]`. The signed
//! payload is the timestamp, a `.`, and the raw request body exactly as received.

use super::types::{ChargeObject, CompletedSession, Event, PaymentIntentObject};
use crate::crypto::{constant_time_eq, hmac_sha256_hex};

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Why a webhook failed authentication.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    /// No signature header was sent.
    #[error("missing signature header")]
    MissingHeader,

    /// The header has no parseable timestamp.
    #[error("signature header has no timestamp")]
    MissingTimestamp,

    /// The header has no `v1` signatures.
    #[error("signature header has no v1 signatures")]
    NoSignatures,

    /// The signed timestamp is older than the tolerance.
    #[error("signature timestamp outside tolerance ({age}s old)")]
    Expired {
        /// Age of the signature in seconds.
        age: i64,
    },

    /// No `v1` signature matched.
    #[error("signature mismatch")]
    Mismatch,
}

/// Verify a webhook signature against the raw body.
///
/// # Errors
///
/// Returns the first check that failed. The body must not be re-serialized before
/// calling this.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_seconds: u64,
    now: i64,
) -> Result<(), SignatureError> {
    let mut timestamp: Option<i64> = None;
    let mut signatures: Vec<&str> = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", ts)) => timestamp = ts.parse().ok(),
            Some(("v1", sig)) => signatures.push(sig),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::MissingTimestamp)?;
    if signatures.is_empty() {
        return Err(SignatureError::NoSignatures);
    }

    let age = now.saturating_sub(timestamp);
    if age > i64::try_from(tolerance_seconds).unwrap_or(i64::MAX) {
        return Err(SignatureError::Expired { age });
    }

    let expected = hmac_sha256_hex(
        secret.as_bytes(),
        &[timestamp.to_string().as_bytes(), b".".as_slice(), payload],
    );

    if signatures
        .iter()
        .any(|sig| constant_time_eq(expected.as_bytes(), sig.as_bytes()))
    {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}

/// Build a valid signature header for a payload. Used to sign test deliveries.
#[must_use]
pub fn signature_header(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let signature = hmac_sha256_hex(
        secret.as_bytes(),
        &[timestamp.to_string().as_bytes(), b".".as_slice(), payload],
    );
    format!("t={timestamp},v1={signature}")
}

/// The events this service acts on.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentEvent {
    /// `checkout.session.completed`.
    CheckoutCompleted(Box<CompletedSession>),
    /// `payment_intent.succeeded`; logged only.
    PaymentSucceeded {
        /// Payment intent ID.
        payment_intent_id: String,
    },
    /// `payment_intent.payment_failed`.
    PaymentFailed {
        /// Payment intent ID.
        payment_intent_id: String,
    },
    /// `charge.refunded`.
    ChargeRefunded {
        /// Charge ID.
        charge_id: String,
        /// Payment intent the charge belongs to, if any.
        payment_intent_id: Option<String>,
    },
    /// Any other event type; acknowledged and ignored.
    Unhandled {
        /// The event type.
        event_type: String,
    },
}

impl PaymentEvent {
    /// Classify a verified event.
    ///
    /// # Errors
    ///
    /// Returns an error if a recognised event's object does not have the expected shape.
    pub fn from_event(event: Event) -> Result<Self, serde_json::Error> {
        let object = event.data.object;
        Ok(match event.event_type.as_str() {
            "checkout.session.completed" => {
                Self::CheckoutCompleted(Box::new(serde_json::from_value(object)?))
            }
            "payment_intent.succeeded" => {
                let intent: PaymentIntentObject = serde_json::from_value(object)?;
                Self::PaymentSucceeded {
                    payment_intent_id: intent.id,
                }
            }
            "payment_intent.payment_failed" => {
                let intent: PaymentIntentObject = serde_json::from_value(object)?;
                Self::PaymentFailed {
                    payment_intent_id: intent.id,
                }
            }
            "charge.refunded" => {
                let charge: ChargeObject = serde_json::from_value(object)?;
                Self::ChargeRefunded {
                    charge_id: charge.id,
                    payment_intent_id: charge.payment_intent.map(|pi| pi.id().to_string()),
                }
            }
            _ => Self::Unhandled {
                event_type: event.event_type,
            },
        })
    }
}
