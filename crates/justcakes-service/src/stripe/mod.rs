//! Stripe integration: checkout sessions and signed webhooks.

mod client;
pub mod types;
pub mod webhook;

pub use client::{StripeClient, StripeError};
pub use types::{CheckoutLineItem, CheckoutSession, NewCheckoutSession};
pub use webhook::{verify_signature, PaymentEvent, SignatureError, SIGNATURE_HEADER};
