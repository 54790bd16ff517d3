//! Just Cakes order service.
//!
//! This crate provides the HTTP API for the storefront's order lifecycle:
//!
//! - Catalog lookup
//! - Checkout session creation with the payment provider
//! - The signed payment webhook that creates and updates orders
//! - Order confirmation emails
//! - Custom quote requests forwarded to the business by email
//! - Admin order views and fulfillment updates
//!
//! # Authentication
//!
//! Admin endpoints accept an HS256 token issued by `POST /v1/admin/auth`, either as the
//! `admin_token` cookie or as an `Authorization: Bearer` header. Webhooks are
//! authenticated by the provider's HMAC signature instead.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)]

pub mod auth;
pub mod config;
pub mod crypto;
pub mod email;
pub mod error;
pub mod handlers;
pub mod lifecycle;
pub mod notifications;
pub mod routes;
pub mod state;
pub mod stripe;

pub use config::ServiceConfig;
pub use email::{EmailError, HttpMailer, Mailer, OutgoingEmail};
pub use error::ApiError;
pub use lifecycle::{LifecycleOutcome, OrderLifecycle};
pub use notifications::{DispatchReport, NotificationDispatcher, SendOutcome};
pub use routes::create_router;
pub use state::AppState;
pub use stripe::{StripeClient, StripeError};
