//! HTTP request handlers.

pub mod admin;
pub mod checkout;
pub mod health;
pub mod orders;
pub mod products;
pub mod quotes;
pub mod webhooks;
