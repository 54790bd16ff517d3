//! Core types and utilities for the Just Cakes storefront.
//!
//! This crate provides the domain types shared by the storage layer and the HTTP service:
//!
//! - **Identifiers**: `OrderId`, `ProductId`
//! - **Catalog**: `Product`, `ProductType`, `Catalog`, `StaticCatalog`
//! - **Cart**: `Cart`, `CartItem`, `CheckoutItem`, `PricedLine`
//! - **Orders**: `Order`, `OrderItem`, `PaymentStatus`, `FulfillmentStatus`
//! - **Views**: `OrderSummary`, `StatusFilter`
//! - **Quotes**: `QuoteRequest`
//!
//! # Money
//!
//! Prices are held as `Decimal` in major currency units (pounds, dollars). The payment
//! provider works in minor units (pence, cents) as `i64`; conversions live in [`money`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod cart;
pub mod catalog;
pub mod error;
pub mod ids;
pub mod money;
pub mod order;
pub mod quote;
pub mod seed;
pub mod summary;

pub use cart::{
    price_lines, validate_delivery_date, Cart, CartItem, CheckoutItem, CustomOptions, PricedLine,
};
pub use catalog::{Catalog, Product, ProductFilter, ProductType, StaticCatalog};
pub use error::{CommerceError, Result};
pub use ids::{IdError, OrderId, ProductId};
pub use money::{format_currency, from_minor_units, to_minor_units};
pub use order::{FulfillmentStatus, NewOrder, Order, OrderItem, PaymentStatus};
pub use quote::{occasion_label, QuoteRequest};
pub use summary::{filter_by_status, OrderSummary, StatusFilter};
