//! Error types for storefront domain logic.

use crate::order::FulfillmentStatus;

/// Result type for storefront operations.
pub type Result<T> = std::result::Result<T, CommerceError>;

/// Errors raised by cart validation, pricing and order state transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommerceError {
    /// Checkout was attempted with no items.
    #[error("cart is empty")]
    EmptyCart,

    /// A cart line has a quantity below one.
    #[error("invalid quantity for item {item_id}")]
    InvalidQuantity {
        /// The offending product ID.
        item_id: String,
    },

    /// A cart line has a zero, negative or unrepresentable price.
    #[error("invalid price for item {item_id}")]
    InvalidPrice {
        /// The offending product ID.
        item_id: String,
    },

    /// A cart line refers to a catalog product that is not for sale.
    #[error("product is unavailable: {item_id}")]
    UnavailableProduct {
        /// The offending product ID.
        item_id: String,
    },

    /// An amount does not fit the provider's integer representation.
    #[error("amount out of range: {0}")]
    AmountOutOfRange(String),

    /// The requested delivery date is not a `YYYY-MM-DD` date.
    #[error("invalid delivery date: {0}")]
    InvalidDeliveryDate(String),

    /// The requested delivery date is earlier than the allowed lead time.
    #[error("delivery date must be on or after {earliest}")]
    DeliveryTooSoon {
        /// The earliest acceptable date.
        earliest: chrono::NaiveDate,
    },

    /// A fulfillment status change is not allowed from the current status.
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: FulfillmentStatus,
        /// The requested status.
        to: FulfillmentStatus,
    },

    /// A status string did not name a known status.
    #[error("unknown status: {0}")]
    UnknownStatus(String),

    /// A product type string did not name a known type.
    #[error("unknown product type: {0}")]
    UnknownProductType(String),

    /// A quote request is missing its occasion, servings or description.
    #[error("missing required fields")]
    MissingQuoteFields,

    /// A quote request asks for an unsupported number of servings.
    #[error("servings must be between 1 and 500, got {servings}")]
    InvalidServings {
        /// The requested servings.
        servings: i64,
    },

    /// A quote request's description is too short to act on.
    #[error("description must be at least {min} characters")]
    DescriptionTooShort {
        /// Minimum length in characters.
        min: usize,
    },

    /// A catalog document could not be parsed.
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),
}
