//! The order record and its payment and fulfillment state machines.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::PricedLine;
use crate::error::{CommerceError, Result};
use crate::ids::{OrderId, ProductId};
use crate::money::from_minor_units;

/// A purchased line, denormalized from the cart at payment time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Product ID.
    pub id: ProductId,
    /// Product name as it was when bought.
    pub name: String,
    /// Number of units.
    pub quantity: u32,
    /// Unit price in major units, as it was when bought.
    pub price: Decimal,
}

impl From<&PricedLine> for OrderItem {
    fn from(line: &PricedLine) -> Self {
        Self {
            id: line.id.clone(),
            name: line.name.clone(),
            quantity: line.quantity,
            price: from_minor_units(line.unit_amount),
        }
    }
}

/// Payment state, driven by provider webhooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Session completed without a captured payment.
    Unpaid,
    /// Payment captured.
    Paid,
    /// Payment attempt failed.
    Failed,
    /// Charge refunded.
    Refunded,
}

impl PaymentStatus {
    /// Wire and database name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "unpaid" => Ok(Self::Unpaid),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            other => Err(CommerceError::UnknownStatus(other.to_string())),
        }
    }
}

/// Fulfillment state, driven by the admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FulfillmentStatus {
    /// Paid for, not yet started.
    Pending,
    /// Being baked or prepared.
    Processing,
    /// Ready for collection or dispatch.
    Completed,
    /// Handed to the courier.
    Shipped,
    /// Received by the customer.
    Delivered,
    /// Will not be fulfilled.
    Cancelled,
}

impl FulfillmentStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Processing,
        Self::Completed,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Wire and database name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// No further admin transitions are allowed.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether the admin may move an order from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        use FulfillmentStatus::{Cancelled, Completed, Delivered, Pending, Processing, Shipped};
        matches!(
            (self, next),
            (Pending, Processing | Cancelled)
                | (Processing, Completed | Shipped | Cancelled)
                | (Completed, Shipped)
                | (Shipped, Delivered)
        )
    }
}

impl fmt::Display for FulfillmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FulfillmentStatus {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CommerceError::UnknownStatus(s.to_string()))
    }
}

/// An order about to be inserted. The store assigns nothing; the caller supplies
/// the ID and timestamps via [`NewOrder::into_order`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    /// Provider checkout session ID. Unique across orders.
    pub payment_session_id: String,
    /// Provider payment intent ID, when the session reported one.
    pub payment_intent_id: Option<String>,
    /// Customer email. Empty when the provider reported none.
    pub customer_email: String,
    /// Customer name.
    pub customer_name: Option<String>,
    /// Customer phone.
    pub customer_phone: Option<String>,
    /// Purchased lines.
    pub order_items: Vec<OrderItem>,
    /// Provider-reported total in major units.
    pub total_amount: Decimal,
    /// Lower-case ISO currency code.
    pub currency: String,
    /// Shipping address as reported by the provider.
    pub shipping_address: Option<serde_json::Value>,
    /// Billing address as reported by the provider.
    pub billing_address: Option<serde_json::Value>,
    /// Initial payment status.
    pub payment_status: PaymentStatus,
    /// Requested delivery date.
    pub delivery_date: Option<NaiveDate>,
}

impl NewOrder {
    /// Stamp the order with an ID and creation time. Fulfillment starts at `pending`.
    #[must_use]
    pub fn into_order(self, id: OrderId, now: DateTime<Utc>) -> Order {
        Order {
            id,
            payment_session_id: self.payment_session_id,
            payment_intent_id: self.payment_intent_id,
            customer_email: self.customer_email,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            order_items: self.order_items,
            total_amount: self.total_amount,
            currency: self.currency,
            shipping_address: self.shipping_address,
            billing_address: self.billing_address,
            payment_status: self.payment_status,
            status: FulfillmentStatus::Pending,
            delivery_date: self.delivery_date,
            notes: None,
            tracking_number: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Internal ID.
    pub id: OrderId,
    /// Provider checkout session ID. Unique across orders.
    pub payment_session_id: String,
    /// Provider payment intent ID.
    pub payment_intent_id: Option<String>,
    /// Customer email.
    pub customer_email: String,
    /// Customer name.
    pub customer_name: Option<String>,
    /// Customer phone.
    pub customer_phone: Option<String>,
    /// Purchased lines.
    pub order_items: Vec<OrderItem>,
    /// Provider-reported total in major units.
    pub total_amount: Decimal,
    /// Lower-case ISO currency code.
    pub currency: String,
    /// Shipping address as reported by the provider.
    pub shipping_address: Option<serde_json::Value>,
    /// Billing address as reported by the provider.
    pub billing_address: Option<serde_json::Value>,
    /// Payment state.
    pub payment_status: PaymentStatus,
    /// Fulfillment state.
    pub status: FulfillmentStatus,
    /// Requested delivery date.
    pub delivery_date: Option<NaiveDate>,
    /// Admin notes.
    pub notes: Option<String>,
    /// Courier tracking number.
    pub tracking_number: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Record a failed payment. A refunded order stays refunded.
    ///
    /// Returns whether anything changed.
    pub fn mark_payment_failed(&mut self, now: DateTime<Utc>) -> bool {
        match self.payment_status {
            PaymentStatus::Failed | PaymentStatus::Refunded => false,
            PaymentStatus::Unpaid | PaymentStatus::Paid => {
                self.payment_status = PaymentStatus::Failed;
                self.updated_at = now;
                true
            }
        }
    }

    /// Record a refund. Refunds always cancel fulfillment.
    ///
    /// Returns whether anything changed.
    pub fn mark_refunded(&mut self, now: DateTime<Utc>) -> bool {
        if self.payment_status == PaymentStatus::Refunded
            && self.status == FulfillmentStatus::Cancelled
        {
            return false;
        }
        self.payment_status = PaymentStatus::Refunded;
        self.status = FulfillmentStatus::Cancelled;
        self.updated_at = now;
        true
    }

    /// Move fulfillment to `next`. Setting the current status is a no-op.
    ///
    /// Returns whether the status changed.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::InvalidTransition` if the move is not allowed.
    pub fn transition_to(&mut self, next: FulfillmentStatus, now: DateTime<Utc>) -> Result<bool> {
        if self.status == next {
            return Ok(false);
        }
        if !self.status.can_transition_to(next) {
            return Err(CommerceError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = now;
        Ok(true)
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.order_items.iter().map(|i| u64::from(i.quantity)).sum()
    }
}
