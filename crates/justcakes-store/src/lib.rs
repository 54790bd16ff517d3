//! Order storage for the Just Cakes order service.
//!
//! Orders are keyed internally by [`OrderId`] and correlated with the payment provider
//! by their checkout session ID, which is unique. Webhook deliveries are at-least-once,
//! so [`Store::insert_order`] is an atomic conditional insert: a second insert for the
//! same session reports [`InsertOutcome::Duplicate`] instead of creating a row or
//! failing.
//!
//! Two backends are provided:
//!
//! - [`MemoryStore`]: in-process maps behind a lock, for tests and local runs
//! - [`PgStore`]: PostgreSQL via `sqlx`, with the unique constraint enforced by the database
//!
//! # Example
//!
//! ```no_run
//! use justcakes_store::{InsertOutcome, MemoryStore, Store};
//! # async fn demo(order: justcakes_core::Order) -> justcakes_store::Result<()> {
//! let store = MemoryStore::new();
//! assert_eq!(store.insert_order(&order).await?, InsertOutcome::Created);
//! assert!(matches!(store.insert_order(&order).await?, InsertOutcome::Duplicate { .. }));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod memory;
pub mod pg;
pub mod schema;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use pg::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use justcakes_core::{CommerceError, FulfillmentStatus, Order, OrderId};

/// Result of a conditional insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new row was written.
    Created,
    /// An order for the same payment session already exists; nothing was written.
    Duplicate {
        /// The existing order.
        existing_id: OrderId,
    },
}

/// Admin-driven changes to an order's fulfillment fields.
///
/// Unset fields are left alone. An empty string clears a text field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentUpdate {
    /// New fulfillment status.
    #[serde(default)]
    pub status: Option<FulfillmentStatus>,
    /// New tracking number.
    #[serde(default)]
    pub tracking_number: Option<String>,
    /// New admin notes.
    #[serde(default)]
    pub notes: Option<String>,
}

impl FulfillmentUpdate {
    /// Whether the update carries no changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.tracking_number.is_none() && self.notes.is_none()
    }

    /// Apply the update to an order in memory.
    ///
    /// Returns whether anything changed.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::InvalidTransition` if the status change is not allowed;
    /// the order is left untouched in that case.
    pub fn apply(&self, order: &mut Order, now: DateTime<Utc>) -> std::result::Result<bool, CommerceError> {
        if let Some(next) = self.status {
            if next != order.status && !order.status.can_transition_to(next) {
                return Err(CommerceError::InvalidTransition {
                    from: order.status,
                    to: next,
                });
            }
        }

        let mut changed = match self.status {
            Some(next) => order.transition_to(next, now)?,
            None => false,
        };
        changed |= set_text(&mut order.tracking_number, self.tracking_number.as_deref());
        changed |= set_text(&mut order.notes, self.notes.as_deref());

        if changed {
            order.updated_at = now;
        }
        Ok(changed)
    }
}

fn set_text(field: &mut Option<String>, value: Option<&str>) -> bool {
    let Some(value) = value else {
        return false;
    };
    let next = Some(value.trim().to_string()).filter(|v| !v.is_empty());
    if *field == next {
        return false;
    }
    *field = next;
    true
}

/// The storage trait defining all order operations.
///
/// This trait abstracts the storage layer, allowing for different implementations
/// (e.g., PostgreSQL, in-memory for testing).
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert an order unless one already exists for its payment session.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails. A duplicate session is not
    /// an error.
    async fn insert_order(&self, order: &Order) -> Result<InsertOutcome>;

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_order(&self, id: &OrderId) -> Result<Option<Order>>;

    /// Get an order by its payment session ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_order_by_session(&self, payment_session_id: &str) -> Result<Option<Order>>;

    /// List every order, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_orders(&self) -> Result<Vec<Order>>;

    /// Mark the most recent order for a payment intent as failed.
    ///
    /// Returns the order after the update, or `None` if no order references the
    /// payment intent. Refunded orders are returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn mark_payment_failed(&self, payment_intent_id: &str) -> Result<Option<Order>>;

    /// Mark the most recent order for a payment intent as refunded and cancelled.
    ///
    /// Returns the order after the update, or `None` if no order references the
    /// payment intent.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn mark_refunded(&self, payment_intent_id: &str) -> Result<Option<Order>>;

    /// Apply an admin fulfillment update.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the order doesn't exist.
    /// - `StoreError::Rejected` if the status transition is not allowed.
    /// - `StoreError::Conflict` if the order changed status concurrently.
    async fn update_fulfillment(&self, id: &OrderId, update: &FulfillmentUpdate) -> Result<Order>;
}
