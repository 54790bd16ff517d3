//! In-memory storage implementation.
//!
//! Both indexes live behind one lock, so the session-uniqueness check and the insert
//! happen in a single critical section.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use justcakes_core::{Order, OrderId};

use crate::error::{Result, StoreError};
use crate::{FulfillmentUpdate, InsertOutcome, Store};

#[derive(Default)]
struct Inner {
    orders: HashMap<OrderId, Order>,
    by_session: HashMap<String, OrderId>,
}

impl Inner {
    fn latest_for_intent(&mut self, payment_intent_id: &str) -> Option<&mut Order> {
        self.orders
            .values_mut()
            .filter(|o| o.payment_intent_id.as_deref() == Some(payment_intent_id))
            .max_by_key(|o| o.created_at)
    }
}

/// In-memory order store.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored orders.
    pub async fn len(&self) -> usize {
        self.inner.read().await.orders.len()
    }

    /// Whether the store holds no orders.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.orders.is_empty()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_order(&self, order: &Order) -> Result<InsertOutcome> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        match inner.by_session.entry(order.payment_session_id.clone()) {
            Entry::Occupied(existing) => Ok(InsertOutcome::Duplicate {
                existing_id: *existing.get(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(order.id);
                inner.orders.insert(order.id, order.clone());
                Ok(InsertOutcome::Created)
            }
        }
    }

    async fn get_order(&self, id: &OrderId) -> Result<Option<Order>> {
        Ok(self.inner.read().await.orders.get(id).cloned())
    }

    async fn get_order_by_session(&self, payment_session_id: &str) -> Result<Option<Order>> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_session
            .get(payment_session_id)
            .and_then(|id| inner.orders.get(id))
            .cloned())
    }

    async fn list_orders(&self) -> Result<Vec<Order>> {
        let mut orders: Vec<Order> = self.inner.read().await.orders.values().cloned().collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn mark_payment_failed(&self, payment_intent_id: &str) -> Result<Option<Order>> {
        let mut inner = self.inner.write().await;
        Ok(inner.latest_for_intent(payment_intent_id).map(|order| {
            order.mark_payment_failed(Utc::now());
            order.clone()
        }))
    }

    async fn mark_refunded(&self, payment_intent_id: &str) -> Result<Option<Order>> {
        let mut inner = self.inner.write().await;
        Ok(inner.latest_for_intent(payment_intent_id).map(|order| {
            order.mark_refunded(Utc::now());
            order.clone()
        }))
    }

    async fn update_fulfillment(&self, id: &OrderId, update: &FulfillmentUpdate) -> Result<Order> {
        let mut inner = self.inner.write().await;
        let order = inner.orders.get_mut(id).ok_or_else(|| StoreError::NotFound {
            entity: "order",
            id: id.to_string(),
        })?;

        let mut next = order.clone();
        update.apply(&mut next, Utc::now())?;
        *order = next.clone();
        Ok(next)
    }
}
