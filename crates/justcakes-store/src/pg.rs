//! PostgreSQL storage implementation.
//!
//! Session uniqueness is enforced by the `orders_payment_session_id_key` constraint;
//! inserts use `ON CONFLICT DO NOTHING` so a replayed webhook never races a
//! check-then-insert.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use justcakes_core::{FulfillmentStatus, Order, OrderId, OrderItem, PaymentStatus};

use crate::error::{Result, StoreError};
use crate::schema::{order_columns, orders, ORDERS};
use crate::{FulfillmentUpdate, InsertOutcome, Store};

/// Default connection pool size.
const MAX_CONNECTIONS: u32 = 10;

/// PostgreSQL-backed order store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the database and run pending migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or a migration fails.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(database_url)
            .await?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Run the embedded migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if a migration fails.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    /// The underlying pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_one_where(&self, column: &str, value: &str) -> Result<Option<Order>> {
        let query = format!(
            "SELECT {} FROM {ORDERS} WHERE {column} = $1 ORDER BY {} DESC LIMIT 1",
            order_columns(),
            orders::CREATED_AT
        );
        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(order_from_row).transpose()
    }

    /// Run a conditional payment-status update on the latest order for an intent.
    async fn update_by_intent(&self, payment_intent_id: &str, set_and_guard: &str) -> Result<Option<Order>> {
        let Some(order) = self
            .fetch_one_where(orders::PAYMENT_INTENT_ID, payment_intent_id)
            .await?
        else {
            return Ok(None);
        };

        let query = format!(
            "UPDATE {ORDERS} SET {set_and_guard}",
        );
        let result = sqlx::query(&query)
            .bind(order.id.as_uuid())
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        tracing::debug!(
            order_id = %order.id,
            rows = result.rows_affected(),
            "Payment status update applied"
        );

        self.get_order(&order.id).await
    }
}

fn order_from_row(row: &PgRow) -> Result<Order> {
    let id: uuid::Uuid = row.try_get(orders::ID)?;
    let items: Json<Vec<OrderItem>> = row.try_get(orders::ORDER_ITEMS)?;
    let payment_status: String = row.try_get(orders::PAYMENT_STATUS)?;
    let status: String = row.try_get(orders::STATUS)?;
    let total_amount: Decimal = row.try_get(orders::TOTAL_AMOUNT)?;
    let delivery_date: Option<NaiveDate> = row.try_get(orders::DELIVERY_DATE)?;
    let created_at: DateTime<Utc> = row.try_get(orders::CREATED_AT)?;
    let updated_at: DateTime<Utc> = row.try_get(orders::UPDATED_AT)?;

    Ok(Order {
        id: OrderId::from_uuid(id),
        payment_session_id: row.try_get(orders::PAYMENT_SESSION_ID)?,
        payment_intent_id: row.try_get(orders::PAYMENT_INTENT_ID)?,
        customer_email: row.try_get(orders::CUSTOMER_EMAIL)?,
        customer_name: row.try_get(orders::CUSTOMER_NAME)?,
        customer_phone: row.try_get(orders::CUSTOMER_PHONE)?,
        order_items: items.0,
        total_amount,
        currency: row.try_get(orders::CURRENCY)?,
        shipping_address: row.try_get(orders::SHIPPING_ADDRESS)?,
        billing_address: row.try_get(orders::BILLING_ADDRESS)?,
        payment_status: payment_status
            .parse::<PaymentStatus>()
            .map_err(|e| StoreError::Serialization(e.to_string()))?,
        status: status
            .parse::<FulfillmentStatus>()
            .map_err(|e| StoreError::Serialization(e.to_string()))?,
        delivery_date,
        notes: row.try_get(orders::NOTES)?,
        tracking_number: row.try_get(orders::TRACKING_NUMBER)?,
        created_at,
        updated_at,
    })
}

#[async_trait]
impl Store for PgStore {
    async fn insert_order(&self, order: &Order) -> Result<InsertOutcome> {
        let placeholders = (1..=orders::ALL.len())
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!(
            "INSERT INTO {ORDERS} ({}) VALUES ({placeholders}) ON CONFLICT ({}) DO NOTHING",
            order_columns(),
            orders::PAYMENT_SESSION_ID
        );

        let result = sqlx::query(&query)
            .bind(order.id.as_uuid())
            .bind(&order.payment_session_id)
            .bind(&order.payment_intent_id)
            .bind(&order.customer_email)
            .bind(&order.customer_name)
            .bind(&order.customer_phone)
            .bind(Json(&order.order_items))
            .bind(order.total_amount)
            .bind(&order.currency)
            .bind(&order.shipping_address)
            .bind(&order.billing_address)
            .bind(order.payment_status.as_str())
            .bind(order.status.as_str())
            .bind(order.delivery_date)
            .bind(&order.notes)
            .bind(&order.tracking_number)
            .bind(order.created_at)
            .bind(order.updated_at)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 1 {
            return Ok(InsertOutcome::Created);
        }

        let existing = self
            .get_order_by_session(&order.payment_session_id)
            .await?
            .ok_or_else(|| {
                StoreError::Conflict(format!(
                    "insert skipped but no order for session {}",
                    order.payment_session_id
                ))
            })?;
        Ok(InsertOutcome::Duplicate {
            existing_id: existing.id,
        })
    }

    async fn get_order(&self, id: &OrderId) -> Result<Option<Order>> {
        let query = format!(
            "SELECT {} FROM {ORDERS} WHERE {} = $1",
            order_columns(),
            orders::ID
        );
        let row = sqlx::query(&query)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(order_from_row).transpose()
    }

    async fn get_order_by_session(&self, payment_session_id: &str) -> Result<Option<Order>> {
        self.fetch_one_where(orders::PAYMENT_SESSION_ID, payment_session_id)
            .await
    }

    async fn list_orders(&self) -> Result<Vec<Order>> {
        let query = format!(
            "SELECT {} FROM {ORDERS} ORDER BY {} DESC",
            order_columns(),
            orders::CREATED_AT
        );
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        rows.iter().map(order_from_row).collect()
    }

    async fn mark_payment_failed(&self, payment_intent_id: &str) -> Result<Option<Order>> {
        let set_and_guard = format!(
            "{ps} = 'failed', {upd} = $2 WHERE {id} = $1 AND {ps} IN ('unpaid', 'paid')",
            ps = orders::PAYMENT_STATUS,
            upd = orders::UPDATED_AT,
            id = orders::ID,
        );
        self.update_by_intent(payment_intent_id, &set_and_guard).await
    }

    async fn mark_refunded(&self, payment_intent_id: &str) -> Result<Option<Order>> {
        let set_and_guard = format!(
            "{ps} = 'refunded', {st} = 'cancelled', {upd} = $2 \
             WHERE {id} = $1 AND NOT ({ps} = 'refunded' AND {st} = 'cancelled')",
            ps = orders::PAYMENT_STATUS,
            st = orders::STATUS,
            upd = orders::UPDATED_AT,
            id = orders::ID,
        );
        self.update_by_intent(payment_intent_id, &set_and_guard).await
    }

    async fn update_fulfillment(&self, id: &OrderId, update: &FulfillmentUpdate) -> Result<Order> {
        let current = self.get_order(id).await?.ok_or_else(|| StoreError::NotFound {
            entity: "order",
            id: id.to_string(),
        })?;

        let mut next = current.clone();
        if !update.apply(&mut next, Utc::now())? {
            return Ok(current);
        }

        // Compare-and-set on the status we validated the transition against.
        let query = format!(
            "UPDATE {ORDERS} SET {st} = $1, {tn} = $2, {notes} = $3, {upd} = $4 \
             WHERE {id} = $5 AND {st} = $6",
            st = orders::STATUS,
            tn = orders::TRACKING_NUMBER,
            notes = orders::NOTES,
            upd = orders::UPDATED_AT,
            id = orders::ID,
        );
        let result = sqlx::query(&query)
            .bind(next.status.as_str())
            .bind(&next.tracking_number)
            .bind(&next.notes)
            .bind(next.updated_at)
            .bind(id.as_uuid())
            .bind(current.status.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict(format!(
                "order {id} changed status concurrently"
            )));
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use justcakes_core::NewOrder;
    use rust_decimal_macros::dec;

    async fn store() -> PgStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        PgStore::connect(&url).await.expect("connect")
    }

    fn order(session: &str, intent: &str) -> Order {
        NewOrder {
            payment_session_id: session.into(),
            payment_intent_id: Some(intent.into()),
            customer_email: "c@example.com".into(),
            customer_name: Some("Ada".into()),
            customer_phone: None,
            order_items: Vec::new(),
            total_amount: dec!(91.98),
            currency: "usd".into(),
            shipping_address: Some(serde_json::json!({"city": "Toronto"})),
            billing_address: None,
            payment_status: PaymentStatus::Paid,
            delivery_date: NaiveDate::from_ymd_opt(2030, 1, 2),
        }
        .into_order(OrderId::generate(), Utc::now())
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL"]
    async fn insert_is_idempotent_per_session() {
        let store = store().await;
        let session = format!("cs_pg_{}", OrderId::generate());
        let first = order(&session, "pi_pg_1");

        assert_eq!(store.insert_order(&first).await.unwrap(), InsertOutcome::Created);
        assert_eq!(
            store.insert_order(&order(&session, "pi_pg_1")).await.unwrap(),
            InsertOutcome::Duplicate {
                existing_id: first.id
            }
        );

        let stored = store.get_order(&first.id).await.unwrap().unwrap();
        assert_eq!(stored.total_amount, dec!(91.98));
        assert_eq!(stored.shipping_address, first.shipping_address);
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL"]
    async fn refund_cancels_by_intent() {
        let store = store().await;
        let intent = format!("pi_pg_{}", OrderId::generate());
        let order = order(&format!("cs_pg_{}", OrderId::generate()), &intent);
        store.insert_order(&order).await.unwrap();

        let refunded = store.mark_refunded(&intent).await.unwrap().unwrap();
        assert_eq!(refunded.payment_status, PaymentStatus::Refunded);
        assert_eq!(refunded.status, FulfillmentStatus::Cancelled);

        let after_fail = store.mark_payment_failed(&intent).await.unwrap().unwrap();
        assert_eq!(after_fail.payment_status, PaymentStatus::Refunded);
    }
}
