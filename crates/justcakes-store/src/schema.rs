//! Table and column names shared by the SQL backend and its migrations.

/// Orders table.
pub const ORDERS: &str = "orders";

/// Columns in the orders table, in select order.
pub mod orders {
    /// Primary key.
    pub const ID: &str = "id";
    /// Provider checkout session ID, unique.
    pub const PAYMENT_SESSION_ID: &str = "payment_session_id";
    /// Provider payment intent ID, indexed.
    pub const PAYMENT_INTENT_ID: &str = "payment_intent_id";
    /// Customer email.
    pub const CUSTOMER_EMAIL: &str = "customer_email";
    /// Customer name.
    pub const CUSTOMER_NAME: &str = "customer_name";
    /// Customer phone.
    pub const CUSTOMER_PHONE: &str = "customer_phone";
    /// JSON array of purchased lines.
    pub const ORDER_ITEMS: &str = "order_items";
    /// Total in major units.
    pub const TOTAL_AMOUNT: &str = "total_amount";
    /// Currency code.
    pub const CURRENCY: &str = "currency";
    /// Shipping address JSON.
    pub const SHIPPING_ADDRESS: &str = "shipping_address";
    /// Billing address JSON.
    pub const BILLING_ADDRESS: &str = "billing_address";
    /// Payment status.
    pub const PAYMENT_STATUS: &str = "payment_status";
    /// Fulfillment status.
    pub const STATUS: &str = "status";
    /// Requested delivery date.
    pub const DELIVERY_DATE: &str = "delivery_date";
    /// Admin notes.
    pub const NOTES: &str = "notes";
    /// Courier tracking number.
    pub const TRACKING_NUMBER: &str = "tracking_number";
    /// Creation time.
    pub const CREATED_AT: &str = "created_at";
    /// Last update time.
    pub const UPDATED_AT: &str = "updated_at";

    /// Every column, in the order the SQL backend selects them.
    pub const ALL: [&str; 18] = [
        ID,
        PAYMENT_SESSION_ID,
        PAYMENT_INTENT_ID,
        CUSTOMER_EMAIL,
        CUSTOMER_NAME,
        CUSTOMER_PHONE,
        ORDER_ITEMS,
        TOTAL_AMOUNT,
        CURRENCY,
        SHIPPING_ADDRESS,
        BILLING_ADDRESS,
        PAYMENT_STATUS,
        STATUS,
        DELIVERY_DATE,
        NOTES,
        TRACKING_NUMBER,
        CREATED_AT,
        UPDATED_AT,
    ];
}

/// Comma-separated column list for `SELECT`.
#[must_use]
pub fn order_columns() -> String {
    orders::ALL.join(", ")
}
