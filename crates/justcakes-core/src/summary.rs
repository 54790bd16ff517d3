//! Derived admin views over a full order list.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::CommerceError;
use crate::money::format_currency;
use crate::order::{FulfillmentStatus, Order, PaymentStatus};

/// Dashboard aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    /// Number of orders.
    pub total_orders: usize,
    /// Orders with fulfillment status `pending`.
    pub pending: usize,
    /// Orders with fulfillment status `processing`.
    pub processing: usize,
    /// Sum of totals over `paid` orders in the display currency.
    pub paid_revenue: Decimal,
    /// `paid_revenue` formatted for display.
    pub paid_revenue_formatted: String,
    /// Paid totals for every currency seen, keyed by lower-case code.
    pub paid_revenue_by_currency: BTreeMap<String, Decimal>,
}

impl OrderSummary {
    /// Aggregate a list of orders.
    ///
    /// `paid_revenue` only counts orders charged in `display_currency`; totals in other
    /// currencies appear in `paid_revenue_by_currency` and are never added together.
    #[must_use]
    pub fn from_orders(orders: &[Order], display_currency: &str) -> Self {
        let count = |status: FulfillmentStatus| orders.iter().filter(|o| o.status == status).count();

        let mut paid_revenue_by_currency: BTreeMap<String, Decimal> = BTreeMap::new();
        for order in orders.iter().filter(|o| o.payment_status == PaymentStatus::Paid) {
            *paid_revenue_by_currency
                .entry(order.currency.to_ascii_lowercase())
                .or_default() += order.total_amount;
        }
        let paid_revenue = paid_revenue_by_currency
            .get(&display_currency.to_ascii_lowercase())
            .copied()
            .unwrap_or_default();

        Self {
            total_orders: orders.len(),
            pending: count(FulfillmentStatus::Pending),
            processing: count(FulfillmentStatus::Processing),
            paid_revenue,
            paid_revenue_formatted: format_currency(paid_revenue, display_currency),
            paid_revenue_by_currency,
        }
    }
}

/// Status filter for the admin order list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    /// Every order.
    #[default]
    All,
    /// Orders in one fulfillment status.
    Only(FulfillmentStatus),
}

impl StatusFilter {
    /// Whether an order passes the filter.
    #[must_use]
    pub fn matches(self, order: &Order) -> bool {
        match self {
            Self::All => true,
            Self::Only(status) => order.status == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "all" => Ok(Self::All),
            other => other.parse().map(Self::Only),
        }
    }
}

/// Keep the orders that pass `filter`, preserving order.
#[must_use]
pub fn filter_by_status(orders: Vec<Order>, filter: StatusFilter) -> Vec<Order> {
    orders.into_iter().filter(|o| filter.matches(o)).collect()
}
