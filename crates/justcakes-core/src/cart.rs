//! Cart aggregation and checkout pricing.
//!
//! The cart is client-held state; the server only ever sees it as a list of
//! [`CheckoutItem`]s in a checkout request. [`price_lines`] is the validation and
//! minor-unit pricing step that runs before any provider call.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::error::{CommerceError, Result};
use crate::ids::ProductId;
use crate::money::to_minor_units;

/// Per-item customisation, currently the flavour picks for letterbox cakes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomOptions {
    /// Selected flavours.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flavours: Option<Vec<String>>,
}

impl CustomOptions {
    /// Options with the given flavour picks.
    #[must_use]
    pub fn flavours<I, S>(flavours: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            flavours: Some(flavours.into_iter().map(Into::into).collect()),
        }
    }
}

/// Whether two option sets describe the same cart line.
///
/// Both absent match. One absent never matches. If either side has no flavour list
/// the options match; otherwise flavour lists are compared ignoring order.
#[must_use]
pub fn options_match(a: Option<&CustomOptions>, b: Option<&CustomOptions>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => match (&a.flavours, &b.flavours) {
            (Some(fa), Some(fb)) => {
                let mut fa: Vec<&str> = fa.iter().map(String::as_str).collect();
                let mut fb: Vec<&str> = fb.iter().map(String::as_str).collect();
                fa.sort_unstable();
                fb.sort_unstable();
                fa == fb
            }
            _ => true,
        },
        _ => false,
    }
}

/// One line in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product ID.
    pub id: ProductId,
    /// Product name at the time it was added.
    pub name: String,
    /// Product description.
    pub description: String,
    /// Unit price in major units.
    pub price: Decimal,
    /// Product image.
    pub image: String,
    /// Number of units.
    pub quantity: u32,
    /// Line customisation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_options: Option<CustomOptions>,
}

impl CartItem {
    fn is_line(&self, id: &ProductId, options: Option<&CustomOptions>) -> bool {
        &self.id == id && options_match(self.custom_options.as_ref(), options)
    }
}

/// An explicit, passed-around cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Add one unit of a product. A matching line has its quantity bumped, otherwise
    /// a new line is appended.
    pub fn add(&mut self, product: &Product, options: Option<CustomOptions>) {
        if let Some(line) = self
            .items
            .iter_mut()
            .find(|item| item.is_line(&product.id, options.as_ref()))
        {
            line.quantity = line.quantity.saturating_add(1);
            return;
        }

        self.items.push(CartItem {
            id: product.id.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            image: product.image.clone(),
            quantity: 1,
            custom_options: options,
        });
    }

    /// Remove every line matching the product and options.
    pub fn remove(&mut self, id: &ProductId, options: Option<&CustomOptions>) {
        self.items.retain(|item| !item.is_line(id, options));
    }

    /// Set the quantity of matching lines. Zero removes them.
    pub fn update_quantity(&mut self, id: &ProductId, quantity: u32, options: Option<&CustomOptions>) {
        if quantity == 0 {
            self.remove(id, options);
            return;
        }
        for item in self.items.iter_mut().filter(|item| item.is_line(id, options)) {
            item.quantity = quantity;
        }
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of unit price times quantity, in major units.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.items
            .iter()
            .map(|item| item.price * Decimal::from(item.quantity))
            .sum()
    }

    /// The checkout request payload for this cart.
    #[must_use]
    pub fn to_checkout_items(&self) -> Vec<CheckoutItem> {
        self.items
            .iter()
            .map(|item| CheckoutItem {
                id: item.id.clone(),
                name: item.name.clone(),
                description: Some(item.description.clone()).filter(|d| !d.is_empty()),
                price: item.price,
                image: Some(item.image.clone()).filter(|i| !i.is_empty()),
                quantity: i64::from(item.quantity),
                custom_options: item.custom_options.clone(),
            })
            .collect()
    }
}

/// A cart line as submitted to checkout.
///
/// Quantity is signed so that zero and negative values reach validation instead of
/// failing deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItem {
    /// Product ID.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Product description.
    #[serde(default)]
    pub description: Option<String>,
    /// Unit price in major units.
    pub price: Decimal,
    /// Product image path or URL.
    #[serde(default)]
    pub image: Option<String>,
    /// Number of units.
    pub quantity: i64,
    /// Line customisation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_options: Option<CustomOptions>,
}

/// A validated checkout line priced in minor units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    /// Product ID.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Product description, if non-empty.
    pub description: Option<String>,
    /// Product image, if non-empty.
    pub image: Option<String>,
    /// Unit price in minor units.
    pub unit_amount: i64,
    /// Number of units.
    pub quantity: u32,
}

impl PricedLine {
    /// `unit_amount × quantity`.
    #[must_use]
    pub fn line_amount(&self) -> i64 {
        self.unit_amount.saturating_mul(i64::from(self.quantity))
    }
}

/// Validate checkout lines and convert their prices to minor units.
///
/// # Errors
///
/// - `EmptyCart` if `items` is empty
/// - `InvalidQuantity` if a quantity is below one or unreasonably large
/// - `InvalidPrice` if a price rounds to zero or less
/// - `AmountOutOfRange` if a price or line total overflows
pub fn price_lines(items: &[CheckoutItem]) -> Result<Vec<PricedLine>> {
    if items.is_empty() {
        return Err(CommerceError::EmptyCart);
    }

    let mut lines = Vec::with_capacity(items.len());
    let mut total: i64 = 0;
    for item in items {
        let quantity = u32::try_from(item.quantity)
            .ok()
            .filter(|q| *q >= 1)
            .ok_or_else(|| CommerceError::InvalidQuantity {
                item_id: item.id.to_string(),
            })?;

        let unit_amount = to_minor_units(item.price)?;
        if unit_amount <= 0 {
            return Err(CommerceError::InvalidPrice {
                item_id: item.id.to_string(),
            });
        }

        let line_amount = unit_amount
            .checked_mul(i64::from(quantity))
            .ok_or_else(|| CommerceError::AmountOutOfRange(item.id.to_string()))?;
        total = total
            .checked_add(line_amount)
            .ok_or_else(|| CommerceError::AmountOutOfRange("cart total".to_string()))?;

        lines.push(PricedLine {
            id: item.id.clone(),
            name: item.name.clone(),
            description: item.description.clone().filter(|d| !d.trim().is_empty()),
            image: item.image.clone().filter(|i| !i.trim().is_empty()),
            unit_amount,
            quantity,
        });
    }

    Ok(lines)
}

/// Parse a requested delivery date and enforce the minimum lead time.
///
/// # Errors
///
/// Returns `InvalidDeliveryDate` if `raw` is not `YYYY-MM-DD`, or `DeliveryTooSoon`
/// if it falls before `today + lead_days`.
pub fn validate_delivery_date(raw: &str, today: NaiveDate, lead_days: u32) -> Result<NaiveDate> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| CommerceError::InvalidDeliveryDate(raw.to_string()))?;
    let earliest = today
        .checked_add_days(Days::new(u64::from(lead_days)))
        .ok_or_else(|| CommerceError::InvalidDeliveryDate(raw.to_string()))?;

    if date < earliest {
        return Err(CommerceError::DeliveryTooSoon { earliest });
    }
    Ok(date)
}
