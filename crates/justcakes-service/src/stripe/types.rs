//! Stripe API types.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Stripe Checkout session object, as returned on creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    /// Session ID.
    pub id: String,
    /// Checkout URL to redirect the customer to.
    #[serde(default)]
    pub url: Option<String>,
    /// Total amount in minor units.
    #[serde(default)]
    pub amount_total: Option<i64>,
}

/// One priced line for a new checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutLineItem {
    /// Product name.
    pub name: String,
    /// Product description.
    pub description: Option<String>,
    /// Absolute image URLs.
    pub images: Vec<String>,
    /// Unit price in minor units.
    pub unit_amount: i64,
    /// Number of units.
    pub quantity: u32,
}

/// Parameters for `POST /checkout/sessions`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCheckoutSession {
    /// Lower-case ISO currency code.
    pub currency: String,
    /// Lines to charge for.
    pub line_items: Vec<CheckoutLineItem>,
    /// Redirect after payment.
    pub success_url: String,
    /// Redirect after the customer backs out.
    pub cancel_url: String,
    /// Countries shipping addresses may be collected for.
    pub allowed_countries: Vec<String>,
    /// String-only metadata echoed back on the completed session.
    pub metadata: Vec<(String, String)>,
}

impl NewCheckoutSession {
    /// Encode as Stripe's bracketed form parameters.
    #[must_use]
    pub fn form_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("mode".to_string(), "payment".to_string()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
            ("success_url".to_string(), self.success_url.clone()),
            ("cancel_url".to_string(), self.cancel_url.clone()),
        ];

        for (i, item) in self.line_items.iter().enumerate() {
            let prefix = format!("line_items[{i}]");
            params.push((
                format!("{prefix}[price_data][currency]"),
                self.currency.clone(),
            ));
            params.push((
                format!("{prefix}[price_data][product_data][name]"),
                item.name.clone(),
            ));
            if let Some(description) = &item.description {
                params.push((
                    format!("{prefix}[price_data][product_data][description]"),
                    description.clone(),
                ));
            }
            for (j, image) in item.images.iter().enumerate() {
                params.push((
                    format!("{prefix}[price_data][product_data][images][{j}]"),
                    image.clone(),
                ));
            }
            params.push((
                format!("{prefix}[price_data][unit_amount]"),
                item.unit_amount.to_string(),
            ));
            params.push((format!("{prefix}[quantity]"), item.quantity.to_string()));
        }

        for (i, country) in self.allowed_countries.iter().enumerate() {
            params.push((
                format!("shipping_address_collection[allowed_countries][{i}]"),
                country.clone(),
            ));
        }

        for (key, value) in &self.metadata {
            params.push((format!("metadata[{key}]"), value.clone()));
        }

        params
    }
}

/// Stripe error response.
#[derive(Debug, Deserialize)]
pub struct StripeErrorResponse {
    /// Error details.
    pub error: StripeErrorBody,
}

/// Stripe error body.
#[derive(Debug, Deserialize)]
pub struct StripeErrorBody {
    /// Error type.
    #[serde(rename = "type")]
    pub error_type: String,
    /// Error message.
    #[serde(default)]
    pub message: String,
    /// Error code.
    #[serde(default)]
    pub code: Option<String>,
}

/// A webhook event envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    /// Event ID.
    pub id: String,
    /// Event type, e.g. `checkout.session.completed`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Creation time (Unix).
    #[serde(default)]
    pub created: i64,
    /// Event payload.
    pub data: EventData,
}

/// Webhook event payload container.
#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    /// The object the event is about.
    pub object: serde_json::Value,
}

/// A field Stripe sends either as an ID or as the expanded object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Expandable {
    /// Unexpanded ID.
    Id(String),
    /// Expanded object; only its ID is kept.
    Object {
        /// Object ID.
        id: String,
    },
}

impl Expandable {
    /// The referenced object's ID.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) | Self::Object { id } => id,
        }
    }
}

/// Customer details collected by the hosted checkout.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CustomerDetails {
    /// Email.
    #[serde(default)]
    pub email: Option<String>,
    /// Full name.
    #[serde(default)]
    pub name: Option<String>,
    /// Phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Billing address.
    #[serde(default)]
    pub address: Option<serde_json::Value>,
}

/// Newer API versions nest shipping details here.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CollectedInformation {
    /// Shipping name and address.
    #[serde(default)]
    pub shipping_details: Option<serde_json::Value>,
}

/// The session object on a `checkout.session.completed` event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompletedSession {
    /// Session ID.
    pub id: String,
    /// Payment intent, as an ID or expanded object.
    #[serde(default)]
    pub payment_intent: Option<Expandable>,
    /// `paid`, `unpaid` or `no_payment_required`.
    #[serde(default)]
    pub payment_status: Option<String>,
    /// Total charged in minor units.
    #[serde(default)]
    pub amount_total: Option<i64>,
    /// Lower-case ISO currency code.
    #[serde(default)]
    pub currency: Option<String>,
    /// Details collected from the customer.
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
    /// Email passed at session creation.
    #[serde(default)]
    pub customer_email: Option<String>,
    /// Shipping name and address (older API versions).
    #[serde(default)]
    pub shipping_details: Option<serde_json::Value>,
    /// Shipping name and address (newer API versions).
    #[serde(default)]
    pub collected_information: Option<CollectedInformation>,
    /// Metadata set at session creation. Anything other than an object reads as empty.
    #[serde(default, deserialize_with = "lenient_metadata")]
    pub metadata: Map<String, Value>,
}

fn lenient_metadata<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Object(map)) => Ok(map),
        _ => Ok(Map::new()),
    }
}

impl CompletedSession {
    /// A metadata value, if present and a string.
    #[must_use]
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }

    /// Shipping details from whichever field the API version populated.
    #[must_use]
    pub fn shipping(&self) -> Option<&serde_json::Value> {
        self.shipping_details
            .as_ref()
            .filter(|v| !v.is_null())
            .or_else(|| {
                self.collected_information
                    .as_ref()
                    .and_then(|c| c.shipping_details.as_ref())
                    .filter(|v| !v.is_null())
            })
    }
}

/// The object on `payment_intent.*` events.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntentObject {
    /// Payment intent ID.
    pub id: String,
}

/// The object on `charge.*` events.
#[derive(Debug, Clone, Deserialize)]
pub struct ChargeObject {
    /// Charge ID.
    pub id: String,
    /// The payment intent the charge belongs to.
    #[serde(default)]
    pub payment_intent: Option<Expandable>,
}
