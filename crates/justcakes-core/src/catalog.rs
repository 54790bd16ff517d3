//! Read-only product catalog.
//!
//! The order subsystem only ever reads the catalog: to look up a product by ID or to
//! list products matching a filter. Display routing for each product type is driven
//! by [`ROUTE_TABLE`] rather than by string comparisons at call sites.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CommerceError, Result};
use crate::ids::ProductId;

/// The kind of product, which determines where it is listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    /// Whole celebration cakes.
    Cake,
    /// Cupcake packs.
    Cupcake,
    /// Single cake slices.
    Slice,
    /// Letterbox cakes with selectable flavours.
    Letterbox,
    /// Downloadable guides and courses.
    Digital,
}

/// Display routing for one product type.
#[derive(Debug, Clone, Copy)]
pub struct RouteEntry {
    /// The product type this entry describes.
    pub product_type: ProductType,
    /// Listing page path.
    pub listing_path: &'static str,
    /// Human-readable label for the type.
    pub label: &'static str,
}

/// Route lookup table, one entry per product type.
pub const ROUTE_TABLE: [RouteEntry; 5] = [
    RouteEntry {
        product_type: ProductType::Cake,
        listing_path: "/cakes",
        label: "Cake",
    },
    RouteEntry {
        product_type: ProductType::Cupcake,
        listing_path: "/cupcakes",
        label: "Cupcakes",
    },
    RouteEntry {
        product_type: ProductType::Slice,
        listing_path: "/slices",
        label: "Cake Slice",
    },
    RouteEntry {
        product_type: ProductType::Letterbox,
        listing_path: "/letterbox-cakes",
        label: "Letterbox Cake",
    },
    RouteEntry {
        product_type: ProductType::Digital,
        listing_path: "/digital-products",
        label: "Digital Product",
    },
];

impl ProductType {
    /// All product types in display order.
    pub const ALL: [Self; 5] = [
        Self::Cake,
        Self::Cupcake,
        Self::Slice,
        Self::Letterbox,
        Self::Digital,
    ];

    /// Look up this type's routing entry.
    #[must_use]
    pub fn route(self) -> &'static RouteEntry {
        // Every variant has exactly one entry; see `route_table_covers_every_type`.
        ROUTE_TABLE
            .iter()
            .find(|entry| entry.product_type == self)
            .unwrap_or(&ROUTE_TABLE[0])
    }

    /// Listing page path, e.g. `/cakes`.
    #[must_use]
    pub fn listing_path(self) -> &'static str {
        self.route().listing_path
    }

    /// Detail page path for a product of this type, e.g. `/cakes/cake-1`.
    #[must_use]
    pub fn product_path(self, id: &ProductId) -> String {
        format!("{}/{}", self.listing_path(), id)
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        self.route().label
    }

    /// Wire name used in query strings and stored documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cake => "cake",
            Self::Cupcake => "cupcake",
            Self::Slice => "slice",
            Self::Letterbox => "letterbox",
            Self::Digital => "digital",
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductType {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CommerceError::UnknownProductType(s.to_string()))
    }
}

/// A catalog product record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Unit price in major units.
    pub price: Decimal,
    /// Image path (site-relative) or absolute URL.
    pub image: String,
    /// Flavour category (chocolate, vanilla, ...).
    pub category: String,
    /// Occasion (birthday, wedding, ...).
    pub occasion: String,
    /// Product type.
    #[serde(rename = "type")]
    pub product_type: ProductType,
    /// Whether the product can currently be bought.
    pub available: bool,
}

impl Product {
    /// Detail page path for this product.
    #[must_use]
    pub fn path(&self) -> String {
        self.product_type.product_path(&self.id)
    }
}

/// Filter for catalog listings. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Restrict to one product type.
    pub product_type: Option<ProductType>,
    /// Restrict to one category.
    pub category: Option<String>,
    /// Restrict to one occasion.
    pub occasion: Option<String>,
    /// Only return products that are available for purchase.
    pub available_only: bool,
}

impl ProductFilter {
    /// Check whether a product passes this filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.product_type.map_or(true, |t| product.product_type == t)
            && self
                .category
                .as_deref()
                .map_or(true, |c| product.category == c)
            && self
                .occasion
                .as_deref()
                .map_or(true, |o| product.occasion == o)
            && (!self.available_only || product.available)
    }
}

/// Read-only product lookup.
pub trait Catalog: Send + Sync {
    /// Get a product by ID.
    fn get_product(&self, id: &str) -> Option<Product>;

    /// List products matching a filter, in catalog order.
    fn list_products(&self, filter: &ProductFilter) -> Vec<Product>;
}

/// An immutable in-memory catalog.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    products: Vec<Product>,
    index: BTreeMap<ProductId, usize>,
}

impl StaticCatalog {
    /// Build a catalog from a product list. Later duplicates of an ID are ignored.
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        let mut kept = Vec::with_capacity(products.len());
        let mut index = BTreeMap::new();
        for product in products {
            if index.contains_key(&product.id) {
                continue;
            }
            index.insert(product.id.clone(), kept.len());
            kept.push(product);
        }
        Self {
            products: kept,
            index,
        }
    }

    /// Parse a catalog from a JSON array of products.
    ///
    /// # Errors
    ///
    /// Returns `CommerceError::InvalidCatalog` if the document is not a product array.
    pub fn from_json(json: &str) -> Result<Self> {
        let products: Vec<Product> =
            serde_json::from_str(json).map_err(|e| CommerceError::InvalidCatalog(e.to_string()))?;
        Ok(Self::new(products))
    }

    /// Number of products in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl Catalog for StaticCatalog {
    fn get_product(&self, id: &str) -> Option<Product> {
        let id = ProductId::new(id).ok()?;
        self.index.get(&id).map(|&i| self.products[i].clone())
    }

    fn list_products(&self, filter: &ProductFilter) -> Vec<Product> {
        self.products
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect()
    }
}
