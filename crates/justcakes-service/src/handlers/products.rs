//! Public catalog lookup.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use justcakes_core::{Product, ProductFilter, ProductType};

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for listing products.
#[derive(Debug, Default, Deserialize)]
pub struct ListProductsQuery {
    /// Product type (`cake`, `cupcake`, ...).
    #[serde(rename = "type")]
    pub product_type: Option<String>,
    /// Flavour category.
    pub category: Option<String>,
    /// Occasion.
    pub occasion: Option<String>,
}

/// A product with its page path.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProductView {
    /// The product record.
    #[serde(flatten)]
    pub product: Product,
    /// Detail page path, e.g. `/cakes/cake-1`.
    pub path: String,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        let path = product.path();
        Self { product, path }
    }
}

/// `GET /v1/products`
///
/// Only available products are listed.
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<Vec<ProductView>>, ApiError> {
    let product_type = query
        .product_type
        .as_deref()
        .filter(|t| !t.is_empty())
        .map(str::parse::<ProductType>)
        .transpose()?;

    let filter = ProductFilter {
        product_type,
        category: query.category.filter(|c| !c.is_empty()),
        occasion: query.occasion.filter(|o| !o.is_empty()),
        available_only: true,
    };

    let products = state
        .catalog
        .list_products(&filter)
        .into_iter()
        .map(ProductView::from)
        .collect();

    Ok(Json(products))
}

/// `GET /v1/products/:id`
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ProductView>, ApiError> {
    state
        .catalog
        .get_product(&id)
        .map(|product| Json(ProductView::from(product)))
        .ok_or_else(|| ApiError::NotFound(format!("product not found: {id}")))
}
