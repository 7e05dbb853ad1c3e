//! Product catalogue routes.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use coledzh_shop_core::{CategoryId, Price, ProductId};

use super::Created;
use crate::error::Result;
use crate::models::{Product, ProductCard};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateProductRequest {
    name: String,
    #[serde(default)]
    description: String,
    price: Decimal,
    category_ids: Vec<CategoryId>,
}

/// Listing filter and page (0-based).
#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    category_id: Option<CategoryId>,
    #[serde(default)]
    page: u32,
}

#[derive(Serialize)]
pub struct ProductList {
    products: Vec<ProductCard>,
}

/// Create a product (admin only).
pub async fn create(
    State(state): State<AppState>,
    Json(form): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Created<ProductId>>)> {
    let price = Price::parse(form.price)?;
    let id = state
        .products()
        .create_product(&form.name, &form.description, price, &form.category_ids)
        .await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

/// One page of product cards.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ProductList>> {
    let products = state
        .products()
        .products(query.category_id, query.page)
        .await?;
    Ok(Json(ProductList { products }))
}

/// Product detail.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    Ok(Json(state.products().product_by_id(id).await?))
}
