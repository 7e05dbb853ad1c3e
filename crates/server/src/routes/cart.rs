//! Cart routes. Every handler runs behind the user gate.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use coledzh_shop_core::{CartItemId, ProductId};

use super::Created;
use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::models::Cart;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct AddItemRequest {
    product_id: ProductId,
}

/// Add a product to the caller's cart.
pub async fn add_item(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Json(form): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<Created<CartItemId>>)> {
    let id = state.carts().add_product(user_id, form.product_id).await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

/// The caller's cart.
pub async fn show(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> Result<Json<Cart>> {
    Ok(Json(state.carts().cart(user_id).await?))
}

/// Empty the caller's cart.
pub async fn clear(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> Result<StatusCode> {
    state.carts().clear(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
