//! Products and their listing cards.

use serde::{Deserialize, Serialize};

use coledzh_shop_core::{CategoryId, Price, ProductId};

use super::Category;

/// Full product view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    /// Sorted by name.
    pub categories: Vec<Category>,
}

/// Compact product view used in listings and carts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductCard {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
}

/// Input for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category_ids: Vec<CategoryId>,
}
