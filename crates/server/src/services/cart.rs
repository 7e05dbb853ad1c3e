//! Shopping cart service.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use coledzh_shop_core::{CartItemId, ProductId, UserId};

use crate::db::{CartStore, RepositoryError};
use crate::models::Cart;

/// Errors that can occur in cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product being added does not exist.
    #[error("product not found")]
    ProductNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Per-user shopping cart.
pub struct CartService {
    store: Arc<dyn CartStore>,
}

impl CartService {
    /// Create a new cart service.
    #[must_use]
    pub fn new(store: Arc<dyn CartStore>) -> Self {
        Self { store }
    }

    /// Add one unit of a product to the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ProductNotFound` if the product does not exist.
    pub async fn add_product(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<CartItemId, CartError> {
        let id = self
            .store
            .add_item(user_id, product_id)
            .await
            .map_err(|e| match e {
                RepositoryError::InvalidReference(_) => CartError::ProductNotFound,
                other => CartError::Repository(other),
            })?;
        debug!(%user_id, %product_id, item_id = %id, "cart item added");
        Ok(id)
    }

    /// The user's cart with its total.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the store fails.
    pub async fn cart(&self, user_id: UserId) -> Result<Cart, CartError> {
        let items = self.store.items(user_id).await?;
        Ok(Cart::from_items(items))
    }

    /// Remove every item from the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the store fails.
    pub async fn clear(&self, user_id: UserId) -> Result<(), CartError> {
        self.store.clear(user_id).await?;
        debug!(%user_id, "cart cleared");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use coledzh_shop_core::Price;
    use rust_decimal::Decimal;

    use super::*;
    use crate::db::ProductStore;
    use crate::models::NewProduct;
    use crate::testing::{MemoryCartStore, MemoryCategoryStore, MemoryProductStore};

    async fn setup() -> (CartService, ProductId, ProductId) {
        let categories = Arc::new(MemoryCategoryStore::with_names(&["Kitchen"]));
        let category_ids: Vec<_> = categories.snapshot().iter().map(|c| c.id).collect();
        let products = Arc::new(MemoryProductStore::new(categories));

        let mut ids = Vec::new();
        for (name, price) in [("Mug", "0.10"), ("Kettle", "0.20")] {
            let id = ProductId::generate();
            products
                .save_product(
                    id,
                    &NewProduct {
                        name: name.to_owned(),
                        description: String::new(),
                        price: Price::parse(Decimal::from_str(price).unwrap()).unwrap(),
                        category_ids: category_ids.clone(),
                    },
                )
                .await
                .unwrap();
            ids.push(id);
        }

        let service = CartService::new(Arc::new(MemoryCartStore::new(products)));
        (service, ids[0], ids[1])
    }

    #[tokio::test]
    async fn test_cart_keeps_insertion_order_and_exact_total() {
        let (service, mug, kettle) = setup().await;
        let user = UserId::generate();

        service.add_product(user, kettle).await.unwrap();
        service.add_product(user, mug).await.unwrap();
        service.add_product(user, mug).await.unwrap();

        let cart = service.cart(user).await.unwrap();
        let names: Vec<&str> = cart.items.iter().map(|i| i.product.name.as_str()).collect();
        assert_eq!(names, ["Kettle", "Mug", "Mug"]);
        assert_eq!(cart.total, Decimal::from_str("0.40").unwrap());
    }

    #[tokio::test]
    async fn test_carts_are_per_user() {
        let (service, mug, _) = setup().await;
        let alice = UserId::generate();
        let bob = UserId::generate();

        service.add_product(alice, mug).await.unwrap();

        assert!(service.cart(bob).await.unwrap().items.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_product() {
        let (service, _, _) = setup().await;
        let result = service
            .add_product(UserId::generate(), ProductId::generate())
            .await;
        assert!(matches!(result, Err(CartError::ProductNotFound)));
    }

    #[tokio::test]
    async fn test_clear() {
        let (service, mug, kettle) = setup().await;
        let user = UserId::generate();
        service.add_product(user, mug).await.unwrap();
        service.add_product(user, kettle).await.unwrap();

        service.clear(user).await.unwrap();

        let cart = service.cart(user).await.unwrap();
        assert!(cart.items.is_empty());
        assert_eq!(cart.total, Decimal::ZERO);
    }
}
