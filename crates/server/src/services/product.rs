//! Product catalogue service.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use coledzh_shop_core::{CategoryId, Price, ProductId};

use crate::db::{ProductStore, RepositoryError};
use crate::models::category::sort_by_name;
use crate::models::{NewProduct, Product, ProductCard};

const MAX_NAME_LENGTH: usize = 128;
const MAX_DESCRIPTION_LENGTH: usize = 2000;

/// Errors that can occur in product operations.
#[derive(Debug, Error)]
pub enum ProductError {
    /// No product with this id.
    #[error("product not found")]
    NotFound,

    /// Input failed validation.
    #[error("{0}")]
    Invalid(String),

    /// A referenced category does not exist.
    #[error("unknown category")]
    UnknownCategory,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Product catalogue service. Reads and writes go straight to the store.
pub struct ProductService {
    store: Arc<dyn ProductStore>,
}

impl ProductService {
    /// Create a new product service.
    #[must_use]
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    /// Create a product linked to one or more categories.
    ///
    /// Duplicate category ids are collapsed.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::Invalid` for a bad name, description or empty
    /// category list, and `ProductError::UnknownCategory` when a category
    /// does not exist.
    pub async fn create_product(
        &self,
        name: &str,
        description: &str,
        price: Price,
        category_ids: &[CategoryId],
    ) -> Result<ProductId, ProductError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProductError::Invalid("product name cannot be empty".into()));
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(ProductError::Invalid(format!(
                "product name must be at most {MAX_NAME_LENGTH} characters"
            )));
        }
        if description.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(ProductError::Invalid(format!(
                "description must be at most {MAX_DESCRIPTION_LENGTH} characters"
            )));
        }

        let mut unique_ids: Vec<CategoryId> = Vec::with_capacity(category_ids.len());
        for id in category_ids {
            if !unique_ids.contains(id) {
                unique_ids.push(*id);
            }
        }
        if unique_ids.is_empty() {
            return Err(ProductError::Invalid(
                "at least one category is required".into(),
            ));
        }

        let id = ProductId::generate();
        let product = NewProduct {
            name: name.to_owned(),
            description: description.trim().to_owned(),
            price,
            category_ids: unique_ids,
        };

        self.store
            .save_product(id, &product)
            .await
            .map_err(|e| match e {
                RepositoryError::InvalidReference(_) => ProductError::UnknownCategory,
                other => ProductError::Repository(other),
            })?;

        info!(product_id = %id, name = %product.name, "product created");
        Ok(id)
    }

    /// One page of product cards ordered by name, optionally filtered by category.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::Repository` if the store fails.
    pub async fn products(
        &self,
        category_id: Option<CategoryId>,
        page: u32,
    ) -> Result<Vec<ProductCard>, ProductError> {
        Ok(self.store.products(category_id, page).await?)
    }

    /// Full product view, with categories sorted by name.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::NotFound` if no product has this id.
    pub async fn product_by_id(&self, id: ProductId) -> Result<Product, ProductError> {
        let mut product = self
            .store
            .product_by_id(id)
            .await?
            .ok_or(ProductError::NotFound)?;
        sort_by_name(&mut product.categories);
        Ok(product)
    }
}
