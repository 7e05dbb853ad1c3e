//! Category listing and admin creation.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use coledzh_shop_core::{CategoryId, CategoryName};

use super::Created;
use crate::error::Result;
use crate::models::Category;
use crate::services::CacheWrite;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateCategoryRequest {
    name: String,
}

#[derive(Serialize)]
pub struct CategoryList {
    categories: Vec<Category>,
}

/// All categories, sorted by name.
pub async fn index(State(state): State<AppState>) -> Result<Json<CategoryList>> {
    let categories = state.categories().all_categories().await?;
    Ok(Json(CategoryList { categories }))
}

/// Create a category (admin only).
pub async fn create(
    State(state): State<AppState>,
    Json(form): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Created<CategoryId>>)> {
    let name = CategoryName::parse(&form.name)?;
    let created = state.categories().create_category(&name).await?;

    match created.cache {
        CacheWrite::Stored => {}
        CacheWrite::Skipped => debug!(category_id = %created.id, "category mirror cold, not updated"),
        CacheWrite::Failed(e) => warn!(
            category_id = %created.id,
            error = %e,
            "category stored but cache write failed"
        ),
    }

    Ok((StatusCode::CREATED, Json(Created { id: created.id })))
}
