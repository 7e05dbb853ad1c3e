//! HTTP routes.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                  - Health check
//!
//! # Auth
//! POST   /auth/register           - Register, sends a verification link
//! POST   /auth/login              - Login, sets the session cookie
//! GET    /auth/verify/{token}     - Redeem a verification token
//!
//! # Catalogue
//! GET    /category                - All categories, sorted by name
//! GET    /products                - Product cards (?category_id, ?page)
//! GET    /products/{id}           - Product detail
//!
//! # Admin (admin gate)
//! POST   /admin/create-category   - Create a category
//! POST   /admin/products          - Create a product
//!
//! # Cart (user gate)
//! POST   /cart/items              - Add a product
//! GET    /cart                    - Show the cart
//! DELETE /cart                    - Empty the cart
//! ```

pub mod auth;
pub mod cart;
pub mod categories;
pub mod products;

use axum::{
    Router,
    body::Body,
    http::Request,
    middleware,
    routing::{get, post},
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::middleware::{admin_gate, request_id_middleware, user_gate};
use crate::state::AppState;

/// Response body for endpoints that create a resource.
#[derive(Debug, Serialize)]
pub struct Created<T> {
    pub id: T,
}

/// Routes that require an admin session.
fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/create-category", post(categories::create))
        .route("/admin/products", post(products::create))
        .route_layer(middleware::from_fn_with_state(state.clone(), admin_gate))
}

/// Routes that require any logged-in user.
fn cart_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/cart", get(cart::show).delete(cart::clear))
        .route("/cart/items", post(cart::add_item))
        .route_layer(middleware::from_fn_with_state(state.clone(), user_gate))
}

/// Build the full application router with tracing and request ids.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/verify/{token}", get(auth::verify))
        .route("/category", get(categories::index))
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .merge(admin_routes(&state))
        .merge(cart_routes(&state))
        .with_state(state)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}
