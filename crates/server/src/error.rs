//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. Server-class errors are
//! captured to Sentry before the response is produced, and their details
//! never reach the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use coledzh_shop_core::{EmailError, NameError, PasswordError, PriceError};

use crate::services::{
    AuthError, CartError, CategoryError, ProductError, TokenError,
};

/// Application-level error type for the HTTP boundary.
#[derive(Debug, Error)]
pub enum AppError {
    /// Registration, login or verification failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Verification token operation failed.
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    /// Category operation failed.
    #[error("Category error: {0}")]
    Category(#[from] CategoryError),

    /// Product operation failed.
    #[error("Product error: {0}")]
    Product(#[from] ProductError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Request field failed validation.
    #[error("Validation error: {0}")]
    Validation(String),
}

macro_rules! validation_from {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for AppError {
                fn from(err: $ty) -> Self {
                    Self::Validation(err.to_string())
                }
            }
        )+
    };
}

validation_from!(EmailError, NameError, PasswordError, PriceError);

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Auth(err) => match err {
                AuthError::AlreadyExists => StatusCode::CONFLICT,
                AuthError::NotFound => StatusCode::UNAUTHORIZED,
                AuthError::EmailNotVerified => StatusCode::FORBIDDEN,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Token(err) => match err {
                TokenError::TokenNotFound | TokenError::Verification(AuthError::NotFound) => {
                    StatusCode::NOT_FOUND
                }
                TokenError::WrongTokenType(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Category(err) => match err {
                CategoryError::AlreadyExists => StatusCode::CONFLICT,
                CategoryError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Product(err) => match err {
                ProductError::NotFound => StatusCode::NOT_FOUND,
                ProductError::Invalid(_) | ProductError::UnknownCategory => {
                    StatusCode::BAD_REQUEST
                }
                ProductError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Cart(err) => match err {
                CartError::ProductNotFound => StatusCode::NOT_FOUND,
                CartError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message safe to show the client.
    fn public_message(&self) -> String {
        if self.status().is_server_error() {
            return "internal server error".to_string();
        }
        match self {
            // Unknown email and wrong password must read the same.
            Self::Auth(AuthError::NotFound) => "invalid credentials".to_string(),
            Self::Auth(AuthError::AlreadyExists) => {
                "a user with this login or email already exists".to_string()
            }
            Self::Token(TokenError::Verification(_)) => TokenError::TokenNotFound.to_string(),
            Self::Auth(err) => err.to_string(),
            Self::Token(err) => err.to_string(),
            Self::Category(err) => err.to_string(),
            Self::Product(err) => err.to_string(),
            Self::Cart(err) => err.to_string(),
            Self::Validation(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Called by the user gate so errors are associated with the caller.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}
