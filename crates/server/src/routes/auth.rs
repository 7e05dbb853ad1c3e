//! Registration, login and email verification.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use coledzh_shop_core::{Email, Login, Password, TokenType, UserId};

use super::Created;
use crate::error::{AppError, Result};
use crate::middleware::SESSION_COOKIE;
use crate::services::AuthError;
use crate::state::AppState;

/// Registration form. Fields are validated into core types by the handler.
#[derive(Deserialize)]
pub struct RegisterRequest {
    login: String,
    email: String,
    password: String,
}

/// Login form.
#[derive(Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

/// Register a user and send them a verification link.
///
/// The link is best-effort: a delivery failure is logged and the user
/// stays registered.
pub async fn register(
    State(state): State<AppState>,
    Json(form): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Created<UserId>>)> {
    let login = Login::parse(&form.login)?;
    let email = Email::parse(&form.email)?;
    let password = Password::parse(&form.password)?;

    let id = state.auth().register(&login, &email, &password).await?;
    let token = state
        .tokens()
        .create_token(id, TokenType::EmailVerification)
        .await?;

    let link = state.config().verification_link(&token);
    if let Err(e) = state.mailer().send_verification(&email, &link).await {
        warn!(user_id = %id, error = %e, "verification link not delivered");
    }

    Ok((StatusCode::CREATED, Json(Created { id })))
}

/// Log in and set the session cookie.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(form): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    // Malformed input is indistinguishable from a wrong password.
    let (Ok(email), Ok(password)) = (Email::parse(&form.email), Password::parse(&form.password))
    else {
        return Err(AppError::Auth(AuthError::NotFound));
    };

    let session_id = state.auth().login(&email, &password).await?;

    let ttl = state.auth().session_ttl();
    let cookie = Cookie::build((SESSION_COOKIE, session_id.as_str().to_owned()))
        .http_only(true)
        .same_site(SameSite::Strict)
        .path("/")
        .secure(state.config().cookie_secure())
        .max_age(time::Duration::seconds(
            i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX),
        ));

    Ok((
        StatusCode::CREATED,
        jar.add(cookie),
        Json(json!({ "session_id": session_id.as_str() })),
    ))
}

/// Redeem an email verification token.
pub async fn verify(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<StatusCode> {
    state.tokens().verify_email(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}
