//! Session gates for protected routes.
//!
//! Both gates read the `session_id` cookie and reject with 401 before any
//! handler runs when it is missing or does not resolve:
//!
//! - [`admin_gate`] additionally requires the admin role and injects nothing
//! - [`user_gate`] injects [`AuthenticatedUser`] for downstream handlers

use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use serde_json::json;
use tracing::{debug, error};

use coledzh_shop_core::UserId;

use crate::error::set_sentry_user;
use crate::models::SessionId;
use crate::services::SessionError;
use crate::state::AppState;

/// Cookie carrying the session id.
pub const SESSION_COOKIE: &str = "session_id";

/// Why a gate turned a request away. Always answered with 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateRejection {
    /// No session cookie on the request.
    MissingCookie,
    /// Cookie present but the session is unknown or expired.
    InvalidSession,
    /// Session is valid but lacks the admin role.
    NotAdmin,
    /// The session store could not be consulted.
    Unavailable,
    /// Handler expected an authenticated user but no gate ran.
    Unauthenticated,
}

impl GateRejection {
    const fn message(self) -> &'static str {
        match self {
            Self::MissingCookie | Self::Unauthenticated => "authentication required",
            Self::InvalidSession => "session expired or invalid",
            Self::NotAdmin => "admin role required",
            Self::Unavailable => "session could not be verified",
        }
    }
}

impl From<SessionError> for GateRejection {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound => Self::InvalidSession,
            SessionError::NotAdmin => Self::NotAdmin,
            SessionError::Store(e) => {
                error!(error = %e, "session store unavailable");
                Self::Unavailable
            }
        }
    }
}

impl IntoResponse for GateRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": self.message() })),
        )
            .into_response()
    }
}

/// The user id resolved by [`user_gate`].
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(AuthenticatedUser(user_id): AuthenticatedUser) -> impl IntoResponse {
///     user_id.to_string()
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub UserId);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = GateRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .copied()
            .ok_or(GateRejection::Unauthenticated)
    }
}

fn session_id(jar: &CookieJar) -> Result<SessionId, GateRejection> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value())
        .filter(|value| !value.is_empty())
        .map(|value| SessionId::from(value.to_owned()))
        .ok_or(GateRejection::MissingCookie)
}

/// Allow only requests carrying an admin session.
///
/// # Errors
///
/// Rejects with 401 when the cookie is missing, the session does not
/// resolve, or the session is not an admin's.
pub async fn admin_gate(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Result<Response, GateRejection> {
    let id = session_id(&jar)?;
    state.sessions().validate_admin_session(&id).await.map_err(|e| {
        debug!(session = ?id, error = %e, "admin gate rejected request");
        GateRejection::from(e)
    })?;
    Ok(next.run(request).await)
}

/// Allow any live session and expose its user id to handlers.
///
/// # Errors
///
/// Rejects with 401 when the cookie is missing or the session does not resolve.
pub async fn user_gate(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, GateRejection> {
    let id = session_id(&jar)?;
    let user_id = state.sessions().validate_user_session(&id).await.map_err(|e| {
        debug!(session = ?id, error = %e, "user gate rejected request");
        GateRejection::from(e)
    })?;

    set_sentry_user(&user_id);
    request.extensions_mut().insert(AuthenticatedUser(user_id));
    Ok(next.run(request).await)
}
