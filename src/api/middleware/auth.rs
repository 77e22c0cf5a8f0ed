//! Session cookie authentication middleware.
//!
//! Reads the `carelink_session` cookie, validates it against the session
//! store, loads the user, and injects `UserContext` into request extensions
//! for downstream handlers.

use axum::http::{header, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{AppState, UserContext};
use crate::auth::token_from_cookie_header;
use crate::db;

/// Require a valid session cookie.
///
/// Accesses `AppState` from request extensions (injected by Extension layer).
pub async fn require_auth(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_auth_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_auth_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let state: AppState = req
        .extensions()
        .get::<AppState>()
        .cloned()
        .ok_or(ApiError::Internal("missing app state".into()))?;

    let token = req
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(token_from_cookie_header)
        .ok_or(ApiError::Unauthorized)?
        .to_string();

    // MutexGuard is !Send, dropped before any .await
    let user_id = {
        let mut sessions = state
            .sessions
            .lock()
            .map_err(|_| ApiError::Internal("session lock".into()))?;
        sessions.validate(&token).ok_or(ApiError::Unauthorized)?
    };

    let user = state
        .store
        .with_conn(|conn| db::get_user(conn, &user_id))?
        .ok_or(ApiError::Unauthorized)?;

    req.extensions_mut().insert(UserContext {
        user_id: user.id,
        role: user.role,
        name: user.name,
    });

    Ok(next.run(req).await)
}
