//! Login, logout, and the current-user endpoint.

use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{run_blocking, AppState, UserContext};
use crate::auth::{self, clear_session_cookie, session_cookie, token_from_cookie_header};
use crate::db;
use crate::models::enums::Role;
use crate::models::{PatientProfile, User};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /api/auth/login` — verify credentials and set the session cookie.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let store = state.store.clone();
    let user = run_blocking(move || {
        let email = db::normalize_email(&req.email);
        let user = store
            .with_conn(|conn| db::get_user_by_email(conn, &email))?
            .ok_or(ApiError::InvalidCredentials)?;
        match auth::verify_password(&req.password, &user.password_hash) {
            Ok(true) => Ok(user),
            Ok(false) => Err(ApiError::InvalidCredentials),
            Err(e) => Err(ApiError::Internal(format!(
                "stored hash for user {}: {e}",
                user.id
            ))),
        }
    })
    .await;

    let user = match user {
        Ok(user) => user,
        Err(ApiError::InvalidCredentials) => {
            tracing::warn!("Failed login attempt");
            return Err(ApiError::InvalidCredentials);
        }
        Err(e) => return Err(e),
    };

    let token = {
        let mut sessions = state
            .sessions
            .lock()
            .map_err(|_| ApiError::Internal("session lock".into()))?;
        sessions.issue(user.id)
    };
    tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

    let cookie = HeaderValue::from_str(&session_cookie(&token, state.config.session_ttl_secs))
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let mut response = Json(user).into_response();
    response.headers_mut().insert(header::SET_COOKIE, cookie);
    Ok(response)
}

/// `POST /api/auth/logout` — revoke the current session.
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    if let Some(token) = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(token_from_cookie_header)
    {
        let mut sessions = state
            .sessions
            .lock()
            .map_err(|_| ApiError::Internal("session lock".into()))?;
        sessions.revoke(token);
    }
    tracing::info!(user_id = %user.user_id, "User logged out");

    Ok((
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, clear_session_cookie())],
    )
        .into_response())
}

#[derive(Serialize)]
pub struct MeResponse {
    pub user: User,
    /// Present for patients only.
    pub profile: Option<PatientProfile>,
}

/// `GET /api/me` — the logged-in user.
pub async fn me(
    State(state): State<AppState>,
    Extension(ctx): Extension<UserContext>,
) -> Result<Json<MeResponse>, ApiError> {
    let (user, profile) = state.store.with_conn(|conn| {
        let user = db::get_user(conn, &ctx.user_id)?;
        let profile = if ctx.role == Role::Patient {
            db::get_patient_profile(conn, &ctx.user_id)?
        } else {
            None
        };
        Ok((user, profile))
    })?;
    let user = user.ok_or(ApiError::Unauthorized)?;
    Ok(Json(MeResponse { user, profile }))
}
