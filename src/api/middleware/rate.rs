//! Per-client rate limiting middleware.
//!
//! Applies sliding-window rate limits per client:
//! - 100 requests per minute
//! - 1000 requests per hour
//!
//! On authenticated routes this runs after `require_auth` and keys on the
//! validated user. Public routes key on the peer address, so cookie values
//! never pick the bucket.

use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{AppState, UserContext};

/// Extract a rate-limit key from the request.
fn rate_key(req: &Request<axum::body::Body>) -> String {
    if let Some(user) = req.extensions().get::<UserContext>() {
        return format!("user:{}", user.user_id);
    }
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| format!("ip:{}", addr.ip()))
        .unwrap_or_else(|| "ip:unknown".to_string())
}

/// Returns 429 when the client is over its limit.
/// Accesses `AppState` from request extensions.
pub async fn limit(req: Request<axum::body::Body>, next: Next) -> Response {
    match limit_inner(req, next).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

async fn limit_inner(req: Request<axum::body::Body>, next: Next) -> Result<Response, ApiError> {
    let state: AppState = req
        .extensions()
        .get::<AppState>()
        .cloned()
        .ok_or(ApiError::Internal("missing app state".into()))?;

    let key = rate_key(&req);

    {
        let mut limiter = state
            .rate_limiter
            .lock()
            .map_err(|_| ApiError::Internal("rate limiter lock".into()))?;

        limiter
            .check(&key)
            .map_err(|retry_after| ApiError::RateLimited { retry_after })?;
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::models::enums::Role;

    fn bare_request() -> Request<axum::body::Body> {
        Request::builder()
            .uri("/api/health")
            .header("cookie", "carelink_session=anything")
            .body(axum::body::Body::empty())
            .unwrap()
    }

    #[test]
    fn authenticated_requests_key_on_user() {
        let mut req = bare_request();
        let user_id = Uuid::new_v4();
        req.extensions_mut().insert(UserContext {
            user_id,
            role: Role::Patient,
            name: "Ana".into(),
        });
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([10, 0, 0, 1], 5000))));
        assert_eq!(rate_key(&req), format!("user:{user_id}"));
    }

    #[test]
    fn anonymous_requests_key_on_peer_ip_not_cookie() {
        let mut req = bare_request();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([10, 0, 0, 1], 5000))));
        assert_eq!(rate_key(&req), "ip:10.0.0.1");
    }
}
