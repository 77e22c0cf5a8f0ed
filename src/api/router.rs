//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.
//!
//! Middleware stack (outermost → innermost):
//! 1. Rate limiter → 2. Auth validator → 3. Audit logger

use axum::http::{header, HeaderValue};
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::AppState;

/// Build the API router.
///
/// Middleware uses `Extension<AppState>` (injected as the outermost layer).
/// Endpoint handlers use `State<AppState>` (provided via `with_state`).
pub fn api_router(state: AppState) -> Router {
    // Layers are applied from bottom (innermost) to top (outermost):
    //   Extension (outermost) → Auth → Rate limit → Audit (innermost) → Handler
    //
    // Protected routes are limited per authenticated user; public routes per
    // peer address (requires `into_make_service_with_connect_info`).
    //
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route("/auth/logout", post(endpoints::auth::logout))
        .route("/me", get(endpoints::auth::me))
        .route(
            "/symptoms",
            post(endpoints::symptoms::submit).get(endpoints::symptoms::list),
        )
        .route(
            "/vitals",
            post(endpoints::vitals::record).get(endpoints::vitals::list),
        )
        .route(
            "/chat/:peer_id",
            get(endpoints::chat::history).post(endpoints::chat::send),
        )
        .route("/doctor/patients", get(endpoints::doctor::patients))
        .route(
            "/doctor/patients/:id/care-plan/draft",
            post(endpoints::care_plans::draft),
        )
        .route("/care-plans", get(endpoints::care_plans::list))
        .route("/admin/users", post(endpoints::admin::create))
        .route(
            "/admin/patients/:id/profile",
            put(endpoints::admin::update_profile),
        )
        .with_state(state.clone())
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::rate::limit))
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        .layer(axum::Extension(state.clone()));

    // Rate-limited only, no session required
    let public = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/auth/login", post(endpoints::auth::login))
        .with_state(state.clone())
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::rate::limit))
        .layer(axum::Extension(state));

    Router::new()
        .nest("/api", public.merge(protected))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
}
