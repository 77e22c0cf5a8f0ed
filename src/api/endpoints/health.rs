//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::AppState;
use crate::db;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: bool,
}

/// `GET /api/health` — liveness plus a database probe. No auth.
pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = state.store.with_conn(|conn| db::count_tables(conn)).is_ok();
    Json(HealthResponse {
        status: if database { "ok" } else { "degraded" },
        version: crate::config::APP_VERSION,
        database,
    })
}
