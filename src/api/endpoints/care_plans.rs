//! Care plan endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use uuid::Uuid;

use crate::api::access::can_view_patient;
use crate::api::endpoints::symptoms::PatientQuery;
use crate::api::error::ApiError;
use crate::api::types::{run_blocking, AppState, UserContext};
use crate::care_plan::draft_care_plan;
use crate::db;
use crate::models::enums::Role;
use crate::models::CarePlan;

/// `POST /api/doctor/patients/:id/care-plan/draft` — AI draft for an
/// assigned patient, stored with status `draft`.
pub async fn draft(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Path(patient_id): Path<Uuid>,
) -> Result<(StatusCode, Json<CarePlan>), ApiError> {
    user.require_role(&[Role::Doctor])?;
    let assigned = state
        .store
        .with_conn(|conn| db::is_assigned_doctor(conn, &patient_id, &user.user_id))?;
    if !assigned {
        return Err(ApiError::Forbidden);
    }

    let plan = run_blocking(move || {
        draft_care_plan(
            &state.store,
            state.llm.as_ref(),
            &state.config.ollama_model,
            user.user_id,
            patient_id,
        )
        .map_err(ApiError::from)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

/// `GET /api/care-plans?patient_id=` — newest first.
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Query(query): Query<PatientQuery>,
) -> Result<Json<Vec<CarePlan>>, ApiError> {
    let patient_id = query.resolve_patient(&user)?;
    let plans = state.store.with_conn(|conn| {
        if !can_view_patient(conn, &user, &patient_id)? {
            return Ok(None);
        }
        db::list_care_plans(conn, &patient_id).map(Some)
    })?;
    plans.map(Json).ok_or(ApiError::Forbidden)
}
