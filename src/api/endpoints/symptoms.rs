//! Symptom reporting endpoints.
//!
//! - `POST /api/symptoms` — submit a report (patients), runs triage
//! - `GET /api/symptoms` — report history

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::access::can_view_patient;
use crate::api::error::ApiError;
use crate::api::types::{run_blocking, AppState, UserContext};
use crate::db;
use crate::models::enums::Role;
use crate::models::SymptomReport;
use crate::triage::{submit_symptom_report, SubmissionOutcome, SymptomInput};

const DEFAULT_HISTORY_LIMIT: u32 = 50;
const MAX_HISTORY_LIMIT: u32 = 500;

/// `POST /api/symptoms` — store, triage, and notify.
///
/// Responds 201 with the consolidated outcome even when the classifier or
/// a notification channel failed; only a storage failure is an error.
pub async fn submit(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Json(input): Json<SymptomInput>,
) -> Result<(StatusCode, Json<SubmissionOutcome>), ApiError> {
    user.require_role(&[Role::Patient])?;

    let outcome = run_blocking(move || {
        submit_symptom_report(&state.triage_context(), user.user_id, &input).map_err(ApiError::from)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(outcome)))
}

#[derive(Deserialize)]
pub struct PatientQuery {
    pub patient_id: Option<Uuid>,
    pub limit: Option<u32>,
}

impl PatientQuery {
    /// Patients default to themselves; everyone else must name a patient.
    pub fn resolve_patient(&self, user: &UserContext) -> Result<Uuid, ApiError> {
        match (self.patient_id, user.role) {
            (Some(id), _) => Ok(id),
            (None, Role::Patient) => Ok(user.user_id),
            (None, _) => Err(ApiError::BadRequest("patient_id is required".into())),
        }
    }

    pub fn limit(&self, default: u32, max: u32) -> u32 {
        self.limit.unwrap_or(default).clamp(1, max)
    }
}

/// `GET /api/symptoms?patient_id=&limit=` — newest first.
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Query(query): Query<PatientQuery>,
) -> Result<Json<Vec<SymptomReport>>, ApiError> {
    let patient_id = query.resolve_patient(&user)?;
    let limit = query.limit(DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT);

    let reports = state.store.with_conn(|conn| {
        if !can_view_patient(conn, &user, &patient_id)? {
            return Ok(None);
        }
        db::list_symptom_reports(conn, &patient_id, limit).map(Some)
    })?;
    reports.map(Json).ok_or(ApiError::Forbidden)
}
