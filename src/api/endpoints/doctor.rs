//! Doctor dashboard endpoints.

use axum::extract::State;
use axum::{Extension, Json};
use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{AppState, UserContext};
use crate::db;
use crate::models::enums::Role;
use crate::models::{SymptomReport, VitalSign};

#[derive(Serialize)]
pub struct PatientSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub discharge_date: Option<NaiveDate>,
    pub risk_profile: Option<String>,
    pub latest_report: Option<SymptomReport>,
    pub latest_vitals: Option<VitalSign>,
}

/// `GET /api/doctor/patients` — patients assigned to the caller.
pub async fn patients(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
) -> Result<Json<Vec<PatientSummary>>, ApiError> {
    user.require_role(&[Role::Doctor])?;

    let summaries = state.store.with_conn(|conn| {
        let mut out = Vec::new();
        for (patient, profile) in db::list_patients_for_doctor(conn, &user.user_id)? {
            out.push(PatientSummary {
                latest_report: db::list_symptom_reports(conn, &patient.id, 1)?
                    .into_iter()
                    .next(),
                latest_vitals: db::get_latest_vital_sign(conn, &patient.id)?,
                id: patient.id,
                name: patient.name,
                email: patient.email,
                discharge_date: profile.discharge_date,
                risk_profile: profile.risk_profile,
            });
        }
        Ok(out)
    })?;
    Ok(Json(summaries))
}
