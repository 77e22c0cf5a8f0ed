//! Admin endpoints: user creation and patient profile management.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::accounts::{create_user, NewUser};
use crate::api::error::ApiError;
use crate::api::types::{run_blocking, AppState, UserContext};
use crate::db;
use crate::models::enums::Role;
use crate::models::{EmergencyContact, PatientProfile, User};

/// `POST /api/admin/users` — create a patient, doctor, or admin.
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Json(new): Json<NewUser>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    user.require_role(&[Role::Admin])?;
    let created = run_blocking(move || {
        create_user(&state.store, &new, state.config.pbkdf2_iterations).map_err(ApiError::from)
    })
    .await?;
    tracing::info!(admin_id = %user.user_id, user_id = %created.id, "Admin created user");
    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
pub struct ProfileUpdate {
    pub assigned_doctor_id: Option<Uuid>,
    pub discharge_date: Option<NaiveDate>,
    pub risk_profile: Option<String>,
    #[serde(default)]
    pub emergency_contact: EmergencyContact,
}

/// `PUT /api/admin/patients/:id/profile` — replace a patient's care profile.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Path(patient_id): Path<Uuid>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<PatientProfile>, ApiError> {
    user.require_role(&[Role::Admin])?;

    let profile = PatientProfile {
        patient_id,
        assigned_doctor_id: update.assigned_doctor_id,
        discharge_date: update.discharge_date,
        risk_profile: update.risk_profile.filter(|r| !r.trim().is_empty()),
        emergency_contact: update.emergency_contact,
    };

    state.store.with_conn(|conn| {
        match db::get_user(conn, &patient_id)? {
            Some(u) if u.role == Role::Patient => {}
            _ => return Ok(Err(ApiError::NotFound(format!("Patient {patient_id}")))),
        }
        if let Some(doctor_id) = profile.assigned_doctor_id {
            match db::get_user(conn, &doctor_id)? {
                Some(d) if d.role == Role::Doctor => {}
                _ => {
                    return Ok(Err(ApiError::BadRequest(
                        "assigned_doctor_id is not a doctor".into(),
                    )))
                }
            }
        }
        db::upsert_patient_profile(conn, &profile)?;
        Ok(Ok(()))
    })??;

    tracing::info!(admin_id = %user.user_id, patient_id = %patient_id, "Patient profile updated");
    Ok(Json(profile))
}
