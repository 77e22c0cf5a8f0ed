//! Vital-sign endpoints.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::access::can_view_patient;
use crate::api::endpoints::symptoms::PatientQuery;
use crate::api::error::ApiError;
use crate::api::types::{AppState, UserContext};
use crate::db;
use crate::models::enums::Role;
use crate::models::VitalSign;

#[derive(Debug, Deserialize)]
pub struct VitalInput {
    pub heart_rate: Option<u16>,
    pub systolic: Option<u16>,
    pub diastolic: Option<u16>,
    pub temperature_c: Option<f32>,
    pub spo2: Option<u8>,
    pub notes: Option<String>,
}

impl VitalInput {
    fn validate(&self) -> Result<(), ApiError> {
        if self.heart_rate.is_none()
            && self.systolic.is_none()
            && self.diastolic.is_none()
            && self.temperature_c.is_none()
            && self.spo2.is_none()
        {
            return Err(ApiError::BadRequest("At least one measurement is required".into()));
        }
        check_range("heart_rate", self.heart_rate.map(f32::from), 20.0, 250.0)?;
        check_range("systolic", self.systolic.map(f32::from), 50.0, 260.0)?;
        check_range("diastolic", self.diastolic.map(f32::from), 20.0, 160.0)?;
        check_range("temperature_c", self.temperature_c, 30.0, 45.0)?;
        check_range("spo2", self.spo2.map(f32::from), 50.0, 100.0)?;
        Ok(())
    }
}

fn check_range(field: &str, value: Option<f32>, min: f32, max: f32) -> Result<(), ApiError> {
    match value {
        Some(v) if !(min..=max).contains(&v) => Err(ApiError::BadRequest(format!(
            "{field} must be between {min} and {max}"
        ))),
        _ => Ok(()),
    }
}

/// `POST /api/vitals` — record the patient's own measurements.
pub async fn record(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Json(input): Json<VitalInput>,
) -> Result<(StatusCode, Json<VitalSign>), ApiError> {
    user.require_role(&[Role::Patient])?;
    input.validate()?;

    let vital = VitalSign {
        id: Uuid::new_v4(),
        patient_id: user.user_id,
        recorded_at: db::now_utc(),
        heart_rate: input.heart_rate,
        systolic: input.systolic,
        diastolic: input.diastolic,
        temperature_c: input.temperature_c,
        spo2: input.spo2,
        notes: input.notes.filter(|n| !n.trim().is_empty()),
    };
    state
        .store
        .with_conn(|conn| db::insert_vital_sign(conn, &vital))?;
    Ok((StatusCode::CREATED, Json(vital)))
}

/// `GET /api/vitals?patient_id=&limit=` — newest first.
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<UserContext>,
    Query(query): Query<PatientQuery>,
) -> Result<Json<Vec<VitalSign>>, ApiError> {
    let patient_id = query.resolve_patient(&user)?;
    let limit = query.limit(50, 500);

    let vitals = state.store.with_conn(|conn| {
        if !can_view_patient(conn, &user, &patient_id)? {
            return Ok(None);
        }
        db::list_vital_signs(conn, &patient_id, limit).map(Some)
    })?;
    vitals.map(Json).ok_or(ApiError::Forbidden)
}
