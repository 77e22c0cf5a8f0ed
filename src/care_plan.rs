//! AI-drafted care plans. A draft is generated from the patient's profile,
//! latest vitals, and recent symptom reports, then stored for the doctor to
//! edit. Nothing here publishes a plan.

use thiserror::Error;
use uuid::Uuid;

use crate::db::{self, DatabaseError, DATETIME_FORMAT, DATE_FORMAT, Store};
use crate::llm::{LlmClient, LlmError};
use crate::models::enums::CarePlanStatus;
use crate::models::*;
use crate::prompts::{build_care_plan_prompt, CarePlanPromptInput, CARE_PLAN_SYSTEM_PROMPT};

/// Reports included in the drafting prompt.
const RECENT_SYMPTOM_LIMIT: u32 = 10;

#[derive(Error, Debug)]
pub enum CarePlanError {
    #[error("Patient not found: {0}")]
    PatientNotFound(Uuid),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Care plan generation failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Model returned an empty care plan")]
    EmptyDraft,
}

/// Generate and store a draft care plan authored by `doctor_id`.
///
/// The store lock is released while the model runs.
pub fn draft_care_plan(
    store: &Store,
    llm: &dyn LlmClient,
    model: &str,
    doctor_id: Uuid,
    patient_id: Uuid,
) -> Result<CarePlan, CarePlanError> {
    let (patient, profile, vitals, symptoms) = store.with_conn(|conn| {
        Ok((
            db::get_user(conn, &patient_id)?,
            db::get_patient_profile(conn, &patient_id)?,
            db::get_latest_vital_sign(conn, &patient_id)?,
            db::list_symptom_reports(conn, &patient_id, RECENT_SYMPTOM_LIMIT)?,
        ))
    })?;
    let patient = patient.ok_or(CarePlanError::PatientNotFound(patient_id))?;

    let prompt = build_care_plan_prompt(&CarePlanPromptInput {
        patient_name: &patient.name,
        discharge_date: profile
            .as_ref()
            .and_then(|p| p.discharge_date)
            .map(|d| d.format(DATE_FORMAT).to_string()),
        risk_profile: profile.as_ref().and_then(|p| p.risk_profile.as_deref()),
        latest_vitals: vitals.as_ref().map(VitalSign::summary),
        recent_symptoms: symptoms
            .iter()
            .map(|s| {
                (
                    s.reported_at.format(DATETIME_FORMAT).to_string(),
                    s.selected_severity,
                    s.description.as_str(),
                )
            })
            .collect(),
    });

    let content = llm
        .generate(model, &prompt, CARE_PLAN_SYSTEM_PROMPT)?
        .trim()
        .to_string();
    if content.is_empty() {
        return Err(CarePlanError::EmptyDraft);
    }

    let plan = CarePlan {
        id: Uuid::new_v4(),
        patient_id,
        doctor_id,
        content,
        status: CarePlanStatus::Draft,
        created_at: db::now_utc(),
    };
    store.with_conn(|conn| db::insert_care_plan(conn, &plan))?;
    tracing::info!(
        plan_id = %plan.id,
        patient_id = %patient_id,
        doctor_id = %doctor_id,
        "Care plan draft stored"
    );
    Ok(plan)
}
