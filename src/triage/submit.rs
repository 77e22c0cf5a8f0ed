use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::classifier::{ClassificationRequest, SeverityAssessment, SeverityClassifier};
use super::fanout::{dispatch, ActionRecord, Notifiers, Recipients};
use crate::db::{self, DatabaseError, Store};
use crate::llm::LlmClient;
use crate::models::enums::Severity;
use crate::models::*;
use crate::notify::{EmailSender, SmsSender};

pub const MAX_DESCRIPTION_CHARS: usize = 4000;

#[derive(Error, Debug)]
pub enum TriageError {
    #[error("Invalid symptom report: {0}")]
    InvalidInput(String),

    #[error("Failed to store symptom report: {0}")]
    Persistence(#[from] DatabaseError),
}

/// What the patient filled in.
#[derive(Debug, Clone, Deserialize)]
pub struct SymptomInput {
    pub severity: Severity,
    pub description: String,
}

impl SymptomInput {
    fn validate(&self) -> Result<&str, TriageError> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(TriageError::InvalidInput("description is empty".into()));
        }
        if description.chars().count() > MAX_DESCRIPTION_CHARS {
            return Err(TriageError::InvalidInput(format!(
                "description exceeds {MAX_DESCRIPTION_CHARS} characters"
            )));
        }
        Ok(description)
    }
}

/// Everything a submission touches, borrowed for the duration of one call.
pub struct TriageContext<'a> {
    pub store: &'a Store,
    pub llm: &'a dyn LlmClient,
    pub model: &'a str,
    pub mailer: &'a dyn EmailSender,
    pub sms: &'a dyn SmsSender,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
    pub report: SymptomReport,
    pub critical: bool,
    pub assessment: Option<SeverityAssessment>,
    pub actions: Vec<ActionRecord>,
    pub summary: Vec<String>,
}

/// Store a report, triage it, and notify.
///
/// Only input validation and the report insert can fail. Everything after
/// the insert degrades: a missing profile means no contacts, a classifier
/// failure means `assessment: None`, a channel failure is recorded in
/// `actions`.
pub fn submit_symptom_report(
    ctx: &TriageContext<'_>,
    patient_id: Uuid,
    input: &SymptomInput,
) -> Result<SubmissionOutcome, TriageError> {
    let description = input.validate()?;

    let report = SymptomReport {
        id: Uuid::new_v4(),
        patient_id,
        reporter_id: patient_id,
        reported_at: db::now_utc(),
        selected_severity: input.severity,
        description: description.to_string(),
    };
    ctx.store
        .with_conn(|conn| db::insert_symptom_report(conn, &report))?;
    tracing::info!(
        report_id = %report.id,
        patient_id = %patient_id,
        selected = %report.selected_severity,
        "Symptom report stored"
    );

    let patient = load_patient_context(ctx.store, &patient_id);

    let assessment = SeverityClassifier::new(ctx.llm, ctx.model).assess(&ClassificationRequest {
        patient_id,
        description: report.description.clone(),
        risk_profile: patient.profile.risk_profile.clone(),
        latest_vitals: patient.latest_vitals.as_ref().map(VitalSign::summary),
        selected_severity: report.selected_severity,
    });

    let notifiers = Notifiers {
        store: ctx.store,
        mailer: ctx.mailer,
        sms: ctx.sms,
    };
    let recipients = Recipients {
        patient_id,
        patient_name: &patient.name,
        doctor_id: patient.profile.assigned_doctor_id,
        contact: Some(&patient.profile.emergency_contact),
    };
    let fanout = dispatch(&notifiers, &recipients, &report, assessment.as_ref());

    Ok(SubmissionOutcome {
        summary: fanout.summary_lines(),
        critical: fanout.critical,
        actions: fanout.actions,
        assessment,
        report,
    })
}

struct PatientContext {
    name: String,
    profile: PatientProfile,
    latest_vitals: Option<VitalSign>,
}

/// Best-effort load of the data used for triage and notification.
fn load_patient_context(store: &Store, patient_id: &Uuid) -> PatientContext {
    let loaded = store.with_conn(|conn| {
        Ok((
            db::get_user(conn, patient_id)?,
            db::get_patient_profile(conn, patient_id)?,
            db::get_latest_vital_sign(conn, patient_id)?,
        ))
    });

    match loaded {
        Ok((user, profile, vitals)) => PatientContext {
            name: user.map(|u| u.name).unwrap_or_else(|| "Patient".to_string()),
            profile: profile.unwrap_or_else(|| PatientProfile::empty(*patient_id)),
            latest_vitals: vitals,
        },
        Err(e) => {
            tracing::warn!(
                patient_id = %patient_id,
                error = %e,
                "Could not load patient context, continuing without profile"
            );
            PatientContext {
                name: "Patient".to_string(),
                profile: PatientProfile::empty(*patient_id),
                latest_vitals: None,
            }
        }
    }
}
