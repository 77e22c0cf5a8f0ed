use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::Severity;

/// A patient's symptom report. Immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomReport {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub reporter_id: Uuid,
    pub reported_at: NaiveDateTime,
    pub selected_severity: Severity,
    pub description: String,
}
