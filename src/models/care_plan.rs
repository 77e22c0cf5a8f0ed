use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::CarePlanStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarePlan {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub content: String,
    pub status: CarePlanStatus,
    pub created_at: NaiveDateTime,
}
