use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who to notify when a patient reports a critical symptom.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl EmergencyContact {
    /// Phone number, if one is on file and non-blank.
    pub fn phone(&self) -> Option<&str> {
        non_blank(self.phone.as_deref())
    }

    pub fn email(&self) -> Option<&str> {
        non_blank(self.email.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientProfile {
    pub patient_id: Uuid,
    pub assigned_doctor_id: Option<Uuid>,
    pub discharge_date: Option<NaiveDate>,
    /// Free-text risk summary (comorbidities, procedure, discharge notes).
    pub risk_profile: Option<String>,
    #[serde(default)]
    pub emergency_contact: EmergencyContact,
}

impl PatientProfile {
    pub fn empty(patient_id: Uuid) -> Self {
        Self {
            patient_id,
            assigned_doctor_id: None,
            discharge_date: None,
            risk_profile: None,
            emergency_contact: EmergencyContact::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_contact_fields_count_as_missing() {
        let contact = EmergencyContact {
            name: Some("Ana".into()),
            phone: Some("   ".into()),
            email: Some(" ana@example.com ".into()),
        };
        assert_eq!(contact.phone(), None);
        assert_eq!(contact.email(), Some("ana@example.com"));
    }
}
