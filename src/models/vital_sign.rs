use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VitalSign {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub recorded_at: NaiveDateTime,
    pub heart_rate: Option<u16>,
    pub systolic: Option<u16>,
    pub diastolic: Option<u16>,
    pub temperature_c: Option<f32>,
    pub spo2: Option<u8>,
    pub notes: Option<String>,
}

impl VitalSign {
    /// One-line summary used in prompts and doctor views.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(hr) = self.heart_rate {
            parts.push(format!("HR {hr} bpm"));
        }
        match (self.systolic, self.diastolic) {
            (Some(sys), Some(dia)) => parts.push(format!("BP {sys}/{dia} mmHg")),
            (Some(sys), None) => parts.push(format!("systolic {sys} mmHg")),
            _ => {}
        }
        if let Some(t) = self.temperature_c {
            parts.push(format!("temp {t:.1} C"));
        }
        if let Some(spo2) = self.spo2 {
            parts.push(format!("SpO2 {spo2}%"));
        }
        if parts.is_empty() {
            parts.push("no measurements".to_string());
        }
        let mut line = format!(
            "{} (recorded {})",
            parts.join(", "),
            self.recorded_at.format("%Y-%m-%d %H:%M")
        );
        if let Some(notes) = self.notes.as_deref().filter(|n| !n.trim().is_empty()) {
            line.push_str(&format!("; notes: {}", notes.trim()));
        }
        line
    }
}
