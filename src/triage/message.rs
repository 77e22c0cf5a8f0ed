use super::classifier::SeverityAssessment;
use crate::models::enums::{SenderTag, Severity};

pub const FALLBACK_NOTE: &str =
    "AI assessment unavailable; defaulting based on patient manual severe selection.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AlertKind {
    Critical,
    Info,
}

/// Notification text for one triaged report, built from explicit fields.
/// Delivery lives in `fanout`; this type only formats.
#[derive(Debug, Clone)]
pub struct AlertMessage {
    kind: AlertKind,
    patient_name: String,
    description: String,
    selected: Severity,
    assessment: Option<SeverityAssessment>,
}

impl AlertMessage {
    pub fn critical(
        patient_name: &str,
        description: &str,
        selected: Severity,
        assessment: Option<&SeverityAssessment>,
    ) -> Self {
        Self {
            kind: AlertKind::Critical,
            patient_name: patient_name.to_string(),
            description: description.trim().to_string(),
            selected,
            assessment: assessment.cloned(),
        }
    }

    /// Advisory message for a non-critical report. `None` unless the
    /// classifier suggested a follow-up.
    pub fn info(
        patient_name: &str,
        description: &str,
        selected: Severity,
        assessment: &SeverityAssessment,
    ) -> Option<Self> {
        assessment.follow_up.as_ref()?;
        Some(Self {
            kind: AlertKind::Info,
            patient_name: patient_name.to_string(),
            description: description.trim().to_string(),
            selected,
            assessment: Some(assessment.clone()),
        })
    }

    pub fn is_critical(&self) -> bool {
        self.kind == AlertKind::Critical
    }

    pub fn tag(&self) -> SenderTag {
        match self.kind {
            AlertKind::Critical => SenderTag::SystemAlert,
            AlertKind::Info => SenderTag::SystemInfo,
        }
    }

    pub fn chat_text(&self) -> String {
        let mut lines = Vec::new();
        match self.kind {
            AlertKind::Critical => lines.push(format!(
                "CRITICAL SYMPTOM ALERT: {} reported a symptom that needs attention.",
                self.patient_name
            )),
            AlertKind::Info => lines.push(format!(
                "Symptom update from {} (not critical).",
                self.patient_name
            )),
        }
        lines.push(format!("Description: {}", self.description));
        lines.push(format!("Patient-selected severity: {}", self.selected));
        lines.push(self.assessment_line());
        if let Some(follow_up) = self.follow_up() {
            lines.push(format!("Suggested follow-up: {follow_up}"));
        }
        lines.join("\n")
    }

    pub fn email_subject(&self) -> String {
        format!("CareLink alert: {} reported a critical symptom", self.patient_name)
    }

    pub fn email_body(&self) -> String {
        format!(
            "You are listed as the emergency contact for {name}.\n\n\
             {name} reported: \"{description}\" (self-rated {selected}).\n\
             {assessment}\n\n\
             Their care team has been notified. Please check on {name} and call \
             emergency services if they are in immediate danger.",
            name = self.patient_name,
            description = self.description,
            selected = self.selected,
            assessment = self.assessment_line(),
        )
    }

    pub fn sms_text(&self) -> String {
        format!(
            "CareLink: {} reported a critical symptom (self-rated {}). Please check on them.",
            self.patient_name, self.selected
        )
    }

    fn follow_up(&self) -> Option<&str> {
        self.assessment.as_ref().and_then(|a| a.follow_up.as_deref())
    }

    fn assessment_line(&self) -> String {
        match &self.assessment {
            Some(a) => {
                let mut line = format!("AI assessment: {}", a.ai_severity);
                if a.alert_recommended {
                    line.push_str(" (alert recommended)");
                }
                if !a.justification.is_empty() {
                    line.push_str(&format!(". {}", a.justification));
                }
                line
            }
            None if self.selected == Severity::Severe => FALLBACK_NOTE.to_string(),
            None => "AI assessment unavailable.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assessment(ai: Severity, follow_up: Option<&str>) -> SeverityAssessment {
        SeverityAssessment {
            ai_severity: ai,
            justification: "Possible orthostatic hypotension.".into(),
            alert_recommended: false,
            follow_up: follow_up.map(String::from),
        }
    }

    #[test]
    fn critical_with_assessment() {
        let a = SeverityAssessment {
            alert_recommended: true,
            ..assessment(Severity::Severe, None)
        };
        let msg = AlertMessage::critical("Ana", " chest pain ", Severity::Moderate, Some(&a));
        assert_eq!(msg.tag(), SenderTag::SystemAlert);
        assert_eq!(
            msg.chat_text(),
            "CRITICAL SYMPTOM ALERT: Ana reported a symptom that needs attention.\n\
             Description: chest pain\n\
             Patient-selected severity: moderate\n\
             AI assessment: severe (alert recommended). Possible orthostatic hypotension."
        );
    }

    #[test]
    fn critical_fallback_mentions_manual_selection() {
        let msg = AlertMessage::critical("Ana", "bleeding", Severity::Severe, None);
        let text = msg.chat_text();
        assert!(text.contains("defaulting based on patient manual severe selection"));
        assert!(msg.email_body().contains(FALLBACK_NOTE));
    }

    #[test]
    fn info_requires_follow_up() {
        let without = assessment(Severity::Moderate, None);
        assert!(AlertMessage::info("Ana", "dizzy", Severity::Mild, &without).is_none());

        let with = assessment(Severity::Moderate, Some("ask about dizziness duration"));
        let msg = AlertMessage::info("Ana", "dizzy", Severity::Mild, &with).unwrap();
        assert!(!msg.is_critical());
        assert_eq!(msg.tag(), SenderTag::SystemInfo);
        assert!(msg.chat_text().contains("Suggested follow-up: ask about dizziness duration"));
        assert!(msg.chat_text().starts_with("Symptom update from Ana (not critical)."));
    }

    #[test]
    fn email_and_sms_name_the_patient() {
        let msg = AlertMessage::critical("Ana", "fainted", Severity::Severe, None);
        assert_eq!(msg.email_subject(), "CareLink alert: Ana reported a critical symptom");
        assert!(msg.email_body().contains("\"fainted\" (self-rated severe)"));
        assert!(msg.sms_text().contains("Ana reported a critical symptom (self-rated severe)"));
    }
}
