use serde::Serialize;

use super::classifier::SeverityAssessment;
use crate::models::enums::Severity;

/// Whether a report is critical. Any one signal suffices and none can
/// suppress another:
/// patient selected severe, AI rated severe, or AI recommended an alert.
pub fn decide(selected: Severity, assessment: Option<&SeverityAssessment>) -> bool {
    selected == Severity::Severe
        || assessment.is_some_and(|a| a.ai_severity == Severity::Severe || a.alert_recommended)
}

/// The signals that made a report critical, for messages and logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AlertReason {
    pub patient_selected_severe: bool,
    pub ai_rated_severe: bool,
    pub ai_recommended_alert: bool,
}

impl AlertReason {
    pub fn evaluate(selected: Severity, assessment: Option<&SeverityAssessment>) -> Self {
        Self {
            patient_selected_severe: selected == Severity::Severe,
            ai_rated_severe: assessment.is_some_and(|a| a.ai_severity == Severity::Severe),
            ai_recommended_alert: assessment.is_some_and(|a| a.alert_recommended),
        }
    }

    pub fn is_critical(&self) -> bool {
        self.patient_selected_severe || self.ai_rated_severe || self.ai_recommended_alert
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Severity; 3] = [Severity::Mild, Severity::Moderate, Severity::Severe];

    fn assessment(ai: Severity, recommended: bool) -> SeverityAssessment {
        SeverityAssessment {
            ai_severity: ai,
            justification: "test".into(),
            alert_recommended: recommended,
            follow_up: None,
        }
    }

    fn every_assessment() -> Vec<Option<SeverityAssessment>> {
        let mut all = vec![None];
        for ai in ALL {
            for rec in [false, true] {
                all.push(Some(assessment(ai, rec)));
            }
        }
        all
    }

    #[test]
    fn severe_selection_is_always_critical() {
        for a in every_assessment() {
            assert!(decide(Severity::Severe, a.as_ref()), "assessment {a:?}");
        }
    }

    #[test]
    fn no_assessment_and_not_severe_is_not_critical() {
        assert!(!decide(Severity::Mild, None));
        assert!(!decide(Severity::Moderate, None));
    }

    #[test]
    fn ai_signals_escalate_mild_selection() {
        assert!(decide(Severity::Mild, Some(&assessment(Severity::Severe, false))));
        assert!(decide(Severity::Mild, Some(&assessment(Severity::Mild, true))));
        assert!(!decide(Severity::Mild, Some(&assessment(Severity::Moderate, false))));
    }

    #[test]
    fn decide_matches_reason_for_every_combination() {
        for selected in ALL {
            for a in every_assessment() {
                let reason = AlertReason::evaluate(selected, a.as_ref());
                assert_eq!(decide(selected, a.as_ref()), reason.is_critical());
            }
        }
    }

    #[test]
    fn reason_records_each_signal() {
        let reason = AlertReason::evaluate(Severity::Moderate, Some(&assessment(Severity::Severe, true)));
        assert!(!reason.patient_selected_severe);
        assert!(reason.ai_rated_severe);
        assert!(reason.ai_recommended_alert);
    }
}
