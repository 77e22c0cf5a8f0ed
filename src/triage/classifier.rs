use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::llm::{LlmClient, LlmError};
use crate::models::enums::Severity;
use crate::prompts::{build_triage_prompt, TriagePromptInput, TRIAGE_SYSTEM_PROMPT};

/// The classifier's view of one report. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeverityAssessment {
    pub ai_severity: Severity,
    pub justification: String,
    pub alert_recommended: bool,
    pub follow_up: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ClassificationRequest {
    pub patient_id: Uuid,
    pub description: String,
    pub risk_profile: Option<String>,
    pub latest_vitals: Option<String>,
    pub selected_severity: Severity,
}

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("No JSON object in classifier response")]
    NoJson,

    #[error("Malformed classifier JSON: {0}")]
    Json(String),

    #[error("Unknown severity from classifier: {0}")]
    UnknownSeverity(String),
}

/// Severity classification backed by an LLM.
pub struct SeverityClassifier<'a> {
    client: &'a dyn LlmClient,
    model: &'a str,
}

impl<'a> SeverityClassifier<'a> {
    pub fn new(client: &'a dyn LlmClient, model: &'a str) -> Self {
        Self { client, model }
    }

    pub fn classify(&self, req: &ClassificationRequest) -> Result<SeverityAssessment, ClassifierError> {
        let prompt = build_triage_prompt(&TriagePromptInput {
            description: &req.description,
            selected_severity: req.selected_severity,
            risk_profile: req.risk_profile.as_deref(),
            latest_vitals: req.latest_vitals.as_deref(),
        });
        let response = self.client.generate(self.model, &prompt, TRIAGE_SYSTEM_PROMPT)?;
        parse_assessment(&response)
    }

    /// Classify, treating any failure as "classifier unavailable".
    pub fn assess(&self, req: &ClassificationRequest) -> Option<SeverityAssessment> {
        match self.classify(req) {
            Ok(assessment) => {
                tracing::debug!(
                    patient_id = %req.patient_id,
                    ai_severity = %assessment.ai_severity,
                    alert_recommended = assessment.alert_recommended,
                    "Severity assessed"
                );
                Some(assessment)
            }
            Err(e) => {
                tracing::warn!(
                    patient_id = %req.patient_id,
                    error = %e,
                    "Severity classifier unavailable, falling back to patient-selected severity"
                );
                None
            }
        }
    }
}

#[derive(Deserialize)]
struct RawAssessment {
    ai_severity: String,
    justification: String,
    alert_recommended: bool,
    #[serde(default)]
    follow_up: Option<String>,
}

/// Parse the model output. Accepts a ```json fenced block or a bare object
/// surrounded by prose.
pub fn parse_assessment(response: &str) -> Result<SeverityAssessment, ClassifierError> {
    let json = extract_json_object(response).ok_or(ClassifierError::NoJson)?;
    let raw: RawAssessment =
        serde_json::from_str(json).map_err(|e| ClassifierError::Json(e.to_string()))?;

    let ai_severity = match raw.ai_severity.trim().to_lowercase().as_str() {
        "mild" => Severity::Mild,
        "moderate" => Severity::Moderate,
        "severe" => Severity::Severe,
        _ => return Err(ClassifierError::UnknownSeverity(raw.ai_severity)),
    };

    Ok(SeverityAssessment {
        ai_severity,
        justification: raw.justification.trim().to_string(),
        alert_recommended: raw.alert_recommended,
        follow_up: raw
            .follow_up
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty() && !f.eq_ignore_ascii_case("null")),
    })
}

fn extract_json_object(response: &str) -> Option<&str> {
    let body = match response.find("```json") {
        Some(start) => {
            let content = &response[start + 7..];
            let end = content.find("```").unwrap_or(content.len());
            &content[..end]
        }
        None => response,
    };
    let open = body.find('{')?;
    let close = body.rfind('}')?;
    (close > open).then(|| &body[open..=close])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;

    fn request(selected: Severity) -> ClassificationRequest {
        ClassificationRequest {
            patient_id: Uuid::new_v4(),
            description: "chest tightness after walking".into(),
            risk_profile: Some("post-MI, discharged 5 days ago".into()),
            latest_vitals: Some("HR 110 bpm".into()),
            selected_severity: selected,
        }
    }

    #[test]
    fn parses_fenced_json() {
        let response = "Here is my assessment:\n```json\n{\"ai_severity\": \"Severe\", \"justification\": \" Possible angina. \", \"alert_recommended\": true, \"follow_up\": null}\n```\nThanks.";
        let a = parse_assessment(response).unwrap();
        assert_eq!(a.ai_severity, Severity::Severe);
        assert_eq!(a.justification, "Possible angina.");
        assert!(a.alert_recommended);
        assert_eq!(a.follow_up, None);
    }

    #[test]
    fn parses_bare_json_with_follow_up() {
        let response = r#"{"ai_severity":"moderate","justification":"Orthostatic.","alert_recommended":false,"follow_up":"ask about dizziness duration"}"#;
        let a = parse_assessment(response).unwrap();
        assert_eq!(a.ai_severity, Severity::Moderate);
        assert_eq!(a.follow_up.as_deref(), Some("ask about dizziness duration"));
    }

    #[test]
    fn blank_follow_up_is_none() {
        let response = r#"{"ai_severity":"mild","justification":"ok","alert_recommended":false,"follow_up":"  "}"#;
        assert_eq!(parse_assessment(response).unwrap().follow_up, None);
    }

    #[test]
    fn rejects_unknown_severity() {
        let response = r#"{"ai_severity":"critical","justification":"x","alert_recommended":true}"#;
        assert!(matches!(
            parse_assessment(response),
            Err(ClassifierError::UnknownSeverity(s)) if s == "critical"
        ));
    }

    #[test]
    fn rejects_missing_fields() {
        let response = r#"{"ai_severity":"mild"}"#;
        assert!(matches!(parse_assessment(response), Err(ClassifierError::Json(_))));
    }

    #[test]
    fn rejects_prose_only() {
        assert!(matches!(
            parse_assessment("I cannot assess this."),
            Err(ClassifierError::NoJson)
        ));
    }

    #[test]
    fn classify_sends_report_in_prompt() {
        let client = MockLlmClient::new(
            r#"{"ai_severity":"severe","justification":"j","alert_recommended":true}"#,
        );
        let classifier = SeverityClassifier::new(&client, "medgemma");
        let a = classifier.classify(&request(Severity::Mild)).unwrap();
        assert_eq!(a.ai_severity, Severity::Severe);

        let prompt = client.last_prompt().unwrap();
        assert!(prompt.contains("chest tightness after walking"));
        assert!(prompt.contains("post-MI"));
        assert!(prompt.contains("HR 110 bpm"));
    }

    #[test]
    fn assess_returns_none_on_llm_failure() {
        let client = MockLlmClient::failing("connection refused");
        let classifier = SeverityClassifier::new(&client, "medgemma");
        assert!(classifier.assess(&request(Severity::Severe)).is_none());
    }

    #[test]
    fn assess_returns_none_on_garbage() {
        let client = MockLlmClient::new("{not json}");
        let classifier = SeverityClassifier::new(&client, "medgemma");
        assert!(classifier.assess(&request(Severity::Mild)).is_none());
    }
}
