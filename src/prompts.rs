//! Prompt templates for the LLM-backed features.
//!
//! Every template wraps patient-provided text in tags so the model can tell
//! instructions apart from data.

use crate::models::enums::Severity;

pub const TRIAGE_SYSTEM_PROMPT: &str = r#"
You are a clinical triage assistant supporting a post-discharge care team.
You assess the severity of a symptom reported by a recently discharged patient.

RULES — ABSOLUTE, NO EXCEPTIONS:
1. Base your assessment only on the report, risk profile, and vitals given.
2. Severity must be exactly one of: mild, moderate, severe.
3. Recommend an alert when the symptom could indicate a complication that
   needs clinician attention today, even if you rate it moderate.
4. Never give the patient advice. Your output is read by the care team.
5. Output a single JSON object and nothing else.
"#;

pub const CARE_PLAN_SYSTEM_PROMPT: &str = r#"
You are a clinical documentation assistant. You draft post-discharge care
plans for review by the patient's doctor. The doctor edits and approves every
plan; write a concise draft, not a final order.

Structure the draft with these Markdown headings:
## Monitoring
## Medications and adherence
## Activity and diet
## Warning signs requiring contact
## Follow-up
"#;

/// Inputs to the severity prompt, all already reduced to text.
pub struct TriagePromptInput<'a> {
    pub description: &'a str,
    pub selected_severity: Severity,
    pub risk_profile: Option<&'a str>,
    pub latest_vitals: Option<&'a str>,
}

pub fn build_triage_prompt(input: &TriagePromptInput<'_>) -> String {
    let risk = input.risk_profile.unwrap_or("No risk profile on file.");
    let vitals = input.latest_vitals.unwrap_or("No vitals recorded.");
    format!(
        r#"<symptom_report>
{description}
</symptom_report>

<patient_selected_severity>{selected}</patient_selected_severity>

<risk_profile>
{risk}
</risk_profile>

<latest_vitals>
{vitals}
</latest_vitals>

Respond with JSON in exactly this shape:
```json
{{
  "ai_severity": "mild | moderate | severe",
  "justification": "one or two sentences",
  "alert_recommended": true,
  "follow_up": "question or check for the doctor, or null"
}}
```"#,
        description = input.description.trim(),
        selected = input.selected_severity.as_str(),
    )
}

pub struct CarePlanPromptInput<'a> {
    pub patient_name: &'a str,
    pub discharge_date: Option<String>,
    pub risk_profile: Option<&'a str>,
    pub latest_vitals: Option<String>,
    /// (reported_at, severity, description), newest first.
    pub recent_symptoms: Vec<(String, Severity, &'a str)>,
}

pub fn build_care_plan_prompt(input: &CarePlanPromptInput<'_>) -> String {
    let symptoms = if input.recent_symptoms.is_empty() {
        "None reported.".to_string()
    } else {
        input
            .recent_symptoms
            .iter()
            .map(|(at, sev, desc)| format!("- {at} [{sev}] {}", desc.trim()))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"Draft a post-discharge care plan for {name}.

<discharge_date>{discharge}</discharge_date>

<risk_profile>
{risk}
</risk_profile>

<latest_vitals>
{vitals}
</latest_vitals>

<recent_symptoms>
{symptoms}
</recent_symptoms>"#,
        name = input.patient_name,
        discharge = input.discharge_date.as_deref().unwrap_or("unknown"),
        risk = input.risk_profile.unwrap_or("No risk profile on file."),
        vitals = input.latest_vitals.as_deref().unwrap_or("No vitals recorded."),
    )
}
