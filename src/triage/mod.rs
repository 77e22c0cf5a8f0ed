//! Symptom triage: severity classification, the critical-alert decision,
//! and notification fan-out to the emergency contact and assigned doctor.
//!
//! Flow for one submission (`submit::submit_symptom_report`):
//! persist report → classify (optional) → `decide` → `fanout::dispatch`.
//! Only the persistence step can fail the submission.

pub mod channel;
pub mod classifier;
pub mod decision;
pub mod fanout;
pub mod message;
pub mod submit;

pub use channel::channel_id;
pub use classifier::{ClassificationRequest, ClassifierError, SeverityAssessment, SeverityClassifier};
pub use decision::{decide, AlertReason};
pub use fanout::{ActionOutcome, ActionRecord, FanoutReport, NotifyChannel};
pub use message::AlertMessage;
pub use submit::{submit_symptom_report, SubmissionOutcome, SymptomInput, TriageContext, TriageError};
