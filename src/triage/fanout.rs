use serde::Serialize;
use uuid::Uuid;

use super::channel::channel_id;
use super::classifier::SeverityAssessment;
use super::decision::{decide, AlertReason};
use super::message::AlertMessage;
use crate::db::{self, DatabaseError, Store};
use crate::models::*;
use crate::notify::{EmailSender, SmsSender};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyChannel {
    Sms,
    Email,
    Chat,
}

impl NotifyChannel {
    fn label(&self) -> &'static str {
        match self {
            Self::Sms => "SMS",
            Self::Email => "Email",
            Self::Chat => "Doctor chat",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcome {
    Taken,
    Skipped,
    Failed,
}

/// What happened on one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionRecord {
    pub channel: NotifyChannel,
    pub outcome: ActionOutcome,
    pub detail: String,
}

impl ActionRecord {
    fn new(channel: NotifyChannel, outcome: ActionOutcome, detail: impl Into<String>) -> Self {
        Self {
            channel,
            outcome,
            detail: detail.into(),
        }
    }

    pub fn summary_line(&self) -> String {
        let outcome = match self.outcome {
            ActionOutcome::Taken => "sent",
            ActionOutcome::Skipped => "skipped",
            ActionOutcome::Failed => "failed",
        };
        format!("{} ({outcome}): {}", self.channel.label(), self.detail)
    }
}

/// Consolidated result of one fan-out. User-facing status, not an error.
#[derive(Debug, Clone, Serialize)]
pub struct FanoutReport {
    pub critical: bool,
    pub reason: AlertReason,
    pub actions: Vec<ActionRecord>,
}

impl FanoutReport {
    pub fn outcome(&self, channel: NotifyChannel) -> Option<ActionOutcome> {
        self.actions
            .iter()
            .find(|a| a.channel == channel)
            .map(|a| a.outcome)
    }

    pub fn summary_lines(&self) -> Vec<String> {
        self.actions.iter().map(ActionRecord::summary_line).collect()
    }
}

/// Delivery channels available to the fan-out.
pub struct Notifiers<'a> {
    pub store: &'a Store,
    pub mailer: &'a dyn EmailSender,
    pub sms: &'a dyn SmsSender,
}

/// Who can be notified about a patient's report.
pub struct Recipients<'a> {
    pub patient_id: Uuid,
    pub patient_name: &'a str,
    pub doctor_id: Option<Uuid>,
    pub contact: Option<&'a EmergencyContact>,
}

/// Decide and notify for one stored report.
///
/// Critical: SMS, email, and doctor chat are each attempted; a failure or
/// missing recipient on one never blocks the others. Not critical: at most a
/// "System Info" chat message when the classifier suggested a follow-up.
pub fn dispatch(
    notifiers: &Notifiers<'_>,
    recipients: &Recipients<'_>,
    report: &SymptomReport,
    assessment: Option<&SeverityAssessment>,
) -> FanoutReport {
    let selected = report.selected_severity;
    let critical = decide(selected, assessment);
    let reason = AlertReason::evaluate(selected, assessment);

    let actions = if critical {
        tracing::warn!(
            patient_id = %recipients.patient_id,
            report_id = %report.id,
            ?reason,
            "Critical symptom report, notifying contacts"
        );
        let message = AlertMessage::critical(
            recipients.patient_name,
            &report.description,
            selected,
            assessment,
        );
        vec![
            send_sms(notifiers, recipients, &message),
            send_email(notifiers, recipients, &message),
            post_chat(notifiers, recipients, &message),
        ]
    } else {
        let not_critical = "report not critical";
        let chat = match assessment.and_then(|a| {
            AlertMessage::info(recipients.patient_name, &report.description, selected, a)
        }) {
            Some(message) => post_chat(notifiers, recipients, &message),
            None if recipients.doctor_id.is_none() => {
                ActionRecord::new(NotifyChannel::Chat, ActionOutcome::Skipped, "no assigned doctor")
            }
            None => ActionRecord::new(
                NotifyChannel::Chat,
                ActionOutcome::Skipped,
                "report not critical and no follow-up suggested",
            ),
        };
        vec![
            ActionRecord::new(NotifyChannel::Sms, ActionOutcome::Skipped, not_critical),
            ActionRecord::new(NotifyChannel::Email, ActionOutcome::Skipped, not_critical),
            chat,
        ]
    };

    FanoutReport {
        critical,
        reason,
        actions,
    }
}

fn send_sms(n: &Notifiers<'_>, r: &Recipients<'_>, message: &AlertMessage) -> ActionRecord {
    let Some(phone) = r.contact.and_then(EmergencyContact::phone) else {
        return ActionRecord::new(
            NotifyChannel::Sms,
            ActionOutcome::Skipped,
            "no emergency contact phone on file",
        );
    };
    match n.sms.send(phone, &message.sms_text()) {
        Ok(()) => ActionRecord::new(
            NotifyChannel::Sms,
            ActionOutcome::Taken,
            "emergency contact notified by SMS",
        ),
        Err(e) => {
            tracing::warn!(patient_id = %r.patient_id, error = %e, "SMS notification failed");
            ActionRecord::new(NotifyChannel::Sms, ActionOutcome::Failed, e.to_string())
        }
    }
}

fn send_email(n: &Notifiers<'_>, r: &Recipients<'_>, message: &AlertMessage) -> ActionRecord {
    let Some(address) = r.contact.and_then(EmergencyContact::email) else {
        return ActionRecord::new(
            NotifyChannel::Email,
            ActionOutcome::Skipped,
            "no emergency contact email on file",
        );
    };
    match n
        .mailer
        .send(address, &message.email_subject(), &message.email_body())
    {
        Ok(()) => ActionRecord::new(
            NotifyChannel::Email,
            ActionOutcome::Taken,
            format!("emailed {address}"),
        ),
        Err(e) => {
            tracing::warn!(patient_id = %r.patient_id, error = %e, "Emergency email failed");
            ActionRecord::new(
                NotifyChannel::Email,
                ActionOutcome::Failed,
                format!("email to {address} failed: {e}"),
            )
        }
    }
}

fn post_chat(n: &Notifiers<'_>, r: &Recipients<'_>, message: &AlertMessage) -> ActionRecord {
    let Some(doctor_id) = r.doctor_id else {
        return ActionRecord::new(NotifyChannel::Chat, ActionOutcome::Skipped, "no assigned doctor");
    };
    let label = message.tag().display_label().unwrap_or("System");
    match post_system_message(n.store, r.patient_id, doctor_id, message) {
        Ok(_) => ActionRecord::new(
            NotifyChannel::Chat,
            ActionOutcome::Taken,
            format!("{label} posted to assigned doctor"),
        ),
        Err(e) => {
            tracing::warn!(patient_id = %r.patient_id, error = %e, "Doctor chat alert failed");
            ActionRecord::new(NotifyChannel::Chat, ActionOutcome::Failed, e.to_string())
        }
    }
}

/// Store a system-tagged message from the patient's side of the channel.
pub fn post_system_message(
    store: &Store,
    patient_id: Uuid,
    doctor_id: Uuid,
    message: &AlertMessage,
) -> Result<ChatMessage, DatabaseError> {
    let msg = ChatMessage {
        id: Uuid::new_v4(),
        channel_id: channel_id(&patient_id, &doctor_id),
        sender_id: patient_id,
        receiver_id: doctor_id,
        sender_tag: message.tag(),
        body: message.chat_text(),
        sent_at: db::now_utc(),
    };
    store.with_conn(|conn| db::insert_chat_message(conn, &msg))?;
    Ok(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures::make_user;
    use crate::models::enums::{Role, SenderTag, Severity};
    use crate::notify::{NotifyError, RecordingMailer, RecordingSms};

    struct Fixture {
        store: Store,
        patient: User,
        doctor: User,
    }

    fn fixture() -> Fixture {
        let store = Store::open_in_memory().unwrap();
        let (patient, doctor) = store
            .with_conn(|c| {
                Ok((
                    make_user(c, Role::Patient, "Ana"),
                    make_user(c, Role::Doctor, "Dr Okafor"),
                ))
            })
            .unwrap();
        Fixture { store, patient, doctor }
    }

    fn report(patient_id: Uuid, selected: Severity) -> SymptomReport {
        SymptomReport {
            id: Uuid::new_v4(),
            patient_id,
            reporter_id: patient_id,
            reported_at: db::now_utc(),
            selected_severity: selected,
            description: "short of breath on stairs".into(),
        }
    }

    fn full_contact() -> EmergencyContact {
        EmergencyContact {
            name: Some("Kofi".into()),
            phone: Some("+15550104477".into()),
            email: Some("kofi@example.com".into()),
        }
    }

    fn channel_messages(f: &Fixture) -> Vec<ChatMessage> {
        let chan = channel_id(&f.patient.id, &f.doctor.id);
        f.store
            .with_conn(|c| db::get_channel_messages(c, &chan, 50))
            .unwrap()
    }

    #[test]
    fn critical_attempts_all_three_channels() {
        let f = fixture();
        let mailer = RecordingMailer::new();
        let sms = RecordingSms::new();
        let contact = full_contact();
        let n = Notifiers { store: &f.store, mailer: &mailer, sms: &sms };
        let r = Recipients {
            patient_id: f.patient.id,
            patient_name: "Ana",
            doctor_id: Some(f.doctor.id),
            contact: Some(&contact),
        };

        let out = dispatch(&n, &r, &report(f.patient.id, Severity::Severe), None);

        assert!(out.critical);
        assert_eq!(out.outcome(NotifyChannel::Sms), Some(ActionOutcome::Taken));
        assert_eq!(out.outcome(NotifyChannel::Email), Some(ActionOutcome::Taken));
        assert_eq!(out.outcome(NotifyChannel::Chat), Some(ActionOutcome::Taken));
        assert_eq!(sms.sent()[0].0, "+15550104477");
        assert_eq!(mailer.sent()[0].to, "kofi@example.com");

        let msgs = channel_messages(&f);
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].sender_tag, SenderTag::SystemAlert);
        assert_eq!(msgs[0].receiver_id, f.doctor.id);
    }

    #[test]
    fn email_failure_does_not_block_chat() {
        let f = fixture();
        let mailer = RecordingMailer::failing(NotifyError::Transport("relay down".into()));
        let sms = RecordingSms::new();
        let contact = EmergencyContact {
            phone: None,
            ..full_contact()
        };
        let n = Notifiers { store: &f.store, mailer: &mailer, sms: &sms };
        let r = Recipients {
            patient_id: f.patient.id,
            patient_name: "Ana",
            doctor_id: Some(f.doctor.id),
            contact: Some(&contact),
        };

        let out = dispatch(&n, &r, &report(f.patient.id, Severity::Severe), None);

        assert_eq!(out.outcome(NotifyChannel::Sms), Some(ActionOutcome::Skipped));
        assert_eq!(out.outcome(NotifyChannel::Email), Some(ActionOutcome::Failed));
        assert_eq!(out.outcome(NotifyChannel::Chat), Some(ActionOutcome::Taken));
        assert!(sms.sent().is_empty());
        assert_eq!(channel_messages(&f).len(), 1);

        let lines = out.summary_lines();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("Email (failed): email to kofi@example.com failed"));
    }

    #[test]
    fn chat_store_failure_is_recorded_not_raised() {
        let f = fixture();
        f.store
            .with_conn(|c| {
                c.execute_batch("DROP TABLE chat_messages;")?;
                Ok(())
            })
            .unwrap();
        let mailer = RecordingMailer::new();
        let sms = RecordingSms::new();
        let contact = full_contact();
        let n = Notifiers { store: &f.store, mailer: &mailer, sms: &sms };
        let r = Recipients {
            patient_id: f.patient.id,
            patient_name: "Ana",
            doctor_id: Some(f.doctor.id),
            contact: Some(&contact),
        };

        let out = dispatch(&n, &r, &report(f.patient.id, Severity::Severe), None);
        assert_eq!(out.outcome(NotifyChannel::Chat), Some(ActionOutcome::Failed));
        assert_eq!(out.outcome(NotifyChannel::Email), Some(ActionOutcome::Taken));
    }

    #[test]
    fn no_doctor_skips_chat_in_both_paths() {
        let f = fixture();
        let mailer = RecordingMailer::new();
        let sms = RecordingSms::new();
        let n = Notifiers { store: &f.store, mailer: &mailer, sms: &sms };
        let r = Recipients {
            patient_id: f.patient.id,
            patient_name: "Ana",
            doctor_id: None,
            contact: None,
        };

        let critical = dispatch(&n, &r, &report(f.patient.id, Severity::Severe), None);
        assert_eq!(critical.outcome(NotifyChannel::Chat), Some(ActionOutcome::Skipped));
        assert_eq!(critical.outcome(NotifyChannel::Sms), Some(ActionOutcome::Skipped));
        assert_eq!(critical.outcome(NotifyChannel::Email), Some(ActionOutcome::Skipped));

        let advisory = SeverityAssessment {
            ai_severity: Severity::Moderate,
            justification: "j".into(),
            alert_recommended: false,
            follow_up: Some("check fluids".into()),
        };
        let info = dispatch(&n, &r, &report(f.patient.id, Severity::Mild), Some(&advisory));
        assert!(!info.critical);
        assert_eq!(info.outcome(NotifyChannel::Chat), Some(ActionOutcome::Skipped));
        assert!(info.actions[2].detail.contains("no assigned doctor"));
    }

    #[test]
    fn non_critical_without_follow_up_posts_nothing() {
        let f = fixture();
        let mailer = RecordingMailer::new();
        let sms = RecordingSms::new();
        let contact = full_contact();
        let n = Notifiers { store: &f.store, mailer: &mailer, sms: &sms };
        let r = Recipients {
            patient_id: f.patient.id,
            patient_name: "Ana",
            doctor_id: Some(f.doctor.id),
            contact: Some(&contact),
        };
        let quiet = SeverityAssessment {
            ai_severity: Severity::Moderate,
            justification: "j".into(),
            alert_recommended: false,
            follow_up: None,
        };

        let out = dispatch(&n, &r, &report(f.patient.id, Severity::Moderate), Some(&quiet));
        assert!(!out.critical);
        assert!(out.actions.iter().all(|a| a.outcome == ActionOutcome::Skipped));
        assert!(channel_messages(&f).is_empty());
        assert!(mailer.sent().is_empty());
        assert!(sms.sent().is_empty());
    }
}
