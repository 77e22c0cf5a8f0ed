use std::sync::Mutex;

use serde::Serialize;

use super::{EmailSender, NotifyError};

/// Posts emails as JSON to an HTTP mail relay.
pub struct HttpMailRelay {
    url: String,
    from: String,
    client: reqwest::blocking::Client,
}

#[derive(Serialize)]
struct RelayRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    body: &'a str,
}

impl HttpMailRelay {
    pub fn new(url: &str, from: &str, timeout_secs: u64) -> Result<Self, NotifyError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        Ok(Self {
            url: url.to_string(),
            from: from.to_string(),
            client,
        })
    }
}

impl EmailSender for HttpMailRelay {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        validate_address(to)?;
        let response = self
            .client
            .post(&self.url)
            .json(&RelayRequest {
                from: &self.from,
                to,
                subject,
                body,
            })
            .send()
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        tracing::info!(to = %mask_address(to), "Email handed to relay");
        Ok(())
    }
}

/// Used when no relay is configured: the email is written to the log only.
pub struct LogMailer;

impl EmailSender for LogMailer {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        validate_address(to)?;
        tracing::info!(to = %mask_address(to), subject, body_len = body.len(), "Email (log only, no relay configured)");
        Ok(())
    }
}

/// Minimal shape check: one `@` with something on each side.
pub fn validate_address(to: &str) -> Result<(), NotifyError> {
    match to.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') && !domain.contains('@') => {
            Ok(())
        }
        _ => Err(NotifyError::InvalidRecipient(to.to_string())),
    }
}

/// Keep the first character of the local part and the whole domain.
fn mask_address(to: &str) -> String {
    match to.split_once('@') {
        Some((local, domain)) => {
            let first: String = local.chars().take(1).collect();
            format!("{first}***@{domain}")
        }
        None => "***".to_string(),
    }
}

/// A sent email as captured by `RecordingMailer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Test double: records every email, optionally failing each send.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentEmail>>,
    fail_with: Option<NotifyError>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(err: NotifyError) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_with: Some(err),
        }
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl EmailSender for RecordingMailer {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(SentEmail {
                to: to.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
            });
        }
        Ok(())
    }
}
