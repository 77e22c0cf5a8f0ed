use std::sync::Mutex;

use super::{NotifyError, SmsSender};

/// No SMS gateway is integrated: a "sent" SMS is a structured log line.
pub struct LogSms;

impl SmsSender for LogSms {
    fn send(&self, phone: &str, text: &str) -> Result<(), NotifyError> {
        let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
        if digits < 6 {
            return Err(NotifyError::InvalidRecipient(phone.to_string()));
        }
        tracing::info!(phone = %mask_phone(phone), text, "SMS notification");
        Ok(())
    }
}

/// Keep the last four digits only.
fn mask_phone(phone: &str) -> String {
    let digits: Vec<char> = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    let keep = digits.len().saturating_sub(4);
    let tail: String = digits[keep..].iter().collect();
    format!("***{tail}")
}

/// Test double: records every SMS.
#[derive(Default)]
pub struct RecordingSms {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingSms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl SmsSender for RecordingSms {
    fn send(&self, phone: &str, text: &str) -> Result<(), NotifyError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((phone.to_string(), text.to_string()));
        }
        Ok(())
    }
}
