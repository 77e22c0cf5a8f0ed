//! Outbound notification channels: email and SMS.
//!
//! Both are best-effort. Callers record the outcome and move on; nothing
//! here retries or queues.

pub mod mail;
pub mod sms;

pub use mail::*;
pub use sms::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("Mail relay unreachable: {0}")]
    Transport(String),

    #[error("Mail relay rejected message (status {status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Sends one plain-text email.
pub trait EmailSender: Send + Sync {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Sends one text message.
pub trait SmsSender: Send + Sync {
    fn send(&self, phone: &str, text: &str) -> Result<(), NotifyError>;
}
