// ABOUTME: Outbound email abstraction used by the email worker's tool.
// ABOUTME: Ships a logging transport for deployments without SMTP and a recording transport for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ulid::Ulid;

/// An email ready to be handed to a transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingEmail {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl OutgoingEmail {
    /// Human-readable rendering echoed back in send confirmations.
    pub fn render(&self) -> String {
        format!(
            "--- SENDING EMAIL ---\nTo: {}\nSubject: {}\nBody:\n{}\n-----------------------",
            self.recipient, self.subject, self.body
        )
    }
}

/// Receipt for a message accepted by a transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub message_id: Ulid,
    pub accepted_at: DateTime<Utc>,
}

impl Delivery {
    fn now() -> Self {
        Self {
            message_id: Ulid::new(),
            accepted_at: Utc::now(),
        }
    }
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid recipient address '{0}'")]
    InvalidRecipient(String),

    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

/// Sends email. Implementations must tolerate concurrent calls from
/// independent turns.
#[async_trait]
pub trait EmailTransport: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<Delivery, MailError>;

    /// Transport name for logging.
    fn name(&self) -> &str;
}

/// A recipient is `local@domain` with exactly one `@`, no whitespace, and a
/// dotted domain whose labels are all non-empty.
fn validate_recipient(recipient: &str) -> Result<(), MailError> {
    let invalid = || MailError::InvalidRecipient(recipient.to_string());

    if recipient.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = recipient.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(invalid());
    }
    Ok(())
}

/// Accepts every well-addressed email and writes it to the log instead of
/// delivering it.
#[derive(Debug, Clone, Default)]
pub struct LogTransport;

#[async_trait]
impl EmailTransport for LogTransport {
    async fn send(&self, email: &OutgoingEmail) -> Result<Delivery, MailError> {
        validate_recipient(&email.recipient)?;
        let delivery = Delivery::now();
        tracing::info!(
            message_id = %delivery.message_id,
            recipient = %email.recipient,
            subject = %email.subject,
            "email accepted by log transport"
        );
        Ok(delivery)
    }

    fn name(&self) -> &str {
        "log"
    }
}

/// Keeps every accepted email in memory so callers can inspect the outbox.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every email accepted so far, oldest first.
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl EmailTransport for RecordingTransport {
    async fn send(&self, email: &OutgoingEmail) -> Result<Delivery, MailError> {
        validate_recipient(&email.recipient)?;
        let mut sent = self
            .sent
            .lock()
            .map_err(|_| MailError::Unavailable("outbox lock poisoned".to_string()))?;
        sent.push(email.clone());
        Ok(Delivery::now())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(recipient: &str) -> OutgoingEmail {
        OutgoingEmail {
            recipient: recipient.to_string(),
            subject: "Leave request".to_string(),
            body: "I'd like to take Friday off.".to_string(),
        }
    }

    #[test]
    fn render_echoes_every_field() {
        let rendered = email("arjun.verma@example.com").render();
        assert!(rendered.starts_with("--- SENDING EMAIL ---"));
        assert!(rendered.contains("To: arjun.verma@example.com"));
        assert!(rendered.contains("Subject: Leave request"));
        assert!(rendered.contains("Body:\nI'd like to take Friday off."));
    }

    #[tokio::test]
    async fn log_transport_rejects_malformed_recipients() {
        let transport = LogTransport;
        assert!(transport.send(&email("manager@example.com")).await.is_ok());

        for bad in ["", "manager", "@example.com", "manager@localhost"] {
            let err = transport.send(&email(bad)).await.unwrap_err();
            assert!(matches!(err, MailError::InvalidRecipient(_)), "{bad}");
        }
    }

    #[test]
    fn recipient_needs_one_at_and_a_dotted_domain() {
        for good in ["arjun.verma@example.com", "hr-team@mail.example.co.in"] {
            assert!(validate_recipient(good).is_ok(), "{good}");
        }

        for bad in [
            "a@.com",
            "a@b@c.com",
            "a b@example.com",
            " arjun@example.com",
            "arjun@example.com\n",
            "a@example.",
            "a@example..com",
        ] {
            let err = validate_recipient(bad).unwrap_err();
            assert!(matches!(err, MailError::InvalidRecipient(ref r) if r == bad), "{bad:?}");
        }
    }

    #[tokio::test]
    async fn recording_transport_keeps_outbox_in_order() {
        let transport = RecordingTransport::new();
        transport.send(&email("a@example.com")).await.unwrap();
        transport.send(&email("b@example.com")).await.unwrap();
        let _ = transport.send(&email("nobody")).await;

        let sent = transport.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].recipient, "a@example.com");
        assert_eq!(sent[1].recipient, "b@example.com");
    }
}
