//! Templated outbound mail.
//!
//! Delivery mechanics are a collaborator concern; this module fixes the
//! interface: a template renders to subject and body, and a [`MailSender`]
//! either reports itself disconnected (no mail goes out, flows degrade
//! gracefully) or accepts the rendered message.

use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail delivery failed: {0}")]
    Delivery(String),
}

/// Mail templates known to the system.
#[derive(Debug, Clone)]
pub enum MailTemplate {
    /// Sent when a staff member invites a user.
    UserInvite {
        name: String,
        base_url: String,
        invitation_token: String,
    },
}

impl MailTemplate {
    pub fn subject(&self) -> String {
        match self {
            MailTemplate::UserInvite { .. } => "You have been invited".to_string(),
        }
    }

    pub fn body(&self) -> String {
        match self {
            MailTemplate::UserInvite {
                name,
                base_url,
                invitation_token,
            } => format!(
                "Hello {name},\n\n\
                 An account has been created for you. Set your password to get started:\n\
                 {base_url}/set-password/{invitation_token}\n"
            ),
        }
    }
}

/// A rendered message ready for delivery.
#[derive(Debug, Clone)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl OutgoingMail {
    pub fn from_template(to: impl Into<String>, template: &MailTemplate) -> Self {
        OutgoingMail {
            to: to.into(),
            subject: template.subject(),
            body: template.body(),
        }
    }
}

#[async_trait]
pub trait MailSender: Send + Sync {
    /// Whether a mail transport is configured. When false, callers skip
    /// sending and omit verification tokens.
    fn is_connected(&self) -> bool;

    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError>;
}

/// Sender that logs instead of delivering. Stands in for a real SMTP
/// transport in development and single-node deployments.
pub struct LogMailSender {
    connected: bool,
}

impl LogMailSender {
    pub fn new(connected: bool) -> Self {
        LogMailSender { connected }
    }
}

#[async_trait]
impl MailSender for LogMailSender {
    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        tracing::info!(to = %mail.to, subject = %mail.subject, "outgoing mail");
        Ok(())
    }
}

/// Sender that retains every message it was asked to deliver.
pub struct RecordingMailSender {
    sent: Mutex<Vec<OutgoingMail>>,
}

impl RecordingMailSender {
    pub fn new() -> Self {
        RecordingMailSender {
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().expect("mail recorder poisoned").clone()
    }
}

impl Default for RecordingMailSender {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MailSender for RecordingMailSender {
    fn is_connected(&self) -> bool {
        true
    }

    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        self.sent.lock().expect("mail recorder poisoned").push(mail);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invite_template_links_the_invitation_token() {
        let template = MailTemplate::UserInvite {
            name: "Ada".to_string(),
            base_url: "https://desk.example.com".to_string(),
            invitation_token: "tok123".to_string(),
        };
        let mail = OutgoingMail::from_template("ada@example.com", &template);
        assert_eq!(mail.to, "ada@example.com");
        assert!(mail.body.contains("Ada"));
        assert!(mail.body.contains("https://desk.example.com"));
        assert!(mail.body.contains("tok123"));
    }

    #[tokio::test]
    async fn recording_sender_retains_messages() {
        let sender = RecordingMailSender::new();
        assert!(sender.is_connected());
        sender
            .send(OutgoingMail {
                to: "a@example.com".to_string(),
                subject: "s".to_string(),
                body: "b".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(sender.sent().len(), 1);
    }
}
