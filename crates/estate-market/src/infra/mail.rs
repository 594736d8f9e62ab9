use std::sync::{Arc, Mutex};
use tracing::info;

use crate::workflows::auth::{MailError, Mailer, OutgoingMail};

/// Writes outgoing mail to the log instead of an SMTP relay.
#[derive(Debug, Clone)]
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

impl Mailer for LogMailer {
    fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        info!(
            from = %self.from,
            to = %mail.to,
            subject = %mail.subject,
            bytes = mail.html_body.len(),
            "mail dispatched"
        );
        Ok(())
    }
}

#[derive(Default)]
struct Outbox {
    sent: Vec<OutgoingMail>,
    failing: bool,
}

/// Keeps every message in memory; can be switched to fail deliveries.
#[derive(Clone, Default)]
pub struct RecordingMailer {
    outbox: Arc<Mutex<Outbox>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        if let Ok(mut outbox) = self.outbox.lock() {
            outbox.failing = failing;
        }
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.outbox
            .lock()
            .map(|outbox| outbox.sent.clone())
            .unwrap_or_default()
    }

    pub fn sent_to(&self, address: &str) -> Vec<OutgoingMail> {
        self.sent()
            .into_iter()
            .filter(|mail| mail.to == address)
            .collect()
    }

    /// Pulls the token out of the most recent verification link sent to `address`.
    pub fn last_verification_token(&self, address: &str) -> Option<String> {
        self.sent_to(address).iter().rev().find_map(|mail| {
            let (_, rest) = mail.html_body.split_once("verify-email?token=")?;
            let token: String = rest
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
                .collect();
            (!token.is_empty()).then_some(token)
        })
    }
}

impl Mailer for RecordingMailer {
    fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let mut outbox = self
            .outbox
            .lock()
            .map_err(|_| MailError::Transport("outbox mutex poisoned".to_string()))?;
        if outbox.failing {
            return Err(MailError::Transport("simulated delivery failure".to_string()));
        }
        outbox.sent.push(mail.clone());
        Ok(())
    }
}
