use thiserror::Error;

use crate::config::MailConfig;
use crate::workflows::identity::User;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MailError {
    #[error("mail transport failed: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

pub trait Mailer: Send + Sync {
    fn send(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}

/// Renders the account mails; links point at the frontend.
#[derive(Debug, Clone)]
pub struct MailTemplates {
    frontend_url: String,
}

impl MailTemplates {
    pub fn new(frontend_url: impl Into<String>) -> Self {
        Self {
            frontend_url: frontend_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &MailConfig) -> Self {
        Self::new(config.frontend_url.clone())
    }

    pub fn verification_link(&self, token: &str) -> String {
        format!("{}/verify-email?token={token}", self.frontend_url)
    }

    pub fn verification(&self, user: &User, token: &str, valid_hours: i64) -> OutgoingMail {
        let link = self.verification_link(token);
        let html_body = format!(
            "<html><body>\
             <h2>Welcome, {name}!</h2>\
             <p>Please confirm your email address to activate your account.</p>\
             <p><a href=\"{link}\">Verify email</a></p>\
             <p>This link expires in {valid_hours} hours.</p>\
             </body></html>",
            name = user.profile.name,
        );
        OutgoingMail {
            to: user.email.clone(),
            subject: "Verify your email address".to_string(),
            html_body,
        }
    }

    pub fn welcome(&self, user: &User) -> OutgoingMail {
        let html_body = format!(
            "<html><body>\
             <h2>Your account is ready, {name}!</h2>\
             <p>You can now sign in and browse listings.</p>\
             <p><a href=\"{url}/login\">Sign in</a></p>\
             </body></html>",
            name = user.profile.name,
            url = self.frontend_url,
        );
        OutgoingMail {
            to: user.email.clone(),
            subject: "Welcome to Estate Market".to_string(),
            html_body,
        }
    }
}
