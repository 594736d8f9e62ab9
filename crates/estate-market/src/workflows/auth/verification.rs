use chrono::Duration;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use super::domain::EmailVerificationToken;
use super::mail::{MailTemplates, Mailer};
use super::repository::VerificationTokenRepository;
use crate::workflows::clock::Clock;
use crate::workflows::error::WorkflowError;
use crate::workflows::identity::domain::normalize_email;
use crate::workflows::identity::{User, UserRepository, UserView};

/// Issues and consumes email verification tokens.
pub struct EmailVerificationService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn VerificationTokenRepository>,
    mailer: Arc<dyn Mailer>,
    templates: MailTemplates,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl EmailVerificationService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn VerificationTokenRepository>,
        mailer: Arc<dyn Mailer>,
        templates: MailTemplates,
        clock: Arc<dyn Clock>,
        ttl: Duration,
    ) -> Self {
        Self {
            users,
            tokens,
            mailer,
            templates,
            clock,
            ttl,
        }
    }

    /// Replaces any live token for the user and mails the new one.
    /// A delivery failure is returned to the caller.
    pub fn issue_for(&self, user: &User) -> Result<EmailVerificationToken, WorkflowError> {
        let now = self.clock.now();
        let token = EmailVerificationToken {
            token: Uuid::new_v4().to_string(),
            user_id: user.id,
            expires_at: now + self.ttl,
            verified_at: None,
            created_at: now,
        };
        self.tokens.replace_for_user(token.clone())?;

        let mail = self
            .templates
            .verification(user, &token.token, self.ttl.num_hours());
        self.mailer.send(&mail)?;

        info!(user_id = %user.id, expires_at = %token.expires_at, "verification email sent");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<UserView, WorkflowError> {
        let mut record = self
            .tokens
            .find(token.trim())?
            .ok_or_else(|| WorkflowError::NotFound("Invalid verification token".to_string()))?;

        if record.is_consumed() {
            return Err(WorkflowError::AlreadyVerified);
        }

        let now = self.clock.now();
        if record.is_expired(now) {
            return Err(WorkflowError::Gone(
                "Verification token has expired, request a new one".to_string(),
            ));
        }

        let mut user = self
            .users
            .fetch(record.user_id)?
            .ok_or_else(|| WorkflowError::not_found("User", "id", record.user_id))?;

        record.verified_at = Some(now);
        self.tokens.update(&record)?;
        user.mark_email_verified(now);
        self.users.update(&user)?;
        info!(user_id = %user.id, "email verified");

        let welcome = self.templates.welcome(&user);
        if let Err(err) = self.mailer.send(&welcome) {
            error!(user_id = %user.id, error = %err, "failed to send welcome email");
        }

        Ok(user.view())
    }

    pub fn resend(&self, email: &str) -> Result<(), WorkflowError> {
        let user = self
            .users
            .find_by_email(&normalize_email(email))?
            .ok_or_else(|| WorkflowError::not_found("User", "email", email.trim()))?;

        if user.email_verified {
            return Err(WorkflowError::AlreadyVerified);
        }

        self.issue_for(&user).map(|_| ())
    }
}
