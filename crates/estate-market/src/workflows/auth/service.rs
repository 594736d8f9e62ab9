use chrono::Duration;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::credentials::{CredentialVerifier, PasswordHasher};
use super::domain::{
    AuthResponse, LoginRequest, RefreshToken, RegisterRequest, RegistrationResponse,
};
use super::repository::RefreshTokenRepository;
use super::tokens::TokenIssuer;
use super::verification::EmailVerificationService;
use crate::workflows::clock::Clock;
use crate::workflows::error::{RepositoryError, WorkflowError};
use crate::workflows::identity::domain::normalize_email;
use crate::workflows::identity::{Principal, User, UserRepository, UserView};

const DEFAULT_REFRESH_TTL_DAYS: i64 = 7;

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    refresh_tokens: Arc<dyn RefreshTokenRepository>,
    credentials: Arc<dyn CredentialVerifier>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenIssuer>,
    verification: Arc<EmailVerificationService>,
    clock: Arc<dyn Clock>,
    refresh_ttl: Duration,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        refresh_tokens: Arc<dyn RefreshTokenRepository>,
        credentials: Arc<dyn CredentialVerifier>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenIssuer>,
        verification: Arc<EmailVerificationService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            refresh_tokens,
            credentials,
            hasher,
            tokens,
            verification,
            clock,
            refresh_ttl: Duration::days(DEFAULT_REFRESH_TTL_DAYS),
        }
    }

    pub fn with_refresh_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_ttl = ttl;
        self
    }

    pub fn verification(&self) -> &EmailVerificationService {
        &self.verification
    }

    /// Creates an unverified account and mails its verification token.
    ///
    /// If the mail cannot be delivered the account is removed again and the
    /// delivery error is returned.
    pub fn register(
        &self,
        mut request: RegisterRequest,
    ) -> Result<RegistrationResponse, WorkflowError> {
        request.email = normalize_email(&request.email);
        request.validate()?;
        let email = request.email.clone();

        if self.users.find_by_email(&email)?.is_some() {
            warn!(%email, "registration rejected: email already registered");
            return Err(duplicate_email(&email));
        }

        let user = User::registered(
            email.clone(),
            self.hasher.hash(&request.password)?,
            request.profile(),
            self.clock.now(),
        );
        let user = self.users.insert(user).map_err(|err| match err {
            RepositoryError::Conflict(_) => duplicate_email(&email),
            other => other.into(),
        })?;

        if let Err(err) = self.verification.issue_for(&user) {
            warn!(user_id = %user.id, error = %err, "rolling back registration");
            self.users.delete(user.id)?;
            return Err(err);
        }

        info!(user_id = %user.id, "user registered");
        Ok(RegistrationResponse {
            message: "Registration successful. Please check your email to verify your account."
                .to_string(),
            user: user.view(),
        })
    }

    pub fn login(&self, request: LoginRequest) -> Result<AuthResponse, WorkflowError> {
        request.validate()?;
        let user = self
            .credentials
            .authenticate(&request.email, &request.password)?;

        if !user.email_verified {
            warn!(user_id = %user.id, "login blocked until email is verified");
            return Err(WorkflowError::EmailNotVerified);
        }

        let now = self.clock.now();
        let refresh = RefreshToken {
            token: Uuid::new_v4().to_string(),
            user_id: user.id,
            expires_at: now + self.refresh_ttl,
            revoked: false,
            created_at: now,
        };
        self.refresh_tokens.insert(refresh.clone())?;

        info!(user_id = %user.id, "user logged in");
        self.session_for(&user, refresh.token)
    }

    /// Issues a new access token; the refresh token itself is reused as is.
    pub fn refresh(&self, token: &str) -> Result<AuthResponse, WorkflowError> {
        let refresh = self
            .refresh_tokens
            .find(token.trim())?
            .ok_or_else(|| WorkflowError::Unauthorized("Refresh token not found".to_string()))?;

        if refresh.revoked {
            return Err(WorkflowError::Unauthorized(
                "Refresh token has been revoked".to_string(),
            ));
        }
        if refresh.is_expired(self.clock.now()) {
            return Err(WorkflowError::Unauthorized(
                "Refresh token has expired".to_string(),
            ));
        }

        let user = self
            .users
            .fetch(refresh.user_id)?
            .filter(|user| user.enabled)
            .ok_or_else(|| WorkflowError::Unauthorized("Account is not active".to_string()))?;

        info!(user_id = %user.id, "access token refreshed");
        self.session_for(&user, refresh.token)
    }

    pub fn logout(&self, token: &str) -> Result<(), WorkflowError> {
        let mut refresh = self
            .refresh_tokens
            .find(token.trim())?
            .ok_or_else(|| WorkflowError::Unauthorized("Refresh token not found".to_string()))?;

        refresh.revoked = true;
        self.refresh_tokens.update(&refresh)?;
        info!(user_id = %refresh.user_id, "refresh token revoked");
        Ok(())
    }

    pub fn me(&self, principal: &Principal) -> Result<UserView, WorkflowError> {
        self.users
            .fetch(principal.user_id)?
            .map(|user| user.view())
            .ok_or_else(|| WorkflowError::not_found("User", "id", principal.user_id))
    }

    pub fn verify_email(&self, token: &str) -> Result<UserView, WorkflowError> {
        self.verification.verify(token)
    }

    pub fn resend_verification(&self, email: &str) -> Result<(), WorkflowError> {
        self.verification.resend(email)
    }

    fn session_for(&self, user: &User, refresh_token: String) -> Result<AuthResponse, WorkflowError> {
        let access = self
            .tokens
            .issue_access_token(&Principal::from_user(user), self.clock.now())?;

        Ok(AuthResponse {
            access_token: access.token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: access.expires_in,
            user: user.view(),
        })
    }
}

fn duplicate_email(email: &str) -> WorkflowError {
    WorkflowError::Duplicate(format!("Email already registered: {email}"))
}
