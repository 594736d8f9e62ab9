use super::domain::{EmailVerificationToken, RefreshToken};
use crate::workflows::error::RepositoryError;

pub trait RefreshTokenRepository: Send + Sync {
    fn insert(&self, token: RefreshToken) -> Result<(), RepositoryError>;
    fn find(&self, token: &str) -> Result<Option<RefreshToken>, RepositoryError>;
    fn update(&self, token: &RefreshToken) -> Result<(), RepositoryError>;
}

pub trait VerificationTokenRepository: Send + Sync {
    /// Drops the user's unconsumed tokens and stores the new one in a single step,
    /// leaving at most one live token per user.
    fn replace_for_user(&self, token: EmailVerificationToken) -> Result<(), RepositoryError>;
    fn find(&self, token: &str) -> Result<Option<EmailVerificationToken>, RepositoryError>;
    fn update(&self, token: &EmailVerificationToken) -> Result<(), RepositoryError>;
}
