use std::sync::Arc;
use thiserror::Error;

use crate::workflows::error::WorkflowError;
use crate::workflows::identity::domain::normalize_email;
use crate::workflows::identity::{User, UserRepository};

#[derive(Debug, Error)]
#[error("password hashing failed: {0}")]
pub struct HashError(pub String);

pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, HashError>;
    fn verify(&self, password: &str, stored_hash: &str) -> bool;
}

/// Checks an email/password pair and yields the matching account.
pub trait CredentialVerifier: Send + Sync {
    fn authenticate(&self, email: &str, password: &str) -> Result<User, WorkflowError>;
}

pub struct PasswordCredentialVerifier {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl PasswordCredentialVerifier {
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }
}

impl CredentialVerifier for PasswordCredentialVerifier {
    fn authenticate(&self, email: &str, password: &str) -> Result<User, WorkflowError> {
        let rejected = || WorkflowError::Unauthorized("Invalid email or password".to_string());

        let user = self
            .users
            .find_by_email(&normalize_email(email))?
            .ok_or_else(rejected)?;

        if !self.hasher.verify(password, &user.password_hash) {
            return Err(rejected());
        }
        if !user.enabled {
            return Err(WorkflowError::Unauthorized("Account is disabled".to_string()));
        }

        Ok(user)
    }
}
