use super::domain::{User, UserId};
use crate::workflows::error::RepositoryError;

/// Account storage. Email addresses are unique (normalized form).
pub trait UserRepository: Send + Sync {
    /// Numbers and stores a new account; `Conflict` when the email is taken.
    fn insert(&self, user: User) -> Result<User, RepositoryError>;
    fn update(&self, user: &User) -> Result<(), RepositoryError>;
    fn fetch(&self, id: UserId) -> Result<Option<User>, RepositoryError>;
    fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
    /// Removes the account together with everything it owns.
    fn delete(&self, id: UserId) -> Result<(), RepositoryError>;
}
