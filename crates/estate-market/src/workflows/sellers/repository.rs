use super::domain::{Seller, SellerId, SellerStatus};
use crate::workflows::error::RepositoryError;
use crate::workflows::identity::{RoleName, UserId};

/// Seller profiles; at most one per user.
pub trait SellerRepository: Send + Sync {
    /// `Conflict` when the user already owns a profile.
    fn insert(&self, seller: Seller) -> Result<Seller, RepositoryError>;
    fn update(&self, seller: &Seller) -> Result<(), RepositoryError>;
    /// Stores the reviewed profile and grants `role` to its owner in one step.
    /// Nothing changes when either the profile or the owner is missing.
    fn approve(&self, seller: &Seller, role: RoleName) -> Result<(), RepositoryError>;
    fn fetch(&self, id: SellerId) -> Result<Option<Seller>, RepositoryError>;
    fn find_by_user(&self, user_id: UserId) -> Result<Option<Seller>, RepositoryError>;
    /// Oldest application first.
    fn by_status(&self, status: SellerStatus) -> Result<Vec<Seller>, RepositoryError>;
}
