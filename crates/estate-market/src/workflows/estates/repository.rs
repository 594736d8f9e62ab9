use super::domain::{Category, CategoryId, Estate, EstateId};
use super::search::EstateFilter;
use crate::workflows::error::RepositoryError;

pub trait EstateRepository: Send + Sync {
    fn insert(&self, estate: Estate) -> Result<Estate, RepositoryError>;
    fn update(&self, estate: &Estate) -> Result<(), RepositoryError>;
    fn fetch(&self, id: EstateId) -> Result<Option<Estate>, RepositoryError>;
    /// Removes the listing and every record it owns (appointments, favorites).
    fn delete(&self, id: EstateId) -> Result<(), RepositoryError>;
    /// Unordered matches; callers sort and page.
    fn search(&self, filter: &EstateFilter) -> Result<Vec<Estate>, RepositoryError>;
}

/// Category names are unique, compared case-insensitively.
pub trait CategoryRepository: Send + Sync {
    fn insert(&self, category: Category) -> Result<Category, RepositoryError>;
    fn fetch(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError>;
    fn list(&self) -> Result<Vec<Category>, RepositoryError>;
}
