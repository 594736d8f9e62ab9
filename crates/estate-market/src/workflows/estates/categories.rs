use std::sync::Arc;
use tracing::info;
use validator::Validate;

use super::domain::{Category, CategoryId, CategoryRequest};
use super::repository::CategoryRepository;
use crate::workflows::clock::Clock;
use crate::workflows::error::{RepositoryError, WorkflowError};
use crate::workflows::identity::{Principal, RoleName};

pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
    clock: Arc<dyn Clock>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { categories, clock }
    }

    pub fn create(
        &self,
        principal: &Principal,
        request: CategoryRequest,
    ) -> Result<Category, WorkflowError> {
        principal.require_role(RoleName::Admin)?;
        request.validate()?;

        let name = request.name.trim().to_string();
        let category = Category {
            id: CategoryId(0),
            name: name.clone(),
            description: request.description,
            created_at: self.clock.now(),
        };
        let category = self.categories.insert(category).map_err(|err| match err {
            RepositoryError::Conflict(_) => {
                WorkflowError::Duplicate(format!("Category already exists: {name}"))
            }
            other => other.into(),
        })?;

        info!(category_id = %category.id, name = %category.name, "category created");
        Ok(category)
    }

    /// All categories by name.
    pub fn list(&self) -> Result<Vec<Category>, WorkflowError> {
        let mut categories = self.categories.list()?;
        categories.sort_by_key(|category| category.name.to_lowercase());
        Ok(categories)
    }
}
