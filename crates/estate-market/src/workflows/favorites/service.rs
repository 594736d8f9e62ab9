use std::cmp::Reverse;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use super::domain::{Favorite, FavoriteCheck, FavoriteCount, FavoriteView};
use super::repository::FavoriteRepository;
use crate::workflows::clock::Clock;
use crate::workflows::error::{RepositoryError, WorkflowError};
use crate::workflows::estates::{EstateId, EstateService, EstateStatus};
use crate::workflows::identity::Principal;
use crate::workflows::pagination::{Page, PageRequest};

pub struct FavoriteService {
    favorites: Arc<dyn FavoriteRepository>,
    estates: Arc<EstateService>,
    clock: Arc<dyn Clock>,
}

impl FavoriteService {
    pub fn new(
        favorites: Arc<dyn FavoriteRepository>,
        estates: Arc<EstateService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            favorites,
            estates,
            clock,
        }
    }

    pub fn add(&self, principal: &Principal, estate_id: EstateId) -> Result<FavoriteView, WorkflowError> {
        let estate = self.estates.load(estate_id)?;
        if estate.status != EstateStatus::Approved {
            return Err(WorkflowError::BadRequest(
                "Only approved estates can be added to favorites".to_string(),
            ));
        }

        let favorite = Favorite {
            id: 0,
            user_id: principal.user_id,
            estate_id,
            created_at: self.clock.now(),
        };
        let favorite = self.favorites.insert(favorite).map_err(|err| match err {
            RepositoryError::Conflict(_) => {
                WorkflowError::Duplicate("Estate is already in favorites".to_string())
            }
            other => other.into(),
        })?;

        info!(user_id = %principal.user_id, %estate_id, "favorite added");
        Ok(FavoriteView {
            id: favorite.id,
            estate: self.estates.view(&estate)?,
            created_at: favorite.created_at,
        })
    }

    pub fn remove(&self, principal: &Principal, estate_id: EstateId) -> Result<(), WorkflowError> {
        self.estates.load(estate_id)?;
        let favorite = self
            .favorites
            .find(principal.user_id, estate_id)?
            .ok_or_else(|| WorkflowError::NotFound("Favorite not found".to_string()))?;

        self.favorites.delete(favorite.id)?;
        info!(user_id = %principal.user_id, %estate_id, "favorite removed");
        Ok(())
    }

    /// Most recently added first.
    pub fn list(
        &self,
        principal: &Principal,
        page: PageRequest,
    ) -> Result<Page<FavoriteView>, WorkflowError> {
        page.validate()?;
        let mut favorites = self.favorites.by_user(principal.user_id)?;
        favorites.sort_by_key(|favorite| (Reverse(favorite.created_at), Reverse(favorite.id)));

        page.slice(favorites).try_map(|favorite| {
            let estate = self.estates.load(favorite.estate_id)?;
            Ok(FavoriteView {
                id: favorite.id,
                estate: self.estates.view(&estate)?,
                created_at: favorite.created_at,
            })
        })
    }

    pub fn is_favorite(
        &self,
        principal: &Principal,
        estate_id: EstateId,
    ) -> Result<FavoriteCheck, WorkflowError> {
        let is_favorite = self.favorites.find(principal.user_id, estate_id)?.is_some();
        Ok(FavoriteCheck {
            estate_id,
            is_favorite,
        })
    }

    pub fn count(&self, principal: &Principal) -> Result<FavoriteCount, WorkflowError> {
        Ok(FavoriteCount {
            count: self.favorites.count_by_user(principal.user_id)?,
        })
    }
}
