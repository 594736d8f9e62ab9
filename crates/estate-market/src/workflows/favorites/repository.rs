use super::domain::Favorite;
use crate::workflows::error::RepositoryError;
use crate::workflows::estates::EstateId;
use crate::workflows::identity::UserId;

pub trait FavoriteRepository: Send + Sync {
    /// `Conflict` when the pair is already stored.
    fn insert(&self, favorite: Favorite) -> Result<Favorite, RepositoryError>;
    fn find(&self, user_id: UserId, estate_id: EstateId) -> Result<Option<Favorite>, RepositoryError>;
    fn delete(&self, id: i64) -> Result<(), RepositoryError>;
    fn by_user(&self, user_id: UserId) -> Result<Vec<Favorite>, RepositoryError>;
    fn count_by_user(&self, user_id: UserId) -> Result<usize, RepositoryError>;
}
