use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::estates::{EstateId, EstateView};
use crate::workflows::identity::UserId;

/// Membership row; unique per (user, estate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Favorite {
    pub id: i64,
    pub user_id: UserId,
    pub estate_id: EstateId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteView {
    pub id: i64,
    pub estate: EstateView,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteCheck {
    pub estate_id: EstateId,
    pub is_favorite: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteCount {
    pub count: usize,
}
