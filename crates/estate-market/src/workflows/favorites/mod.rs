//! Per-user bookmarks over approved listings.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{Favorite, FavoriteCheck, FavoriteCount, FavoriteView};
pub use repository::FavoriteRepository;
pub use router::favorite_router;
pub use service::FavoriteService;
