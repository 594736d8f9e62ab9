//! Listings: creation, moderation, sale/rental transitions, search and images.

pub mod categories;
pub mod domain;
pub mod repository;
pub mod router;
pub mod search;
pub mod service;
pub mod storage;

pub use categories::CategoryService;
pub use domain::{
    Category, CategoryId, CategoryRequest, CharacteristicRequest, CreateEstateRequest, Estate,
    EstateCharacteristic, EstateId, EstateStatus, EstateType, EstateView,
};
pub use repository::{CategoryRepository, EstateRepository};
pub use router::estate_router;
pub use search::{EstateFilter, EstateSearchQuery, EstateSort, SortDirection, SortField};
pub use service::EstateService;
pub use storage::{ImageService, ObjectStorage, PresignRequest, PresignedUpload, PresignedUrlView, StorageError};
