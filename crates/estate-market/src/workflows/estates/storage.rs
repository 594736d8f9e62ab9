use chrono::Duration;
use mime::Mime;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::workflows::error::WorkflowError;
use crate::workflows::identity::{Principal, RoleName};
use crate::workflows::validation::{invalid, not_blank};

pub const ESTATE_IMAGE_FOLDER: &str = "estates";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("object storage unavailable: {0}")]
    Transient(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignedUpload {
    pub key: String,
    pub upload_url: String,
    pub file_url: String,
}

pub trait ObjectStorage: Send + Sync {
    fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        ttl: Duration,
    ) -> Result<PresignedUpload, StorageError>;

    fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Maps a public object URL back to its key, if it lives in this store.
    fn key_for_url(&self, url: &str) -> Option<String>;
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PresignRequest {
    #[validate(custom(function = "not_blank"))]
    pub file_name: String,
    #[validate(custom(function = "image_media_type"))]
    pub content_type: String,
    #[serde(default = "default_count")]
    #[validate(range(min = 1, max = 20, message = "count must be between 1 and 20"))]
    pub count: usize,
}

fn default_count() -> usize {
    1
}

fn image_media_type(content_type: &str) -> Result<(), ValidationError> {
    match content_type.trim().parse::<Mime>() {
        Ok(mime) if mime.type_() == mime::IMAGE => Ok(()),
        _ => Err(invalid(
            "image_media_type",
            "contentType must be an image/* media type",
        )),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUrlView {
    pub upload_url: String,
    pub file_url: String,
    pub file_name: String,
}

/// File extension for an uploaded image, derived from its declared media type.
pub fn extension_for(content_type: &str) -> &'static str {
    let Ok(mime) = content_type.trim().parse::<Mime>() else {
        return ".jpg";
    };
    match mime.subtype().as_str() {
        "png" => ".png",
        "gif" => ".gif",
        "webp" => ".webp",
        _ => ".jpg",
    }
}

/// Hands out upload slots and cleans up listing images.
pub struct ImageService {
    storage: Arc<dyn ObjectStorage>,
    upload_ttl: Duration,
}

impl ImageService {
    pub fn new(storage: Arc<dyn ObjectStorage>, upload_ttl: Duration) -> Self {
        Self {
            storage,
            upload_ttl,
        }
    }

    pub fn presigned_urls(
        &self,
        principal: &Principal,
        request: PresignRequest,
    ) -> Result<Vec<PresignedUrlView>, WorkflowError> {
        if !(principal.has_role(RoleName::Seller) || principal.is_admin()) {
            return Err(WorkflowError::forbidden("Only sellers can upload listing images"));
        }
        request.validate()?;

        let extension = extension_for(&request.content_type);
        let mut views = Vec::with_capacity(request.count);
        for _ in 0..request.count {
            let key = format!("{ESTATE_IMAGE_FOLDER}/{}{extension}", Uuid::new_v4());
            let upload = self
                .storage
                .presign_upload(&key, request.content_type.trim(), self.upload_ttl)?;
            views.push(PresignedUrlView {
                upload_url: upload.upload_url,
                file_url: upload.file_url,
                file_name: upload.key,
            });
        }

        info!(
            user_id = %principal.user_id,
            count = views.len(),
            original_name = %request.file_name,
            "issued presigned uploads"
        );
        Ok(views)
    }

    /// Best-effort removal; returns how many objects were deleted.
    pub fn delete_images(&self, urls: &[String]) -> usize {
        let mut deleted = 0;
        for url in urls {
            let Some(key) = self.storage.key_for_url(url) else {
                warn!(%url, "image url does not belong to the bucket, skipping");
                continue;
            };
            match self.storage.delete(&key) {
                Ok(()) => deleted += 1,
                Err(err) => error!(%key, error = %err, "failed to delete image"),
            }
        }
        deleted
    }
}
