use chrono::Duration;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use crate::config::StorageConfig;
use crate::workflows::estates::{ObjectStorage, PresignedUpload, StorageError};

#[derive(Default)]
struct Objects {
    stored: BTreeSet<String>,
    deleted: Vec<String>,
    failing: BTreeSet<String>,
}

/// Bucket stand-in producing S3-shaped URLs.
///
/// Presigning a key registers the object as uploaded.
#[derive(Clone)]
pub struct InMemoryObjectStorage {
    bucket: String,
    region: String,
    objects: Arc<Mutex<Objects>>,
}

impl InMemoryObjectStorage {
    pub fn new(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: region.into(),
            objects: Arc::new(Mutex::new(Objects::default())),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.bucket.clone(), config.region.clone())
    }

    fn base_url(&self) -> String {
        format!("https://{}.s3.{}.amazonaws.com/", self.bucket, self.region)
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}{key}", self.base_url())
    }

    /// Makes every later delete of `key` fail with a transient error.
    pub fn fail_deletes_for(&self, key: &str) {
        if let Ok(mut objects) = self.objects.lock() {
            objects.failing.insert(key.to_string());
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects
            .lock()
            .map(|objects| objects.stored.contains(key))
            .unwrap_or(false)
    }

    pub fn deleted_keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .map(|objects| objects.deleted.clone())
            .unwrap_or_default()
    }
}

impl ObjectStorage for InMemoryObjectStorage {
    fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        ttl: Duration,
    ) -> Result<PresignedUpload, StorageError> {
        let mut objects = self
            .objects
            .lock()
            .map_err(|_| StorageError::Transient("bucket mutex poisoned".to_string()))?;
        objects.stored.insert(key.to_string());

        let file_url = self.public_url(key);
        let upload_url = format!(
            "{file_url}?X-Amz-Expires={}&content-type={}",
            ttl.num_seconds(),
            content_type.replace('/', "%2F")
        );
        Ok(PresignedUpload {
            key: key.to_string(),
            upload_url,
            file_url,
        })
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        let mut objects = self
            .objects
            .lock()
            .map_err(|_| StorageError::Transient("bucket mutex poisoned".to_string()))?;
        if objects.failing.contains(key) {
            return Err(StorageError::Transient(format!("delete of {key} timed out")));
        }
        if !objects.stored.remove(key) {
            return Err(StorageError::NotFound(key.to_string()));
        }
        objects.deleted.push(key.to_string());
        Ok(())
    }

    fn key_for_url(&self, url: &str) -> Option<String> {
        url.strip_prefix(&self.base_url())
            .filter(|key| !key.is_empty())
            .map(str::to_string)
    }
}
