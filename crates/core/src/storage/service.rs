//! Storage service implementation using Apache OpenDAL.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use opendal::{Operator, services};
use serde::Serialize;

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;
use crate::media::{Bucket, validate_key};

/// Presigned write URL handed to an uploading client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUpload {
    /// Presigned URL the client PUTs the bytes to.
    pub upload_url: String,
    /// Public URL the object will be readable at.
    pub public_url: String,
    /// HTTP method to use.
    pub method: String,
    /// Required headers for the request.
    pub headers: HashMap<String, String>,
    /// When the URL expires.
    pub expires_at: DateTime<Utc>,
}

/// Object store operations the broker service needs.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Validates an upload and presigns a write URL for `key`.
    async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        file_size: u64,
    ) -> Result<PresignedUpload, StorageError>;

    /// Removes the object stored under `key`.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Storage service for user media.
pub struct StorageService {
    operator: Operator,
    config: StorageConfig,
}

impl std::fmt::Debug for StorageService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageService")
            .field("provider", &self.config.provider.name())
            .field("public_base_url", &self.config.public_base_url)
            .finish_non_exhaustive()
    }
}

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        let operator = match provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
        };

        Ok(operator)
    }

    /// Validate upload request against config constraints.
    ///
    /// # Errors
    ///
    /// Returns an error if file size or MIME type is invalid.
    pub fn validate_upload(&self, content_type: &str, size: u64) -> Result<(), StorageError> {
        if size > self.config.max_file_size {
            return Err(StorageError::file_too_large(
                size,
                self.config.max_file_size,
            ));
        }

        if !self.config.is_mime_type_allowed(content_type) {
            return Err(StorageError::invalid_mime_type(content_type));
        }

        Ok(())
    }

    /// Checks that `key` is a well-formed object key and returns its bucket.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidKey` for unknown buckets, traversal
    /// segments, or empty segments.
    pub fn validate_key(key: &str) -> Result<Bucket, StorageError> {
        validate_key(key).map_err(StorageError::from)
    }

    /// Public URL an object under `key` is served from.
    #[must_use]
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.config.public_base_url)
    }

    /// Generate presigned URL for upload.
    ///
    /// # Errors
    ///
    /// Returns an error if the key or upload is invalid, or if presigning is
    /// not supported or fails.
    pub async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        file_size: u64,
    ) -> Result<PresignedUpload, StorageError> {
        Self::validate_key(key)?;
        self.validate_upload(content_type, file_size)?;

        let ttl = Duration::from_secs(self.config.presign_upload_ttl_secs);

        let presigned = self
            .operator
            .presign_write(key, ttl)
            .await
            .map_err(StorageError::from)?;

        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), content_type.to_string());

        Ok(PresignedUpload {
            upload_url: presigned.uri().to_string(),
            public_url: self.public_url(key),
            method: presigned.method().to_string(),
            headers,
            expires_at: Utc::now()
                + chrono::Duration::seconds(
                    i64::try_from(self.config.presign_upload_ttl_secs).unwrap_or(i64::MAX),
                ),
        })
    }

    /// Delete an object from storage. Deleting a missing object succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or deletion fails.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        Self::validate_key(key)?;
        self.operator.delete(key).await.map_err(StorageError::from)
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }

    /// Get the physical bucket name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        self.config.provider.bucket()
    }
}

#[async_trait]
impl MediaStore for StorageService {
    async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        file_size: u64,
    ) -> Result<PresignedUpload, StorageError> {
        StorageService::presign_upload(self, key, content_type, file_size).await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        StorageService::delete(self, key).await
    }
}
