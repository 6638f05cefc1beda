//! Upload orchestrator: key → upload target → transfer → result.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::broker::{BrokerEndpoint, UploadBroker, UploadTargetRequest};
use super::bucket::Bucket;
use super::error::MediaError;
use super::file::MediaFile;
use super::key::derive_key;
use super::session::{SessionAccessor, SessionProvider};
use super::stage::UploadStage;
use super::transfer::{ObjectTransfer, ObjectTransport};

/// Deadlines for the two network steps of an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadTimeouts {
    /// Deadline for obtaining the upload target.
    pub target: Duration,
    /// Deadline for transferring the bytes.
    pub transfer: Duration,
}

impl UploadTimeouts {
    /// Default target deadline: 45 seconds.
    pub const DEFAULT_TARGET: Duration = Duration::from_secs(45);
    /// Default transfer deadline: 180 seconds.
    pub const DEFAULT_TRANSFER: Duration = Duration::from_secs(180);
}

impl Default for UploadTimeouts {
    fn default() -> Self {
        Self {
            target: Self::DEFAULT_TARGET,
            transfer: Self::DEFAULT_TRANSFER,
        }
    }
}

/// A stored object: where to read it and the key it lives under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    /// Public read URL.
    pub url: String,
    /// Object key, needed to delete it later.
    pub key: String,
}

/// Runs uploads end to end, one file at a time.
pub struct MediaUploader<E, T, P> {
    broker: UploadBroker<E, P>,
    transfer: ObjectTransfer<T>,
    timeouts: UploadTimeouts,
}

impl<E, T, P> MediaUploader<E, T, P>
where
    E: BrokerEndpoint,
    T: ObjectTransport,
    P: SessionProvider,
{
    /// Create an uploader with the default deadlines.
    #[must_use]
    pub fn new(endpoint: Arc<E>, transport: Arc<T>, sessions: SessionAccessor<P>) -> Self {
        Self {
            broker: UploadBroker::new(endpoint, sessions),
            transfer: ObjectTransfer::new(transport),
            timeouts: UploadTimeouts::default(),
        }
    }

    /// Override the deadlines.
    #[must_use]
    pub fn with_timeouts(mut self, timeouts: UploadTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Deadlines in use.
    #[must_use]
    pub fn timeouts(&self) -> UploadTimeouts {
        self.timeouts
    }

    /// Upload `file` into `bucket`.
    ///
    /// The key is `custom_path` when given, else a fresh
    /// `{bucket}/{millis}-{token}.{ext}`. `token` skips the session lookup.
    /// Failures propagate unchanged; a write URL obtained before a failed
    /// transfer is abandoned.
    ///
    /// # Errors
    ///
    /// Any `MediaError` from the broker or the transfer.
    pub async fn upload(
        &self,
        file: &MediaFile,
        bucket: Bucket,
        custom_path: Option<&str>,
        token: Option<&str>,
    ) -> Result<UploadResult, MediaError> {
        let key = derive_key(bucket, &file.name, custom_path);
        debug!(key = %key, stage = %UploadStage::Idle, "Upload started");

        match self.run(file, key.clone(), token).await {
            Ok(result) => {
                info!(
                    key = %result.key,
                    size = file.size(),
                    stage = %UploadStage::Done,
                    "Media uploaded"
                );
                Ok(result)
            }
            Err(e) => {
                warn!(
                    key = %key,
                    error = %e,
                    stage = %UploadStage::Failed,
                    "Media upload failed"
                );
                Err(e)
            }
        }
    }

    /// Upload several files into `bucket`, strictly in order.
    ///
    /// Stops at the first failure; files already stored stay stored.
    ///
    /// # Errors
    ///
    /// The first `MediaError` encountered.
    pub async fn upload_all(
        &self,
        files: &[MediaFile],
        bucket: Bucket,
        token: Option<&str>,
    ) -> Result<Vec<UploadResult>, MediaError> {
        let mut results = Vec::with_capacity(files.len());
        for file in files {
            results.push(self.upload(file, bucket, None, token).await?);
        }
        Ok(results)
    }

    async fn run(
        &self,
        file: &MediaFile,
        key: String,
        token: Option<&str>,
    ) -> Result<UploadResult, MediaError> {
        let request = UploadTargetRequest {
            key,
            content_type: file.content_type.clone(),
            file_size: file.size(),
        };

        let target = self
            .broker
            .request_upload_target(&request, token, self.timeouts.target)
            .await?;

        debug!(
            key = %request.key,
            stage = %UploadStage::Transferring,
            "Upload target obtained"
        );
        self.transfer
            .transfer_object(file, &target.upload_url, self.timeouts.transfer)
            .await?;

        Ok(UploadResult {
            url: target.public_url,
            key: request.key,
        })
    }
}
