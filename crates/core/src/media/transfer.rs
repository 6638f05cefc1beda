//! Object transfer: PUT the bytes to a presigned write URL.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::debug;

use super::deadline::with_deadline;
use super::error::MediaError;
use super::file::MediaFile;
use super::stage::UploadStage;

/// Network seam for the object store's write endpoint.
pub trait ObjectTransport: Send + Sync {
    /// PUT `body` to `url` with `content_type` and return the HTTP status.
    fn put_object(
        &self,
        url: &str,
        content_type: &str,
        body: Bytes,
    ) -> impl Future<Output = Result<u16, MediaError>> + Send;
}

/// Sends a file to its write URL under a deadline. Never retries.
pub struct ObjectTransfer<T> {
    transport: Arc<T>,
}

impl<T> Clone for ObjectTransfer<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: ObjectTransport> ObjectTransfer<T> {
    /// Default deadline for one transfer.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

    /// Create a transfer over `transport`.
    #[must_use]
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    /// PUT `file` to `write_url`, bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Transfer` carrying the status for non-2xx
    /// responses and `MediaError::Timeout` when the deadline elapses.
    pub async fn transfer_object(
        &self,
        file: &MediaFile,
        write_url: &str,
        timeout: Duration,
    ) -> Result<(), MediaError> {
        debug!(size = file.size(), content_type = %file.content_type, "Transferring object");

        let status = with_deadline(
            UploadStage::Transferring,
            timeout,
            self.transport
                .put_object(write_url, &file.content_type, file.bytes.clone()),
        )
        .await?;

        if (200..300).contains(&status) {
            Ok(())
        } else {
            Err(MediaError::Transfer { status })
        }
    }
}
