//! Scoped operations with a deadline.

use std::future::Future;
use std::time::Duration;

use super::error::MediaError;
use super::stage::UploadStage;

/// Runs `operation` until it completes or `limit` elapses.
///
/// On expiry the in-flight future is dropped, which cancels its request and
/// releases the timer; nothing outlives the call on any exit path.
pub async fn with_deadline<F, T>(
    stage: UploadStage,
    limit: Duration,
    operation: F,
) -> Result<T, MediaError>
where
    F: Future<Output = Result<T, MediaError>>,
{
    tokio::time::timeout(limit, operation)
        .await
        .unwrap_or_else(|_| {
            Err(MediaError::Timeout {
                stage,
                after: limit,
            })
        })
}
