//! Deletion collaborator: remove a stored object by key.

use std::future::Future;
use std::sync::Arc;

use tracing::info;

use super::error::MediaError;
use super::session::{SessionAccessor, SessionProvider};

/// Network seam for the delete endpoint (`POST {base}/delete-from-r2`).
pub trait DeleteEndpoint: Send + Sync {
    /// Ask the service to delete `key`, authenticated with `token`.
    fn delete_object(
        &self,
        key: &str,
        token: &str,
    ) -> impl Future<Output = Result<(), MediaError>> + Send;
}

/// Deletes objects with the current session's credential.
///
/// One call per key: no deadline, no retry, no local bookkeeping.
pub struct MediaDeleter<D, P> {
    endpoint: Arc<D>,
    sessions: SessionAccessor<P>,
}

impl<D: DeleteEndpoint, P: SessionProvider> MediaDeleter<D, P> {
    /// Create a deleter over `endpoint`.
    #[must_use]
    pub fn new(endpoint: Arc<D>, sessions: SessionAccessor<P>) -> Self {
        Self { endpoint, sessions }
    }

    /// Delete the object stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Unauthenticated` without a credential; otherwise
    /// the endpoint's error, unchanged.
    pub async fn delete_object(&self, key: &str) -> Result<(), MediaError> {
        let credential = self
            .sessions
            .valid_credential()
            .await
            .ok_or(MediaError::Unauthenticated)?;

        self.endpoint
            .delete_object(key, &credential.access_token)
            .await?;

        info!(key = %key, "Media object deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::test_support::{FakeDeleteEndpoint, FakeSessions, session};

    #[tokio::test]
    async fn test_delete_uses_session_token() {
        let endpoint = Arc::new(FakeDeleteEndpoint::accepting());
        let sessions = Arc::new(FakeSessions::signed_in(session("t1", 3_600)));
        let deleter = MediaDeleter::new(Arc::clone(&endpoint), SessionAccessor::new(sessions));

        deleter.delete_object("posts/a.jpg").await.unwrap();

        assert_eq!(
            endpoint.calls(),
            vec![("posts/a.jpg".to_string(), "t1".to_string())]
        );
    }

    #[tokio::test]
    async fn test_delete_signed_out_is_unauthenticated() {
        let endpoint = Arc::new(FakeDeleteEndpoint::accepting());
        let sessions = Arc::new(FakeSessions::signed_out());
        let deleter = MediaDeleter::new(Arc::clone(&endpoint), SessionAccessor::new(sessions));

        let err = deleter.delete_object("posts/a.jpg").await.unwrap_err();

        assert!(err.is_unauthenticated());
        assert!(endpoint.calls().is_empty());
    }

    #[tokio::test]
    async fn test_delete_error_propagates_unchanged() {
        let endpoint = Arc::new(FakeDeleteEndpoint::rejecting(404, "Object not found"));
        let sessions = Arc::new(FakeSessions::signed_in(session("t1", 3_600)));
        let deleter = MediaDeleter::new(Arc::clone(&endpoint), SessionAccessor::new(sessions));

        let err = deleter.delete_object("posts/a.jpg").await.unwrap_err();

        assert!(matches!(
            err,
            MediaError::Delete { status: 404, ref message } if message == "Object not found"
        ));
        assert_eq!(endpoint.calls().len(), 1);
    }
}
