//! Session access: a non-expired bearer credential, refreshed when stale.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::MediaError;

/// A signed-in session as handed out by the auth provider.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token presented to the broker.
    pub access_token: String,
    /// Token exchanged for a new session.
    pub refresh_token: String,
    /// Expiry of `access_token`, in epoch seconds.
    pub expires_at: i64,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"[hidden]")
            .field("refresh_token", &"[hidden]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Bearer credential valid for one pipeline operation.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    /// The bearer token.
    pub access_token: String,
    /// When the token expires.
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"[hidden]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl From<Session> for Credential {
    fn from(session: Session) -> Self {
        Self {
            access_token: session.access_token,
            expires_at: DateTime::from_timestamp(session.expires_at, 0)
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
        }
    }
}

/// Source of sessions, implemented by the auth client.
///
/// Refreshing rotates the provider's stored session; callers never hold on to
/// a session beyond the operation that obtained it.
pub trait SessionProvider: Send + Sync {
    /// Currently stored session, if signed in.
    fn get_session(&self) -> impl Future<Output = Result<Option<Session>, MediaError>> + Send;

    /// Exchange the stored refresh token for a new session.
    fn refresh_session(&self) -> impl Future<Output = Result<Option<Session>, MediaError>> + Send;
}

/// Hands out credentials from a [`SessionProvider`], refreshing stale ones.
pub struct SessionAccessor<P> {
    provider: Arc<P>,
    buffer: Duration,
}

impl<P> Clone for SessionAccessor<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            buffer: self.buffer,
        }
    }
}

impl<P: SessionProvider> SessionAccessor<P> {
    /// Default margin before expiry at which a session counts as stale.
    pub const DEFAULT_BUFFER: Duration = Duration::from_secs(60);

    /// Create an accessor with the default 60 second buffer.
    #[must_use]
    pub fn new(provider: Arc<P>) -> Self {
        Self {
            provider,
            buffer: Self::DEFAULT_BUFFER,
        }
    }

    /// Set the staleness buffer.
    #[must_use]
    pub fn with_buffer(mut self, buffer: Duration) -> Self {
        self.buffer = buffer;
        self
    }

    /// A credential that will not expire within the buffer, or `None` when
    /// the user is not signed in or the refresh failed.
    pub async fn valid_credential(&self) -> Option<Credential> {
        let session = match self.provider.get_session().await {
            Ok(Some(session)) => session,
            Ok(None) => {
                debug!("No stored session");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read stored session");
                return None;
            }
        };

        if is_stale(session.expires_at, self.buffer, Utc::now().timestamp()) {
            debug!(expires_at = session.expires_at, "Session stale, refreshing");
            return self.refreshed_credential().await;
        }

        Some(session.into())
    }

    /// Force a refresh and return the rotated credential, or `None` when the
    /// refresh failed.
    pub async fn refreshed_credential(&self) -> Option<Credential> {
        match self.provider.refresh_session().await {
            Ok(Some(session)) => Some(session.into()),
            Ok(None) => {
                warn!("Session refresh returned no session");
                None
            }
            Err(e) => {
                warn!(error = %e, "Session refresh failed");
                None
            }
        }
    }
}

/// Whether `expires_at - buffer` already lies before `now` (epoch seconds).
fn is_stale(expires_at: i64, buffer: Duration, now: i64) -> bool {
    let buffer = i64::try_from(buffer.as_secs()).unwrap_or(i64::MAX);
    expires_at.saturating_sub(buffer) < now
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::test_support::FakeSessions;

    fn session(token: &str, expires_in: i64) -> Session {
        Session {
            access_token: token.to_string(),
            refresh_token: format!("refresh-{token}"),
            expires_at: Utc::now().timestamp() + expires_in,
        }
    }

    #[test]
    fn test_is_stale_boundaries() {
        let buffer = Duration::from_secs(60);
        assert!(!is_stale(1_000 + 61, buffer, 1_000));
        assert!(!is_stale(1_000 + 60, buffer, 1_000));
        assert!(is_stale(1_000 + 59, buffer, 1_000));
        assert!(is_stale(0, buffer, 1_000));
    }

    #[tokio::test]
    async fn test_fresh_session_returned_without_refresh() {
        let sessions = Arc::new(FakeSessions::signed_in(session("t1", 3_600)));
        let accessor = SessionAccessor::new(Arc::clone(&sessions));

        let credential = accessor.valid_credential().await.expect("credential");
        assert_eq!(credential.access_token, "t1");
        assert_eq!(sessions.refresh_calls(), 0);
    }

    #[tokio::test]
    async fn test_stale_session_is_refreshed() {
        let sessions = Arc::new(
            FakeSessions::signed_in(session("old", 30)).refreshing_to(session("new", 3_600)),
        );
        let accessor = SessionAccessor::new(Arc::clone(&sessions));

        let credential = accessor.valid_credential().await.expect("credential");
        assert_eq!(credential.access_token, "new");
        assert_eq!(sessions.refresh_calls(), 1);
    }

    #[tokio::test]
    async fn test_custom_buffer_changes_staleness() {
        let sessions = Arc::new(
            FakeSessions::signed_in(session("t1", 30)).refreshing_to(session("t2", 3_600)),
        );
        let accessor =
            SessionAccessor::new(Arc::clone(&sessions)).with_buffer(Duration::from_secs(5));

        let credential = accessor.valid_credential().await.expect("credential");
        assert_eq!(credential.access_token, "t1");
        assert_eq!(sessions.refresh_calls(), 0);
    }

    #[tokio::test]
    async fn test_stale_session_with_failed_refresh_yields_none() {
        let sessions = Arc::new(FakeSessions::signed_in(session("old", -10)));
        let accessor = SessionAccessor::new(Arc::clone(&sessions));

        assert!(accessor.valid_credential().await.is_none());
        assert_eq!(sessions.refresh_calls(), 1);
    }

    #[tokio::test]
    async fn test_signed_out_yields_none() {
        let sessions = Arc::new(FakeSessions::signed_out());
        let accessor = SessionAccessor::new(Arc::clone(&sessions));

        assert!(accessor.valid_credential().await.is_none());
        assert_eq!(sessions.refresh_calls(), 0);
    }

    #[test]
    fn test_credential_from_session() {
        let credential = Credential::from(Session {
            access_token: "abc".to_string(),
            refresh_token: "r".to_string(),
            expires_at: 1_700_000_000,
        });
        assert_eq!(credential.access_token, "abc");
        assert_eq!(credential.expires_at.timestamp(), 1_700_000_000);
        assert!(!format!("{credential:?}").contains("abc"));
    }
}
