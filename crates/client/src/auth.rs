//! Session store backed by the auth provider's refresh-token grant.

use chrono::Utc;
use funprofile_core::media::{MediaError, Session, SessionProvider, server_message};
use funprofile_shared::ClientConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::http::{build_client, error_message, join, transport_error};

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Token endpoint response. `expires_at` wins over `expires_in` when present.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: Option<i64>,
    expires_at: Option<i64>,
}

impl TokenResponse {
    fn into_session(self, now: i64) -> Session {
        let expires_at = self
            .expires_at
            .unwrap_or_else(|| now + self.expires_in.unwrap_or(0));
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
        }
    }
}

/// Holds the signed-in user's session and rotates it on demand.
pub struct AuthClient {
    http: Client,
    auth_url: String,
    anon_key: String,
    session: RwLock<Option<Session>>,
}

impl std::fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthClient")
            .field("auth_url", &self.auth_url)
            .field("anon_key", &"[hidden]")
            .finish_non_exhaustive()
    }
}

impl AuthClient {
    /// Create a signed-out client for the provider at `auth_url`.
    #[must_use]
    pub fn new(http: Client, auth_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            http,
            auth_url: auth_url.into(),
            anon_key: anon_key.into(),
            session: RwLock::new(None),
        }
    }

    /// Create a signed-out client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Transport` if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, MediaError> {
        Ok(Self::new(build_client()?, &config.auth_url, &config.anon_key))
    }

    /// Store a session obtained at sign-in.
    pub async fn set_session(&self, session: Session) {
        *self.session.write().await = Some(session);
    }

    /// Forget the stored session.
    pub async fn sign_out(&self) {
        *self.session.write().await = None;
    }

    async fn stored_refresh_token(&self) -> Option<String> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.refresh_token.clone())
    }

    /// Replace the stored session only while it still holds `refresh_token`.
    ///
    /// A sign-in or sibling refresh that landed in the meantime wins.
    async fn replace_if_current(&self, refresh_token: &str, next: Option<Session>) -> bool {
        let mut stored = self.session.write().await;
        let current = stored
            .as_ref()
            .is_some_and(|s| s.refresh_token == refresh_token);
        if current {
            *stored = next;
        }
        current
    }
}

impl SessionProvider for AuthClient {
    async fn get_session(&self) -> Result<Option<Session>, MediaError> {
        Ok(self.session.read().await.clone())
    }

    async fn refresh_session(&self) -> Result<Option<Session>, MediaError> {
        let Some(refresh_token) = self.stored_refresh_token().await else {
            debug!("No session to refresh");
            return Ok(None);
        };

        let response = self
            .http
            .post(join(&self.auth_url, "token"))
            .query(&[("grant_type", "refresh_token")])
            .header("apikey", &self.anon_key)
            .json(&RefreshRequest {
                refresh_token: &refresh_token,
            })
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let message = server_message(status.as_u16(), error_message(response).await);
            warn!(status = status.as_u16(), error = %message, "Session refresh rejected");
            if status.is_client_error() && self.replace_if_current(&refresh_token, None).await {
                debug!("Signed out after rejected refresh token");
            }
            return Err(MediaError::session(message));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| MediaError::session(format!("malformed token response: {e}")))?;

        let session = body.into_session(Utc::now().timestamp());
        debug!(expires_at = session.expires_at, "Session refreshed");
        if !self
            .replace_if_current(&refresh_token, Some(session.clone()))
            .await
        {
            debug!("Session changed during refresh, keeping the newer one");
        }
        Ok(Some(session))
    }
}
