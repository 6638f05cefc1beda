//! Upload-URL broker: trades a key for a presigned write URL and a public URL.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::deadline::with_deadline;
use super::error::{MediaError, server_message};
use super::session::{SessionAccessor, SessionProvider};
use super::stage::UploadStage;

/// Body sent to the broker endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTargetRequest {
    /// Object key to write.
    pub key: String,
    /// MIME type of the object.
    pub content_type: String,
    /// Size in bytes.
    pub file_size: u64,
}

/// Where to PUT the bytes and where they will be readable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTarget {
    /// Short-lived presigned write URL.
    pub upload_url: String,
    /// Permanent public read URL.
    pub public_url: String,
}

/// Decoded broker response body; every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerBody {
    /// Presigned write URL.
    #[serde(default)]
    pub upload_url: Option<String>,
    /// Public read URL.
    #[serde(default)]
    pub public_url: Option<String>,
    /// Server error message.
    #[serde(default)]
    pub error: Option<String>,
}

/// Raw broker answer: status plus whatever body could be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerReply {
    /// HTTP status code.
    pub status: u16,
    /// Decoded body (empty when the body was not JSON).
    pub body: BrokerBody,
}

impl BrokerReply {
    /// Whether the status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the broker rejected the bearer token.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Interpret the reply as a final answer.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Broker` for non-2xx replies and for 2xx replies
    /// missing either URL.
    pub fn into_target(self) -> Result<UploadTarget, MediaError> {
        if !self.is_success() {
            return Err(MediaError::broker(
                self.status,
                server_message(self.status, self.body.error),
            ));
        }

        let present = |url: Option<String>| url.filter(|u| !u.trim().is_empty());
        match (present(self.body.upload_url), present(self.body.public_url)) {
            (Some(upload_url), Some(public_url)) => Ok(UploadTarget {
                upload_url,
                public_url,
            }),
            _ => Err(MediaError::broker(
                self.status,
                "response missing uploadUrl or publicUrl",
            )),
        }
    }
}

/// Network seam for the broker endpoint (`POST {base}/get-upload-url`).
pub trait BrokerEndpoint: Send + Sync {
    /// Issue one request with the given bearer token.
    ///
    /// Any HTTP status is a successful call; only failures to get a response
    /// at all are errors.
    fn request_upload_url(
        &self,
        request: &UploadTargetRequest,
        token: &str,
    ) -> impl Future<Output = Result<BrokerReply, MediaError>> + Send;
}

/// Requests upload targets, retrying once on an expired credential.
pub struct UploadBroker<E, P> {
    endpoint: Arc<E>,
    sessions: SessionAccessor<P>,
}

impl<E, P> Clone for UploadBroker<E, P> {
    fn clone(&self) -> Self {
        Self {
            endpoint: Arc::clone(&self.endpoint),
            sessions: self.sessions.clone(),
        }
    }
}

impl<E: BrokerEndpoint, P: SessionProvider> UploadBroker<E, P> {
    /// Default deadline per broker request.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a broker over `endpoint`, drawing credentials from `sessions`.
    #[must_use]
    pub fn new(endpoint: Arc<E>, sessions: SessionAccessor<P>) -> Self {
        Self { endpoint, sessions }
    }

    /// Obtain an upload target for `request`.
    ///
    /// Uses `token` when given, else a credential from the session accessor.
    /// Each attempt is bounded by `timeout`. A 401 on the first attempt forces
    /// a refresh and re-issues the same request once with the new token.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated` when no credential is available or the refresh fails
    /// - `Timeout` when an attempt exceeds `timeout`
    /// - `Broker` for any other failure, including a second 401
    pub async fn request_upload_target(
        &self,
        request: &UploadTargetRequest,
        token: Option<&str>,
        timeout: Duration,
    ) -> Result<UploadTarget, MediaError> {
        let mut token = match token {
            Some(token) => token.to_string(),
            None => {
                self.sessions
                    .valid_credential()
                    .await
                    .ok_or(MediaError::Unauthenticated)?
                    .access_token
            }
        };
        let mut retried = false;

        loop {
            debug!(
                key = %request.key,
                retried,
                stage = %UploadStage::RequestingTarget,
                "Requesting upload URL"
            );
            let reply = with_deadline(
                UploadStage::RequestingTarget,
                timeout,
                self.endpoint.request_upload_url(request, &token),
            )
            .await?;

            if reply.is_unauthorized() && !retried {
                retried = true;
                warn!(
                    key = %request.key,
                    stage = %UploadStage::RefreshingCredential,
                    "Upload URL request unauthorized, refreshing session"
                );
                token = self
                    .sessions
                    .refreshed_credential()
                    .await
                    .ok_or(MediaError::Unauthenticated)?
                    .access_token;
                continue;
            }

            return reply.into_target();
        }
    }
}
