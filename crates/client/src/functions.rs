//! Client for the media functions: `get-upload-url` and `delete-from-r2`.

use funprofile_core::media::{
    BrokerBody, BrokerEndpoint, BrokerReply, DeleteEndpoint, MediaError, UploadTargetRequest,
    server_message,
};
use funprofile_shared::ClientConfig;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use tracing::{debug, warn};

use crate::http::{build_client, error_message, join, transport_error};

const UPLOAD_URL_FUNCTION: &str = "get-upload-url";
const DELETE_FUNCTION: &str = "delete-from-r2";

#[derive(Serialize)]
struct DeleteRequest<'a> {
    key: &'a str,
}

/// Calls the serverless media functions with a user's bearer token.
#[derive(Clone)]
pub struct FunctionsClient {
    http: Client,
    base_url: String,
    anon_key: String,
}

impl std::fmt::Debug for FunctionsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionsClient")
            .field("base_url", &self.base_url)
            .field("anon_key", &"[hidden]")
            .finish_non_exhaustive()
    }
}

impl FunctionsClient {
    /// Create a client for the functions under `base_url`.
    #[must_use]
    pub fn new(http: Client, base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            anon_key: anon_key.into(),
        }
    }

    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Transport` if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, MediaError> {
        Ok(Self::new(
            build_client()?,
            &config.functions_url,
            &config.anon_key,
        ))
    }

    fn post(&self, function: &str, token: &str) -> RequestBuilder {
        self.http
            .post(join(&self.base_url, function))
            .bearer_auth(token)
            .header("apikey", &self.anon_key)
    }
}

impl BrokerEndpoint for FunctionsClient {
    async fn request_upload_url(
        &self,
        request: &UploadTargetRequest,
        token: &str,
    ) -> Result<BrokerReply, MediaError> {
        let response = self
            .post(UPLOAD_URL_FUNCTION, token)
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(|e| transport_error(&e))?;
        // Non-JSON bodies (gateway pages, empty 401s) carry no fields.
        let body: BrokerBody = serde_json::from_slice(&bytes).unwrap_or_default();

        debug!(key = %request.key, status, "Broker replied");
        Ok(BrokerReply { status, body })
    }
}

impl DeleteEndpoint for FunctionsClient {
    async fn delete_object(&self, key: &str, token: &str) -> Result<(), MediaError> {
        let response = self
            .post(DELETE_FUNCTION, token)
            .json(&DeleteRequest { key })
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = server_message(status.as_u16(), error_message(response).await);
        warn!(key = %key, status = status.as_u16(), error = %message, "Delete rejected");
        Err(MediaError::delete(status.as_u16(), message))
    }
}
