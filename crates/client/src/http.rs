//! Shared reqwest plumbing.

use std::time::Duration;

use funprofile_core::media::MediaError;
use reqwest::{Client, Response};
use serde::Deserialize;

/// Connect timeout for every adapter. Whole-request deadlines are applied by
/// the pipeline per stage.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the HTTP client shared by all adapters.
pub(crate) fn build_client() -> Result<Client, MediaError> {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .map_err(|e| MediaError::transport(format!("failed to create HTTP client: {e}")))
}

pub(crate) fn transport_error(err: &reqwest::Error) -> MediaError {
    MediaError::transport(err.to_string())
}

/// Error body shapes returned by the functions and the auth provider.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
}

/// Best-effort server message from a failed response.
pub(crate) async fn error_message(response: Response) -> Option<String> {
    let bytes = response.bytes().await.ok()?;
    let body: ErrorBody = serde_json::from_slice(&bytes).unwrap_or_default();
    body.error_description
        .or(body.error)
        .or(body.message)
        .or(body.msg)
}

/// Join a base URL and a path segment.
pub(crate) fn join(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
