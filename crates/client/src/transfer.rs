//! PUT to a presigned object store URL.

use bytes::Bytes;
use funprofile_core::media::{MediaError, ObjectTransport};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;

use crate::http::transport_error;

/// Streams file bytes to presigned write URLs.
#[derive(Debug, Clone)]
pub struct HttpObjectTransport {
    http: Client,
}

impl HttpObjectTransport {
    /// Create a transport over an existing client.
    #[must_use]
    pub fn new(http: Client) -> Self {
        Self { http }
    }
}

impl ObjectTransport for HttpObjectTransport {
    async fn put_object(
        &self,
        url: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<u16, MediaError> {
        let response = self
            .http
            .put(url)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        Ok(response.status().as_u16())
    }
}
