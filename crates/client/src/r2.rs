//! Upload client used by the app: upload to and delete from R2.

use std::sync::Arc;
use std::time::Duration;

use funprofile_core::media::{
    Bucket, ImageTransform, MediaDeleter, MediaError, MediaFile, MediaUploader, SessionAccessor,
    UploadResult, UploadTimeouts,
};
use funprofile_shared::ClientConfig;
use tracing::info;

use crate::auth::AuthClient;
use crate::functions::FunctionsClient;
use crate::http::build_client;
use crate::transfer::HttpObjectTransport;

/// Media client for the signed-in user.
///
/// Cheap to share behind an `Arc`; every call runs its own pipeline and
/// concurrent uploads only share the session store.
pub struct R2Client {
    auth: Arc<AuthClient>,
    uploader: MediaUploader<FunctionsClient, HttpObjectTransport, AuthClient>,
    deleter: MediaDeleter<FunctionsClient, AuthClient>,
    image_origin: Option<String>,
}

impl std::fmt::Debug for R2Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("R2Client")
            .field("auth", &self.auth)
            .field("timeouts", &self.uploader.timeouts())
            .field("image_origin", &self.image_origin)
            .finish_non_exhaustive()
    }
}

impl R2Client {
    /// Wire the client from its adapters.
    #[must_use]
    pub fn new(
        auth: Arc<AuthClient>,
        functions: Arc<FunctionsClient>,
        transport: Arc<HttpObjectTransport>,
        refresh_buffer: Duration,
        timeouts: UploadTimeouts,
    ) -> Self {
        let sessions = SessionAccessor::new(Arc::clone(&auth)).with_buffer(refresh_buffer);
        let uploader =
            MediaUploader::new(Arc::clone(&functions), transport, sessions.clone())
                .with_timeouts(timeouts);
        let deleter = MediaDeleter::new(functions, sessions);

        Self {
            auth,
            uploader,
            deleter,
            image_origin: None,
        }
    }

    /// Build every adapter from configuration over one shared HTTP client.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Transport` if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, MediaError> {
        let http = build_client()?;
        let auth = Arc::new(AuthClient::new(
            http.clone(),
            &config.auth_url,
            &config.anon_key,
        ));
        let functions = Arc::new(FunctionsClient::new(
            http.clone(),
            &config.functions_url,
            &config.anon_key,
        ));
        let transport = Arc::new(HttpObjectTransport::new(http));
        let timeouts = UploadTimeouts {
            target: Duration::from_millis(config.target_timeout_ms),
            transfer: Duration::from_millis(config.transfer_timeout_ms),
        };

        let client = Self::new(
            auth,
            functions,
            transport,
            Duration::from_secs(config.refresh_buffer_secs),
            timeouts,
        );
        Ok(match &config.image_origin {
            Some(origin) => client.with_image_origin(origin),
            None => client,
        })
    }

    /// Serve transformed images through `origin`.
    #[must_use]
    pub fn with_image_origin(mut self, origin: impl Into<String>) -> Self {
        self.image_origin = Some(origin.into());
        self
    }

    /// The session store; sign in and out through it.
    #[must_use]
    pub fn auth(&self) -> &Arc<AuthClient> {
        &self.auth
    }

    /// Upload `file` into `bucket` and return its public URL and key.
    ///
    /// `custom_path` replaces the generated key. `access_token` skips the
    /// session lookup for the first broker attempt.
    ///
    /// # Errors
    ///
    /// `MediaError::Unauthenticated` when signed out, otherwise the broker,
    /// timeout, or transfer failure.
    pub async fn upload_to_r2(
        &self,
        file: &MediaFile,
        bucket: Bucket,
        custom_path: Option<&str>,
        access_token: Option<&str>,
    ) -> Result<UploadResult, MediaError> {
        self.uploader
            .upload(file, bucket, custom_path, access_token)
            .await
    }

    /// Upload several files in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// The first failure encountered.
    pub async fn upload_many(
        &self,
        files: &[MediaFile],
        bucket: Bucket,
    ) -> Result<Vec<UploadResult>, MediaError> {
        let results = self.uploader.upload_all(files, bucket, None).await?;
        info!(bucket = %bucket, count = results.len(), "Batch upload finished");
        Ok(results)
    }

    /// Delete the object stored under `key`.
    ///
    /// # Errors
    ///
    /// `MediaError::Unauthenticated` when signed out, otherwise the delete
    /// endpoint's failure.
    pub async fn delete_from_r2(&self, key: &str) -> Result<(), MediaError> {
        self.deleter.delete_object(key).await
    }

    /// Delivery URL for an uploaded image, resized through the image origin.
    ///
    /// Without a configured origin the public URL is returned untouched.
    #[must_use]
    pub fn image_url(&self, public_url: &str, transform: &ImageTransform) -> String {
        match &self.image_origin {
            Some(origin) => transform.apply(origin, public_url),
            None => public_url.to_string(),
        }
    }
}
