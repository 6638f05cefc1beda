//! Upload URL broker route.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates the upload routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/get-upload-url", post(get_upload_url))
}

/// Request body for an upload URL.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlRequest {
    /// Object key, `{bucket}/{name}`.
    pub key: String,
    /// MIME type the client will PUT.
    pub content_type: String,
    /// Size of the file in bytes.
    pub file_size: u64,
}

/// Response for an upload URL request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlResponse {
    /// Presigned PUT URL.
    pub upload_url: String,
    /// Where the object will be publicly readable.
    pub public_url: String,
    /// When the upload URL expires (RFC 3339).
    pub expires_at: String,
}

/// POST `/get-upload-url`
async fn get_upload_url(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<UploadUrlRequest>, JsonRejection>,
) -> Result<Json<UploadUrlResponse>, ApiError> {
    let Json(payload) = payload?;

    let presigned = state
        .store
        .presign_upload(&payload.key, &payload.content_type, payload.file_size)
        .await
        .map_err(|e| {
            warn!(
                user_id = %user.user_id(),
                key = %payload.key,
                error = %e,
                "Upload URL refused"
            );
            ApiError::from(e)
        })?;

    info!(
        user_id = %user.user_id(),
        key = %payload.key,
        size = payload.file_size,
        "Upload URL issued"
    );

    Ok(Json(UploadUrlResponse {
        upload_url: presigned.upload_url,
        public_url: presigned.public_url,
        expires_at: presigned.expires_at.to_rfc3339(),
    }))
}
