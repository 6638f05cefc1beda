//! Object deletion route.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates the object routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/delete-from-r2", post(delete_object))
}

/// Request body for deleting an object.
#[derive(Debug, Deserialize)]
pub struct DeleteObjectRequest {
    /// Object key, `{bucket}/{name}`.
    pub key: String,
}

/// Response for a deletion.
#[derive(Debug, Serialize)]
pub struct DeleteObjectResponse {
    /// Always `true`; failures are error responses.
    pub success: bool,
}

/// POST `/delete-from-r2`
async fn delete_object(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<DeleteObjectRequest>, JsonRejection>,
) -> Result<Json<DeleteObjectResponse>, ApiError> {
    let Json(payload) = payload?;

    state.store.delete(&payload.key).await.map_err(|e| {
        warn!(
            user_id = %user.user_id(),
            key = %payload.key,
            error = %e,
            "Delete refused"
        );
        ApiError::from(e)
    })?;

    info!(user_id = %user.user_id(), key = %payload.key, "Object deleted");
    Ok(Json(DeleteObjectResponse { success: true }))
}
