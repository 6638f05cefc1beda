//! Router harness over an in-memory object store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, header::AUTHORIZATION},
    response::Response,
};
use chrono::{Duration, Utc};
use funprofile_core::storage::{
    MediaStore, PresignedUpload, StorageConfig, StorageError, StorageProvider, StorageService,
};
use funprofile_shared::{Claims, JwtConfig, JwtService};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use crate::{AppState, create_router};

/// Applies the real upload rules and records what got through.
pub(crate) struct FakeStore {
    config: StorageConfig,
    fail_operations: bool,
    presigned: Mutex<Vec<String>>,
    deleted: Mutex<Vec<String>>,
}

impl FakeStore {
    fn new(fail_operations: bool) -> Self {
        Self {
            config: StorageConfig::new(
                StorageProvider::local_fs("./unused"),
                "https://media.fun.rich",
            ),
            fail_operations,
            presigned: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn presigned_keys(&self) -> Vec<String> {
        self.presigned.lock().unwrap().clone()
    }

    pub(crate) fn deleted_keys(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaStore for FakeStore {
    async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        file_size: u64,
    ) -> Result<PresignedUpload, StorageError> {
        StorageService::validate_key(key)?;
        if file_size > self.config.max_file_size {
            return Err(StorageError::file_too_large(
                file_size,
                self.config.max_file_size,
            ));
        }
        if !self.config.is_mime_type_allowed(content_type) {
            return Err(StorageError::invalid_mime_type(content_type));
        }
        if self.fail_operations {
            return Err(StorageError::Operation("bucket unreachable".to_string()));
        }

        self.presigned.lock().unwrap().push(key.to_string());
        Ok(PresignedUpload {
            upload_url: format!("https://r2.test/{key}?X-Amz-Signature=fake"),
            public_url: format!("{}/{key}", self.config.public_base_url),
            method: "PUT".to_string(),
            headers: HashMap::new(),
            expires_at: Utc::now() + Duration::seconds(900),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        StorageService::validate_key(key)?;
        if self.fail_operations {
            return Err(StorageError::Operation("bucket unreachable".to_string()));
        }

        self.deleted.lock().unwrap().push(key.to_string());
        Ok(())
    }
}

pub(crate) struct TestApp {
    router: Router,
    jwt: Arc<JwtService>,
    pub(crate) store: Arc<FakeStore>,
}

impl TestApp {
    pub(crate) fn new() -> Self {
        Self::build(false)
    }

    /// Store that accepts valid requests but fails every operation.
    pub(crate) fn failing() -> Self {
        Self::build(true)
    }

    fn build(fail_operations: bool) -> Self {
        let jwt = Arc::new(JwtService::new(JwtConfig {
            secret: "route-test-secret".to_string(),
            ..JwtConfig::default()
        }));
        let store = Arc::new(FakeStore::new(fail_operations));
        let state = AppState {
            jwt_service: Arc::clone(&jwt),
            store: store.clone(),
        };

        Self {
            router: create_router(state),
            jwt,
            store,
        }
    }

    pub(crate) fn token(&self, user_id: &str) -> String {
        self.jwt.generate_access_token(user_id).unwrap()
    }

    pub(crate) fn expired_token(&self, user_id: &str) -> String {
        let claims = Claims::new(user_id, "authenticated", Utc::now() - Duration::hours(2));
        self.jwt.encode_claims(&claims).unwrap()
    }

    pub(crate) async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Response {
        let mut request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json");
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        self.router
            .clone()
            .oneshot(request.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap()
    }

    pub(crate) async fn get(&self, uri: &str) -> Response {
        self.router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }
}

pub(crate) async fn read_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
