//! FUN Profile media service
//!
//! Issues presigned upload URLs and deletes objects for signed-in users.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use funprofile_api::{AppState, create_router};
use funprofile_core::storage::{StorageConfig, StorageService};
use funprofile_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "funprofile=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let jwt_service = JwtService::new(JwtConfig {
        secret: config.jwt.secret.clone(),
        audience: config.jwt.audience.clone(),
        ..JwtConfig::default()
    });

    let storage = StorageService::from_config(StorageConfig::from_settings(&config.storage))
        .context("Failed to initialize object storage")?;
    info!(
        provider = storage.provider_name(),
        bucket = storage.bucket(),
        public_base_url = %config.storage.public_base_url,
        "Object storage configured"
    );

    let state = AppState {
        jwt_service: Arc::new(jwt_service),
        store: Arc::new(storage),
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
