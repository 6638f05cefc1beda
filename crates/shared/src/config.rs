//! Application configuration management.
//!
//! Both configurations are layered the same way: optional `config/default` and
//! `config/{RUN_MODE}` files, then environment variables. The broker service
//! reads `FUNPROFILE__*`, the upload client reads `FUNPROFILE_CLIENT__*`.

use serde::Deserialize;

/// Broker service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Object storage configuration.
    pub storage: StorageSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret shared with the auth provider.
    pub secret: String,
    /// Audience every accepted token must carry.
    #[serde(default = "default_audience")]
    pub audience: String,
}

fn default_audience() -> String {
    crate::auth::AUTHENTICATED_AUDIENCE.to_string()
}

/// S3-compatible object storage configuration (Cloudflare R2 in production).
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// S3 endpoint URL.
    pub endpoint: String,
    /// Physical bucket name.
    pub bucket: String,
    /// Access key ID.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
    /// Region (`auto` for R2).
    #[serde(default = "default_region")]
    pub region: String,
    /// Origin objects are publicly served from.
    pub public_base_url: String,
    /// Maximum upload size in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Presigned upload URL TTL in seconds.
    #[serde(default = "default_presign_upload_ttl")]
    pub presign_upload_ttl_secs: u64,
}

fn default_region() -> String {
    "auto".to_string()
}

fn default_max_file_size() -> u64 {
    100 * 1024 * 1024
}

fn default_presign_upload_ttl() -> u64 {
    900 // 15 minutes
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        layered("FUNPROFILE")?.try_deserialize()
    }
}

/// Upload client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the serverless functions (`{base}/get-upload-url`).
    pub functions_url: String,
    /// Base URL of the auth provider (`{base}/token`).
    pub auth_url: String,
    /// Public API key sent as `apikey` on every call.
    pub anon_key: String,
    /// Seconds before expiry at which a session counts as stale.
    #[serde(default = "default_refresh_buffer")]
    pub refresh_buffer_secs: u64,
    /// Deadline for obtaining an upload target, in milliseconds.
    #[serde(default = "default_target_timeout")]
    pub target_timeout_ms: u64,
    /// Deadline for transferring the bytes, in milliseconds.
    #[serde(default = "default_transfer_timeout")]
    pub transfer_timeout_ms: u64,
    /// Origin serving transformed images, if image resizing is enabled.
    #[serde(default)]
    pub image_origin: Option<String>,
}

fn default_refresh_buffer() -> u64 {
    60
}

fn default_target_timeout() -> u64 {
    45_000
}

fn default_transfer_timeout() -> u64 {
    180_000
}

impl ClientConfig {
    /// Creates a client configuration with default timeouts.
    #[must_use]
    pub fn new(
        functions_url: impl Into<String>,
        auth_url: impl Into<String>,
        anon_key: impl Into<String>,
    ) -> Self {
        Self {
            functions_url: functions_url.into(),
            auth_url: auth_url.into(),
            anon_key: anon_key.into(),
            refresh_buffer_secs: default_refresh_buffer(),
            target_timeout_ms: default_target_timeout(),
            transfer_timeout_ms: default_transfer_timeout(),
            image_origin: None,
        }
    }

    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        layered("FUNPROFILE_CLIENT")?.try_deserialize()
    }
}

fn layered(prefix: &str) -> Result<config::Config, config::ConfigError> {
    let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

    config::Config::builder()
        .add_source(config::File::with_name("config/default").required(false))
        .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
        .add_source(config::Environment::with_prefix(prefix).separator("__"))
        .build()
}
