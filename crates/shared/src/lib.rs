//! Shared configuration, errors, and token handling for the FUN Profile
//! media pipeline.
//!
//! This crate provides common types used across all other crates:
//! - Server and client configuration
//! - Application-wide error types
//! - JWT claims and validation for bearer credentials

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;


pub use auth::Claims;
pub use config::{AppConfig, ClientConfig, JwtSettings, ServerConfig, StorageSettings};
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
