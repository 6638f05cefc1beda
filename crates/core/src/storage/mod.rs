//! Object storage for the upload-URL broker, using Apache OpenDAL.
//!
//! The broker never touches file bytes: it validates an upload, presigns a
//! PUT for the client, and deletes objects by key.
//!
//! - S3-compatible: Cloudflare R2 (production), any S3 endpoint
//! - Local filesystem (development only, cannot presign)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Apache OpenDAL                             │
//! │                   (Unified Storage API)                         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ op.presign_write("key", ttl)  │ op.delete("key")                │
//! │ op.stat("key")                │                                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod service;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use service::{MediaStore, PresignedUpload, StorageService};
