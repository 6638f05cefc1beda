//! Media upload pipeline and object storage for FUN Profile.
//!
//! This crate holds the pipeline logic with no HTTP client dependencies. The
//! network seams are traits implemented by `funprofile-client`.
//!
//! # Modules
//!
//! - `media` - Session access, upload-URL brokering, transfer, orchestration, deletion
//! - `storage` - Presigned writes and deletes against S3-compatible storage (broker side)

pub mod media;
pub mod storage;
