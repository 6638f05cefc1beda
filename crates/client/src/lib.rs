//! HTTP side of the FUN Profile media pipeline.
//!
//! Adapters implementing the `funprofile-core` seams over `reqwest`:
//!
//! - [`AuthClient`]: session store and refresh-token grant
//! - [`FunctionsClient`]: the `get-upload-url` and `delete-from-r2` functions
//! - [`HttpObjectTransport`]: the PUT to a presigned URL
//!
//! [`R2Client`] wires them together behind `upload_to_r2` / `delete_from_r2`.

mod auth;
mod functions;
mod http;
mod r2;
mod transfer;

pub use auth::AuthClient;
pub use functions::FunctionsClient;
pub use r2::R2Client;
pub use transfer::HttpObjectTransport;

pub use funprofile_core::media::{
    Bucket, ImageFit, ImageFormat, ImageTransform, MediaError, MediaFile, Session, UploadResult,
    UploadTimeouts,
};
