//! Authenticated media uploads.
//!
//! The pipeline for one file:
//!
//! ```text
//! caller ─► MediaUploader ─► SessionAccessor (no token given)
//!                        ─► UploadBroker ─► BrokerEndpoint   (401 → refresh → retry once)
//!                        ─► ObjectTransfer ─► ObjectTransport (PUT presigned URL)
//!                        ◄─ UploadResult { url, key }
//! ```
//!
//! Every network seam is a trait so the HTTP adapters can live elsewhere and
//! tests can substitute in-memory fakes.

mod broker;
mod bucket;
mod deadline;
mod delete;
mod error;
mod file;
mod key;
mod session;
mod stage;
mod transfer;
mod transform;
mod upload;

#[cfg(test)]
mod test_support;
#[cfg(test)]
mod upload_tests;

pub use broker::{
    BrokerBody, BrokerEndpoint, BrokerReply, UploadBroker, UploadTarget, UploadTargetRequest,
};
pub use bucket::Bucket;
pub use deadline::with_deadline;
pub use delete::{DeleteEndpoint, MediaDeleter};
pub use error::{MediaError, server_message};
pub use file::{MediaFile, content_type_for};
pub use key::{MAX_KEY_LEN, derive_key, file_extension, generate_file_name, validate_key};
pub use session::{Credential, Session, SessionAccessor, SessionProvider};
pub use stage::UploadStage;
pub use transfer::{ObjectTransfer, ObjectTransport};
pub use transform::{ImageFit, ImageFormat, ImageTransform};
pub use upload::{MediaUploader, UploadResult, UploadTimeouts};
