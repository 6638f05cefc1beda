//! Upload lifecycle stages.

use std::fmt;

/// Where an upload currently is.
///
/// `Idle → RequestingTarget → (RefreshingCredential → RequestingTarget) →
/// Transferring → Done`; any stage may end in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadStage {
    /// Key derived, nothing sent yet.
    Idle,
    /// Waiting on the upload-URL broker.
    RequestingTarget,
    /// Broker answered 401; refreshing the session before the single retry.
    RefreshingCredential,
    /// Sending the bytes to the write URL.
    Transferring,
    /// Public URL obtained and bytes stored.
    Done,
    /// Unrecoverable error.
    Failed,
}

impl UploadStage {
    /// Whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for UploadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::RequestingTarget => "requesting upload target",
            Self::RefreshingCredential => "refreshing credential",
            Self::Transferring => "transferring object",
            Self::Done => "done",
            Self::Failed => "failed",
        })
    }
}
