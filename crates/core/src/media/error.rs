//! Media pipeline error types.

use std::time::Duration;

use thiserror::Error;

use super::stage::UploadStage;

/// Errors surfaced by the upload and delete pipeline.
#[derive(Debug, Error)]
pub enum MediaError {
    /// No credential is available and none could be refreshed.
    #[error("not authenticated: please sign in")]
    Unauthenticated,

    /// The upload-URL broker rejected the request or answered malformed.
    #[error("upload URL request failed ({status}): {message}")]
    Broker {
        /// HTTP status returned by the broker.
        status: u16,
        /// Server-provided message, or `HTTP {status}` when absent.
        message: String,
    },

    /// A step did not finish before its deadline.
    #[error("{stage} timed out after {}ms", after.as_millis())]
    Timeout {
        /// Step that was aborted.
        stage: UploadStage,
        /// Deadline that elapsed.
        after: Duration,
    },

    /// The object store rejected the PUT.
    #[error("upload failed with status {status}")]
    Transfer {
        /// HTTP status returned by the object store.
        status: u16,
    },

    /// The delete endpoint rejected the request.
    #[error("delete failed ({status}): {message}")]
    Delete {
        /// HTTP status returned by the delete endpoint.
        status: u16,
        /// Server-provided message, or `HTTP {status}` when absent.
        message: String,
    },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The session provider failed.
    #[error("session error: {0}")]
    Session(String),

    /// The object key is not acceptable.
    #[error("invalid object key: {0}")]
    InvalidKey(String),

    /// Reading a local file failed.
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Create a broker error.
    #[must_use]
    pub fn broker(status: u16, message: impl Into<String>) -> Self {
        Self::Broker {
            status,
            message: message.into(),
        }
    }

    /// Create a delete error.
    #[must_use]
    pub fn delete(status: u16, message: impl Into<String>) -> Self {
        Self::Delete {
            status,
            message: message.into(),
        }
    }

    /// Create a transport error.
    #[must_use]
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a session error.
    #[must_use]
    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session(msg.into())
    }

    /// Create an invalid key error.
    #[must_use]
    pub fn invalid_key(msg: impl Into<String>) -> Self {
        Self::InvalidKey(msg.into())
    }

    /// Whether the caller should ask the user to sign in again.
    #[must_use]
    pub const fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated)
    }

    /// Whether a deadline elapsed.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Message for a failed response: the server's own, else the bare status.
pub fn server_message(status: u16, message: Option<String>) -> String {
    message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("HTTP {status}"))
}
