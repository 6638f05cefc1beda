//! Logical buckets partitioning stored media.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::MediaError;

/// Fixed namespace an object key starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Bucket {
    /// Images attached to feed posts.
    Posts,
    /// Profile pictures and cover images.
    Avatars,
    /// Video posts.
    Videos,
    /// Images and clips attached to comments.
    CommentMedia,
}

impl Bucket {
    /// Every bucket, in declaration order.
    pub const ALL: [Self; 4] = [Self::Posts, Self::Avatars, Self::Videos, Self::CommentMedia];

    /// Key prefix for this bucket.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Posts => "posts",
            Self::Avatars => "avatars",
            Self::Videos => "videos",
            Self::CommentMedia => "comment-media",
        }
    }

    /// Bucket named by the first segment of `key`, if any.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        let (prefix, _) = key.split_once('/')?;
        prefix.parse().ok()
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Bucket {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|bucket| bucket.as_str() == s)
            .ok_or_else(|| MediaError::invalid_key(format!("unknown bucket '{s}'")))
    }
}
