//! Authentication types for bearer credentials.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default audience stamped on access tokens issued to signed-in users.
pub const AUTHENTICATED_AUDIENCE: &str = "authenticated";

/// JWT claims carried by a user's access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: String,
    /// Audience.
    pub aud: String,
    /// Role granted by the auth provider.
    pub role: String,
    /// Email address, when the provider includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(user_id: impl Into<String>, role: &str, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.into(),
            aud: AUTHENTICATED_AUDIENCE.to_string(),
            role: role.to_string(),
            email: None,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Attaches an email address to the claims.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.sub
    }
}
