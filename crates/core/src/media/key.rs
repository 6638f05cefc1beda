//! Object key derivation and validation.
//!
//! Generated keys look like `{bucket}/{unix_millis}-{token}.{ext}`. The
//! timestamp orders keys roughly by upload time and the random token keeps
//! keys written within the same millisecond apart.

use chrono::Utc;
use rand::Rng;

use super::bucket::Bucket;
use super::error::MediaError;

/// Longest key the broker accepts.
pub const MAX_KEY_LEN: usize = 512;

/// Length of the random token in generated file names.
pub const TOKEN_LEN: usize = 10;

const TOKEN_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Key for an upload: `custom_path` verbatim, else a fresh generated name.
#[must_use]
pub fn derive_key(bucket: Bucket, file_name: &str, custom_path: Option<&str>) -> String {
    match custom_path {
        Some(path) => path.to_string(),
        None => format!("{bucket}/{}", generate_file_name(file_name)),
    }
}

/// Unique file name keeping the extension of `file_name`.
#[must_use]
pub fn generate_file_name(file_name: &str) -> String {
    format!(
        "{}-{}.{}",
        Utc::now().timestamp_millis(),
        random_token(),
        file_extension(file_name)
    )
}

/// Lowercase extension of `file_name`, `bin` when there is none.
///
/// Only ASCII alphanumerics survive so the extension cannot smuggle path
/// separators into the key.
#[must_use]
pub fn file_extension(file_name: &str) -> String {
    let ext: String = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect();

    if ext.is_empty() { "bin".to_string() } else { ext }
}

fn random_token() -> String {
    let mut rng = rand::rng();
    (0..TOKEN_LEN)
        .map(|_| char::from(TOKEN_ALPHABET[rng.random_range(0..TOKEN_ALPHABET.len())]))
        .collect()
}

/// Checks that `key` is safe to write and names a known bucket.
///
/// # Errors
///
/// Returns `MediaError::InvalidKey` for empty or oversized keys, absolute
/// paths, empty or `.`/`..` segments, control characters, and unknown buckets.
pub fn validate_key(key: &str) -> Result<Bucket, MediaError> {
    if key.is_empty() {
        return Err(MediaError::invalid_key("key is empty"));
    }
    if key.len() > MAX_KEY_LEN {
        return Err(MediaError::invalid_key(format!(
            "key exceeds {MAX_KEY_LEN} bytes"
        )));
    }
    if key.starts_with('/') {
        return Err(MediaError::invalid_key("key must be relative"));
    }
    if key.chars().any(|c| c.is_control() || c == '\\') {
        return Err(MediaError::invalid_key("key contains forbidden characters"));
    }
    if key
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(MediaError::invalid_key("key contains an empty or relative segment"));
    }

    let (prefix, _) = key
        .split_once('/')
        .ok_or_else(|| MediaError::invalid_key("key must be {bucket}/{name}"))?;
    prefix.parse()
}
