//! Content Store
//!
//! Durable object storage addressed by key. Writing returns a public URL;
//! deleting takes that URL back. Listing walks a key prefix. [`LocalContentStore`] keeps objects on disk
//! and relies on the server to serve them under `/files`.

mod local;

pub use local::LocalContentStore;

use async_trait::async_trait;
use thiserror::Error;

/// An object written to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
    pub size: u64,
    pub content_type: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("URL does not belong to this store: {0}")]
    ForeignUrl(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Service trait for durable object storage
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store `bytes` under `key`, replacing any previous object
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StoreError>;

    /// Delete the object a previous `put` returned `url` for
    async fn delete(&self, url: &str) -> Result<(), StoreError>;

    /// List stored objects below `prefix` (all objects when empty), sorted by key
    async fn list(&self, prefix: &str) -> Result<Vec<StoredObject>, StoreError>;
}

/// Check that `key` is a relative, slash-separated path without traversal
pub fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && !key.contains('\\')
        && key
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..");

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

/// Make `raw` safe to use as a single key segment
///
/// Keeps ASCII alphanumerics, `-`, `_` and `.`; everything else becomes `_`.
pub fn key_segment(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "_".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_segment() {
        assert_eq!(key_segment("job_1"), "job_1");
        assert_eq!(key_segment("My Song (final).mp3"), "My_Song__final_.mp3");
        assert_eq!(key_segment("a/b"), "a_b");
        assert_eq!(key_segment(".."), "_");
        assert_eq!(key_segment(""), "_");
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("processed/job_1/vocals.wav").is_ok());
        assert!(validate_key("uploads/1700000000000-song.mp3").is_ok());

        assert!(validate_key("").is_err());
        assert!(validate_key("/absolute").is_err());
        assert!(validate_key("processed//vocals.wav").is_err());
        assert!(validate_key("processed/../secret").is_err());
        assert!(validate_key("processed\\job").is_err());
    }
}
