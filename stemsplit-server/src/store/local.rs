//! Filesystem-backed content store

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use stemsplit_core::domain::media::MediaKind;
use tracing::debug;

use super::{ContentStore, StoreError, StoredObject, validate_key};

/// Content store writing objects below a root directory
///
/// Object URLs are `<files_url>/<key>`; the server mounts the root directory
/// at that URL.
#[derive(Debug, Clone)]
pub struct LocalContentStore {
    root: PathBuf,
    files_url: String,
}

impl LocalContentStore {
    /// Creates a store rooted at `root`, publicly reachable under `files_url`
    pub fn new(root: impl Into<PathBuf>, files_url: impl Into<String>) -> Self {
        let files_url = files_url.into();
        Self {
            root: root.into(),
            files_url: files_url.trim_end_matches('/').to_string(),
        }
    }

    /// Public URL for `key`
    pub fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.files_url, key)
    }

    fn key_from_url<'a>(&self, url: &'a str) -> Result<&'a str, StoreError> {
        url.strip_prefix(&self.files_url)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| StoreError::ForeignUrl(url.to_string()))
    }
}

#[async_trait]
impl ContentStore for LocalContentStore {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StoreError> {
        validate_key(key)?;

        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write beside the target and rename so readers never see a partial file
        let partial = path.with_file_name(format!(
            ".{}.part",
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        ));
        let size = bytes.len() as u64;
        tokio::fs::write(&partial, bytes).await?;
        tokio::fs::rename(&partial, &path).await?;

        debug!("Stored {} ({} bytes)", key, size);

        Ok(StoredObject {
            key: key.to_string(),
            url: self.url_for(key),
            size,
            content_type: content_type.to_string(),
        })
    }

    async fn delete(&self, url: &str) -> Result<(), StoreError> {
        let key = self.key_from_url(url)?;
        validate_key(key)?;

        match tokio::fs::remove_file(self.root.join(key)).await {
            Ok(()) => {
                debug!("Deleted {}", key);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(url.to_string()))
            }
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<StoredObject>, StoreError> {
        let prefix = prefix.trim_matches('/');
        if !prefix.is_empty() {
            validate_key(prefix)?;
        }

        let mut objects = Vec::new();
        let mut pending = vec![prefix.to_string()];
        while let Some(dir_key) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(self.root.join(&dir_key)).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(StoreError::Io(e)),
            };

            while let Some(entry) = entries.next_entry().await? {
                let name = entry.file_name().to_string_lossy().into_owned();
                // Hidden entries are in-flight `.part` writes
                if name.starts_with('.') {
                    continue;
                }
                let key = if dir_key.is_empty() {
                    name
                } else {
                    format!("{}/{}", dir_key, name)
                };

                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    pending.push(key);
                } else if file_type.is_file() {
                    let size = entry.metadata().await?.len();
                    objects.push(StoredObject {
                        url: self.url_for(&key),
                        content_type: content_type_for(&key).to_string(),
                        key,
                        size,
                    });
                }
            }
        }

        objects.sort_by(|a, b| a.key.cmp(&b.key));
        debug!("Listed {} object(s) under '{}'", objects.len(), prefix);
        Ok(objects)
    }
}

fn content_type_for(key: &str) -> &'static str {
    Path::new(key)
        .extension()
        .and_then(|e| e.to_str())
        .and_then(MediaKind::from_extension)
        .map(MediaKind::mime)
        .unwrap_or("application/octet-stream")
}
