//! Upload Service
//!
//! Stores source files for later separation, lists and removes stored files.

use stemsplit_core::domain::job::generate_job_id;
use stemsplit_core::domain::media::MediaKind;
use stemsplit_core::dto::upload::{FileList, StoredFile, UploadResponse};
use thiserror::Error;
use uuid::Uuid;

use crate::store::{ContentStore, StoreError, key_segment};

/// Service error type
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file provided")]
    MissingFile,

    #[error("Invalid file type. Please upload an audio or video file.")]
    UnsupportedMediaKind(String),

    #[error("Missing file url")]
    MissingUrl,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A file received from a client
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    /// Declared content type, if any
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Validate and store an uploaded source file
pub async fn store_upload(
    store: &dyn ContentStore,
    uploads_prefix: &str,
    file: UploadedFile,
) -> Result<UploadResponse, UploadError> {
    let kind = media_kind(&file).ok_or_else(|| {
        UploadError::UnsupportedMediaKind(file.content_type.clone().unwrap_or_default())
    })?;

    let filename = file
        .filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .to_string();
    // Same-name uploads within one millisecond must not share a key
    let nonce = Uuid::new_v4().simple().to_string();
    let key = format!(
        "{}/{}-{}-{}",
        uploads_prefix,
        chrono::Utc::now().timestamp_millis(),
        &nonce[..8],
        key_segment(&filename)
    );

    let object = store.put(&key, file.bytes, kind.mime()).await?;

    tracing::info!("Stored upload {} ({} bytes) at {}", filename, object.size, object.url);

    let content_type = file
        .content_type
        .map(|ct| ct.trim().to_string())
        .filter(|ct| !ct.is_empty())
        .unwrap_or(object.content_type);

    Ok(UploadResponse {
        job_id: generate_job_id(),
        url: object.url,
        filename,
        size: object.size,
        content_type,
    })
}

/// List stored files, optionally restricted to a key prefix
pub async fn list_files(
    store: &dyn ContentStore,
    prefix: Option<&str>,
) -> Result<FileList, UploadError> {
    let objects = store.list(prefix.unwrap_or_default()).await?;

    let files = objects
        .into_iter()
        .map(|object| StoredFile {
            key: object.key,
            url: object.url,
            size: object.size,
            content_type: object.content_type,
        })
        .collect();

    Ok(FileList { files })
}

/// Delete a previously stored file by its public URL
pub async fn delete_file(store: &dyn ContentStore, url: &str) -> Result<(), UploadError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(UploadError::MissingUrl);
    }

    store.delete(url).await?;
    tracing::info!("Deleted stored file {}", url);
    Ok(())
}

/// Declared type first; a missing or generic type falls back to the extension
fn media_kind(file: &UploadedFile) -> Option<MediaKind> {
    let declared = file
        .content_type
        .as_deref()
        .map(str::trim)
        .filter(|ct| !ct.is_empty() && !ct.eq_ignore_ascii_case("application/octet-stream"));

    match declared {
        Some(content_type) => MediaKind::from_mime(content_type),
        None => file
            .filename
            .rsplit_once('.')
            .and_then(|(_, ext)| MediaKind::from_extension(ext)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LocalContentStore;

    fn upload(name: &str, content_type: Option<&str>) -> UploadedFile {
        UploadedFile {
            filename: name.to_string(),
            content_type: content_type.map(str::to_string),
            bytes: b"data".to_vec(),
        }
    }

    /// Count regular files below `dir`
    fn files_in(dir: &std::path::Path) -> usize {
        std::fs::read_dir(dir)
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .map(|e| {
                        if e.path().is_dir() {
                            files_in(&e.path())
                        } else {
                            1
                        }
                    })
                    .sum()
            })
            .unwrap_or(0)
    }

    #[tokio::test]
    async fn test_store_upload() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalContentStore::new(dir.path(), "http://localhost:8080/files");

        let response = store_upload(&store, "uploads", upload("My Song.mp3", Some("audio/mp3")))
            .await
            .unwrap();

        assert!(response.job_id.starts_with("job_"));
        assert_eq!(response.filename, "My Song.mp3");
        assert_eq!(response.size, 4);
        assert_eq!(response.content_type, "audio/mp3");
        assert!(response.url.starts_with("http://localhost:8080/files/uploads/"));
        assert!(response.url.ends_with("-My_Song.mp3"));
        assert_eq!(files_in(dir.path()), 1);
    }

    #[tokio::test]
    async fn test_store_upload_without_declared_type_reports_canonical_type() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalContentStore::new(dir.path(), "http://localhost:8080/files");

        let response = store_upload(&store, "uploads", upload("take.flac", None))
            .await
            .unwrap();
        assert_eq!(response.content_type, "audio/flac");
    }

    #[tokio::test]
    async fn test_same_name_uploads_get_distinct_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalContentStore::new(dir.path(), "http://localhost:8080/files");

        let (first, second) = tokio::join!(
            store_upload(&store, "uploads", upload("song.mp3", Some("audio/mpeg"))),
            store_upload(&store, "uploads", upload("song.mp3", Some("audio/mpeg"))),
        );
        let (first, second) = (first.unwrap(), second.unwrap());

        assert_ne!(first.url, second.url);
        assert_eq!(files_in(dir.path()), 2);
    }

    #[tokio::test]
    async fn test_list_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalContentStore::new(dir.path(), "http://localhost:8080/files");

        let uploaded = store_upload(&store, "uploads", upload("a.wav", Some("audio/x-wav")))
            .await
            .unwrap();
        store
            .put("processed/job_1/vocals.wav", b"RIFF".to_vec(), "audio/wav")
            .await
            .unwrap();

        let all = list_files(&store, None).await.unwrap();
        let urls: Vec<&str> = all.files.iter().map(|f| f.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "http://localhost:8080/files/processed/job_1/vocals.wav",
                uploaded.url.as_str()
            ]
        );

        let uploads = list_files(&store, Some("uploads")).await.unwrap();
        assert_eq!(uploads.files.len(), 1);
        assert!(uploads.files[0].key.starts_with("uploads/"));
        assert_eq!(uploads.files[0].content_type, "audio/wav");
        assert_eq!(uploads.files[0].size, 4);
    }

    #[tokio::test]
    async fn test_store_upload_rejects_unknown_media() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalContentStore::new(dir.path(), "http://localhost:8080/files");

        let err = store_upload(&store, "uploads", upload("notes.txt", Some("text/plain")))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::UnsupportedMediaKind(_)));
        assert_eq!(files_in(dir.path()), 0);
    }

    #[test]
    fn test_media_kind_falls_back_to_extension() {
        assert_eq!(media_kind(&upload("a.flac", None)), Some(MediaKind::Flac));
        assert_eq!(
            media_kind(&upload("clip.MKV", Some("application/octet-stream"))),
            Some(MediaKind::Matroska)
        );
        assert_eq!(media_kind(&upload("a.wav", Some("text/plain"))), None);
        assert_eq!(media_kind(&upload("README", None)), None);
    }

    #[tokio::test]
    async fn test_delete_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalContentStore::new(dir.path(), "http://localhost:8080/files");

        let response = store_upload(&store, "uploads", upload("a.wav", Some("audio/wav")))
            .await
            .unwrap();
        delete_file(&store, &response.url).await.unwrap();
        assert_eq!(files_in(dir.path()), 0);

        let err = delete_file(&store, &response.url).await.unwrap_err();
        assert!(matches!(err, UploadError::Store(StoreError::NotFound(_))));
        assert!(matches!(delete_file(&store, " ").await, Err(UploadError::MissingUrl)));
    }
}
