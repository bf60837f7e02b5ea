//! Stored file endpoints

use std::path::Path;

use reqwest::multipart::{Form, Part};
use stemsplit_core::domain::media::MediaKind;
use stemsplit_core::dto::upload::{DeleteFile, FileList, UploadResponse};

use crate::StemsplitClient;
use crate::error::{ClientError, Result};

impl StemsplitClient {
    /// Upload a local audio or video file
    ///
    /// The content type is derived from the file extension. The response
    /// carries the public URL and a fresh job id to start separation with.
    pub async fn upload_file(&self, path: impl AsRef<Path>) -> Result<UploadResponse> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ClientError::ReadFile {
                path: path.display().to_string(),
                source,
            })?;

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let content_type = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(MediaKind::from_extension)
            .map(MediaKind::mime)
            .unwrap_or("application/octet-stream");

        self.upload_bytes(filename, bytes, content_type).await
    }

    /// Upload in-memory file contents under `filename`
    pub async fn upload_bytes(
        &self,
        filename: impl Into<String>,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<UploadResponse> {
        let url = format!("{}/api/upload", self.base_url);
        let part = Part::bytes(bytes)
            .file_name(filename.into())
            .mime_str(content_type)?;
        let form = Form::new().part("file", part);

        let response = self.client.post(&url).multipart(form).send().await?;

        self.handle_response(response).await
    }

    /// List stored files, optionally only those whose key starts with `prefix`
    pub async fn list_files(&self, prefix: Option<&str>) -> Result<FileList> {
        let url = format!("{}/api/files", self.base_url);
        let mut request = self.client.get(&url);
        if let Some(prefix) = prefix {
            request = request.query(&[("prefix", prefix)]);
        }

        let response = request.send().await?;

        self.handle_response(response).await
    }

    /// Delete a stored file by the URL the server returned for it
    pub async fn delete_file(&self, file_url: &str) -> Result<()> {
        let url = format!("{}/api/files", self.base_url);
        let response = self
            .client
            .delete(&url)
            .json(&DeleteFile {
                url: file_url.to_string(),
            })
            .send()
            .await?;

        self.handle_empty_response(response).await
    }
}
