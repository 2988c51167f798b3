//! Source image upload session.
//!
//! Holds the job id issued for the most recent successful upload. A failed upload
//! leaves the previous job untouched.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use promogen_api_client::GenerationBackend;
use promogen_core::models::UploadJob;
use promogen_core::validation::is_image_media_type;
use promogen_core::GenerationError;

pub struct UploadSession {
    backend: Arc<dyn GenerationBackend>,
    current: Option<UploadJob>,
}

impl UploadSession {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            backend,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&UploadJob> {
        self.current.as_ref()
    }

    pub fn job_id(&self) -> Option<&str> {
        self.current.as_ref().map(|job| job.job_id.as_str())
    }

    /// Upload an image from disk.
    ///
    /// The media type is guessed from the file name and checked before the file
    /// is read.
    #[tracing::instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn upload(&mut self, path: &Path) -> Result<&UploadJob, GenerationError> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        let media_type = media_type_for(&file_name);
        ensure_image(&media_type)?;

        let bytes = tokio::fs::read(path).await.map_err(|e| {
            GenerationError::UploadFailed(format!("failed to read {}: {}", path.display(), e))
        })?;

        self.upload_bytes(path.to_path_buf(), &file_name, &media_type, bytes)
            .await
    }

    /// Upload in-memory image bytes. The preview data URI is built while the
    /// upload request is in flight.
    pub async fn upload_bytes(
        &mut self,
        source_path: PathBuf,
        file_name: &str,
        media_type: &str,
        bytes: Vec<u8>,
    ) -> Result<&UploadJob, GenerationError> {
        ensure_image(media_type)?;

        let size_bytes = bytes.len();
        let preview = {
            let media_type = media_type.to_string();
            let bytes = bytes.clone();
            tokio::task::spawn_blocking(move || preview_data_uri(&media_type, &bytes))
        };
        let (preview, response) =
            tokio::join!(preview, self.backend.upload(file_name, media_type, bytes));

        let response = response.map_err(|e| {
            tracing::error!(file_name, error = %e, "Upload failed");
            GenerationError::UploadFailed(e.detail())
        })?;
        let preview_data_uri = preview.map_err(|e| {
            GenerationError::UploadFailed(format!("failed to build preview: {}", e))
        })?;

        if response.job_id.trim().is_empty() {
            tracing::error!(file_name, "Upload acknowledged without a job id");
            return Err(GenerationError::UploadFailed(
                "server returned an empty job id".to_string(),
            ));
        }

        tracing::info!(
            job_id = %response.job_id,
            file_name,
            size_bytes,
            "Image uploaded"
        );

        let job = UploadJob {
            job_id: response.job_id,
            source_path,
            file_name: file_name.to_string(),
            media_type: media_type.to_string(),
            size_bytes,
            preview_data_uri,
            remote_status: response.status,
        };
        Ok(self.current.insert(job))
    }
}

/// Media type guessed from a file name; `application/octet-stream` when unknown.
pub fn media_type_for(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first_or_octet_stream()
        .to_string()
}

fn ensure_image(media_type: &str) -> Result<(), GenerationError> {
    if is_image_media_type(media_type) {
        return Ok(());
    }
    tracing::debug!(media_type, "Rejected non-image upload");
    Err(GenerationError::InvalidFileType {
        media_type: media_type.to_string(),
    })
}

fn preview_data_uri(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", media_type, STANDARD.encode(bytes))
}
