use async_trait::async_trait;
use promogen_core::models::{
    AssetResult, GenerateAck, GenerationRequest, JobStatusResponse, UploadResponse,
};

use crate::{ApiClient, ApiError};

/// The remote collaborator behind uploads and generation runs.
///
/// [`ApiClient`] is the production implementation; the job controller only
/// depends on this trait.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn upload(
        &self,
        file_name: &str,
        media_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResponse, ApiError>;

    async fn submit(&self, request: &GenerationRequest) -> Result<GenerateAck, ApiError>;

    async fn job_status(&self, job_id: &str) -> Result<JobStatusResponse, ApiError>;

    async fn job_assets(&self, job_id: &str) -> Result<Vec<AssetResult>, ApiError>;
}

#[async_trait]
impl GenerationBackend for ApiClient {
    async fn upload(
        &self,
        file_name: &str,
        media_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResponse, ApiError> {
        self.upload_image(file_name, media_type, bytes).await
    }

    async fn submit(&self, request: &GenerationRequest) -> Result<GenerateAck, ApiError> {
        self.start_generation(request).await
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatusResponse, ApiError> {
        ApiClient::job_status(self, job_id).await
    }

    async fn job_assets(&self, job_id: &str) -> Result<Vec<AssetResult>, ApiError> {
        ApiClient::job_assets(self, job_id).await
    }
}
