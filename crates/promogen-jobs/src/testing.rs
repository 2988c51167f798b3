//! Scripted backend and fixtures for controller and session tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use promogen_api_client::{ApiError, GenerationBackend, StatusCode};
use promogen_core::models::{
    AssetFormat, AssetResult, GenerateAck, GenerationRequest, JobStatus, JobStatusResponse,
    UploadResponse,
};

pub fn asset(id: &str, output_type: &str) -> AssetResult {
    AssetResult {
        id: id.to_string(),
        job_id: Some("J1".to_string()),
        output_type: output_type.to_string(),
        language: "English".to_string(),
        width: 1080,
        height: 1350,
        format: AssetFormat::Png,
        // "hello"
        data: "aGVsbG8=".to_string(),
        alt_text: None,
        contrast_score: None,
        created_at: None,
    }
}

pub fn server_error(detail: &str) -> ApiError {
    ApiError::Status {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        detail: detail.to_string(),
    }
}

/// One scripted reply to a status query.
pub enum StatusReply {
    Status(JobStatus, Option<String>),
    Error(String),
}

impl StatusReply {
    pub fn pending() -> Self {
        StatusReply::Status(JobStatus::Pending, None)
    }

    pub fn completed() -> Self {
        StatusReply::Status(JobStatus::Completed, None)
    }

    pub fn failed(message: Option<&str>) -> Self {
        StatusReply::Status(JobStatus::Failed, message.map(str::to_string))
    }
}

#[derive(Default)]
struct Script {
    upload: Option<Result<String, String>>,
    submit_error: Option<String>,
    submit_delay: Duration,
    statuses: VecDeque<StatusReply>,
    assets: Vec<AssetResult>,
    assets_error: Option<String>,
}

/// Everything the backend was asked, in order.
#[derive(Default, Debug, Clone)]
pub struct Calls {
    pub uploads: Vec<(String, String, usize)>,
    pub submits: Vec<GenerationRequest>,
    pub status_queries: Vec<String>,
    pub asset_fetches: Vec<String>,
}

/// In-memory backend replaying scripted replies. Once the status script runs
/// out every further query reports pending.
#[derive(Default)]
pub struct ScriptedBackend {
    script: Mutex<Script>,
    calls: Mutex<Calls>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_upload(self, result: Result<&str, &str>) -> Self {
        self.script.lock().unwrap().upload =
            Some(result.map(str::to_string).map_err(str::to_string));
        self
    }

    pub fn with_submit_error(self, detail: &str) -> Self {
        self.script.lock().unwrap().submit_error = Some(detail.to_string());
        self
    }

    pub fn with_submit_delay(self, delay: Duration) -> Self {
        self.script.lock().unwrap().submit_delay = delay;
        self
    }

    pub fn with_statuses(self, replies: impl IntoIterator<Item = StatusReply>) -> Self {
        self.script.lock().unwrap().statuses.extend(replies);
        self
    }

    pub fn with_assets(self, assets: Vec<AssetResult>) -> Self {
        self.script.lock().unwrap().assets = assets;
        self
    }

    pub fn with_assets_error(self, detail: &str) -> Self {
        self.script.lock().unwrap().assets_error = Some(detail.to_string());
        self
    }

    pub fn calls(&self) -> Calls {
        self.calls.lock().unwrap().clone()
    }

    pub fn status_queries(&self) -> usize {
        self.calls.lock().unwrap().status_queries.len()
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn upload(
        &self,
        file_name: &str,
        media_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResponse, ApiError> {
        self.calls.lock().unwrap().uploads.push((
            file_name.to_string(),
            media_type.to_string(),
            bytes.len(),
        ));
        let scripted = self.script.lock().unwrap().upload.clone();
        match scripted.unwrap_or_else(|| Ok("J1".to_string())) {
            Ok(job_id) => Ok(UploadResponse {
                job_id,
                status: Some("pending".to_string()),
            }),
            Err(detail) => Err(ApiError::Status {
                status: StatusCode::BAD_REQUEST,
                detail,
            }),
        }
    }

    async fn submit(&self, request: &GenerationRequest) -> Result<GenerateAck, ApiError> {
        self.calls.lock().unwrap().submits.push(request.clone());
        let (delay, error) = {
            let script = self.script.lock().unwrap();
            (script.submit_delay, script.submit_error.clone())
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match error {
            Some(detail) => Err(server_error(&detail)),
            None => Ok(GenerateAck::default()),
        }
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatusResponse, ApiError> {
        self.calls
            .lock()
            .unwrap()
            .status_queries
            .push(job_id.to_string());
        let reply = self
            .script
            .lock()
            .unwrap()
            .statuses
            .pop_front()
            .unwrap_or_else(StatusReply::pending);
        match reply {
            StatusReply::Status(status, error) => Ok(JobStatusResponse {
                id: Some(job_id.to_string()),
                status,
                error,
                created_at: None,
                updated_at: None,
            }),
            StatusReply::Error(detail) => Err(server_error(&detail)),
        }
    }

    async fn job_assets(&self, job_id: &str) -> Result<Vec<AssetResult>, ApiError> {
        self.calls
            .lock()
            .unwrap()
            .asset_fetches
            .push(job_id.to_string());
        let script = self.script.lock().unwrap();
        match &script.assets_error {
            Some(detail) => Err(server_error(detail)),
            None => Ok(script.assets.clone()),
        }
    }
}
