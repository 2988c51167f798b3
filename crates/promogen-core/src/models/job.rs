use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;

/// Remote job status as classified by the client.
///
/// Anything the server reports other than `completed` or `failed` (including the
/// backend's `processing`) is treated as still pending.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum JobStatus {
    Pending,
    Completed,
    Failed,
}

impl From<String> for JobStatus {
    fn from(s: String) -> Self {
        JobStatus::from(s.as_str())
    }
}

impl From<&str> for JobStatus {
    fn from(s: &str) -> Self {
        match s {
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            _ => JobStatus::Pending,
        }
    }
}

impl Display for JobStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Response of `GET /api/jobs/{job_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusResponse {
    #[serde(default)]
    pub id: Option<String>,
    pub status: JobStatus,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Response of `POST /api/upload`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub job_id: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Response of `POST /api/generate`. Only success matters; fields are informational.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateAck {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub job_id: Option<String>,
}

/// A source image accepted by the remote system.
#[derive(Debug, Clone, Serialize)]
pub struct UploadJob {
    /// Opaque identifier assigned by the remote system.
    pub job_id: String,
    pub source_path: PathBuf,
    pub file_name: String,
    pub media_type: String,
    pub size_bytes: usize,
    /// `data:` URI of the source image for immediate display.
    #[serde(skip)]
    pub preview_data_uri: String,
    pub remote_status: Option<String>,
}
