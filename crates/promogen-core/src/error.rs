//! Error types module
//!
//! `GenerationError` is the taxonomy every upload/generation/download failure is
//! reported with. None of them is fatal: after any of these the controller is in a
//! state from which a new attempt can be made. `RegistryError` covers edits to the
//! output registry, which never touch the network.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like remote job failures
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Describes how an error should be presented to the user.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "NO_UPLOAD")
    fn error_code(&self) -> &'static str;

    /// Whether a fresh attempt may succeed
    fn is_recoverable(&self) -> bool;

    /// The single user-facing notification for this event
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    #[error("Invalid file type: {media_type} is not an image")]
    InvalidFileType { media_type: String },

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("No image uploaded")]
    NoUpload,

    #[error("No outputs selected")]
    NoOutputsSelected,

    #[error("Invalid output spec: {0}")]
    InvalidOutputSpec(String),

    #[error("Submission failed: {0}")]
    SubmissionFailed(String),

    #[error("Polling failed: {0}")]
    PollingTransportError(String),

    #[error("Remote job failed: {0}")]
    RemoteJobFailed(String),

    #[error("Generation timed out after {after_ms} ms")]
    TimedOut { after_ms: u64 },

    #[error("Failed to save asset: {0}")]
    SaveFailed(String),
}

/// Fallback text when the server rejects a submission without a detail.
pub const DEFAULT_SUBMISSION_ERROR: &str = "Failed to start generation";

/// Fallback text when the remote job fails without an error message.
pub const DEFAULT_REMOTE_FAILURE: &str = "Generation failed";

impl GenerationError {
    pub fn error_type(&self) -> &'static str {
        match self {
            GenerationError::InvalidFileType { .. } => "InvalidFileType",
            GenerationError::UploadFailed(_) => "UploadFailed",
            GenerationError::NoUpload => "NoUpload",
            GenerationError::NoOutputsSelected => "NoOutputsSelected",
            GenerationError::InvalidOutputSpec(_) => "InvalidOutputSpec",
            GenerationError::SubmissionFailed(_) => "SubmissionFailed",
            GenerationError::PollingTransportError(_) => "PollingTransportError",
            GenerationError::RemoteJobFailed(_) => "RemoteJobFailed",
            GenerationError::TimedOut { .. } => "TimedOut",
            GenerationError::SaveFailed(_) => "SaveFailed",
        }
    }
}

impl ErrorMetadata for GenerationError {
    fn error_code(&self) -> &'static str {
        match self {
            GenerationError::InvalidFileType { .. } => "INVALID_FILE_TYPE",
            GenerationError::UploadFailed(_) => "UPLOAD_FAILED",
            GenerationError::NoUpload => "NO_UPLOAD",
            GenerationError::NoOutputsSelected => "NO_OUTPUTS_SELECTED",
            GenerationError::InvalidOutputSpec(_) => "INVALID_OUTPUT_SPEC",
            GenerationError::SubmissionFailed(_) => "SUBMISSION_FAILED",
            GenerationError::PollingTransportError(_) => "POLLING_TRANSPORT_ERROR",
            GenerationError::RemoteJobFailed(_) => "REMOTE_JOB_FAILED",
            GenerationError::TimedOut { .. } => "TIMED_OUT",
            GenerationError::SaveFailed(_) => "SAVE_FAILED",
        }
    }

    fn is_recoverable(&self) -> bool {
        true
    }

    fn client_message(&self) -> String {
        match self {
            GenerationError::InvalidFileType { .. } => "Please upload an image file".to_string(),
            GenerationError::UploadFailed(ref msg) => format!("Upload failed: {}", msg),
            GenerationError::NoUpload => "Please upload an image first".to_string(),
            GenerationError::NoOutputsSelected => {
                "Please select at least one output type".to_string()
            }
            GenerationError::InvalidOutputSpec(ref msg) => msg.clone(),
            GenerationError::SubmissionFailed(ref msg) => msg.clone(),
            GenerationError::PollingTransportError(_) => {
                "Failed to check generation status".to_string()
            }
            GenerationError::RemoteJobFailed(ref msg) => msg.clone(),
            GenerationError::TimedOut { .. } => {
                "Generation is taking longer than expected. Please try again.".to_string()
            }
            GenerationError::SaveFailed(ref msg) => format!("Download failed: {}", msg),
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            GenerationError::InvalidFileType { .. }
            | GenerationError::NoUpload
            | GenerationError::NoOutputsSelected
            | GenerationError::InvalidOutputSpec(_) => LogLevel::Debug,
            GenerationError::RemoteJobFailed(_) | GenerationError::TimedOut { .. } => {
                LogLevel::Warn
            }
            GenerationError::UploadFailed(_)
            | GenerationError::SubmissionFailed(_)
            | GenerationError::PollingTransportError(_)
            | GenerationError::SaveFailed(_) => LogLevel::Error,
        }
    }
}

/// Errors from editing the output registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Unknown output spec: {0}")]
    UnknownSpec(String),

    #[error("At least one output spec must remain")]
    LastSpec,

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}
