use reqwest::StatusCode;

/// Failure of a single API call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {detail}")]
    Status { status: StatusCode, detail: String },

    #[error("Failed to parse response: {0}")]
    Decode(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ApiError {
    /// Server-provided detail when there is one, else the error text.
    pub fn detail(&self) -> String {
        match self {
            ApiError::Status { detail, .. } if !detail.is_empty() => detail.clone(),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// Build a status error from a non-success response body.
    ///
    /// Error bodies look like `{ "detail": "..." }`; validation errors carry a
    /// structured `detail`, which is kept as compact JSON.
    pub fn from_body(status: StatusCode, body: &str) -> Self {
        let detail = match serde_json::from_str::<serde_json::Value>(body) {
            Ok(serde_json::Value::Object(map)) => match map.get("detail") {
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => body.trim().to_string(),
            },
            _ => body.trim().to_string(),
        };
        ApiError::Status { status, detail }
    }
}
