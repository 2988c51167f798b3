use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::constants::{CONTRAST_PASS_THRESHOLD, CONTRAST_WARNING_THRESHOLD};

/// Body shared by `POST /api/analyze` and `POST /api/contrast-check`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageDataRequest {
    /// Base64-encoded image bytes.
    pub image_data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AltTextResponse {
    pub alt_text: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContrastStatus {
    Pass,
    Warning,
    Fail,
}

impl ContrastStatus {
    pub fn from_score(score: f64) -> Self {
        if score >= CONTRAST_PASS_THRESHOLD {
            ContrastStatus::Pass
        } else if score >= CONTRAST_WARNING_THRESHOLD {
            ContrastStatus::Warning
        } else {
            ContrastStatus::Fail
        }
    }
}

impl Display for ContrastStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ContrastStatus::Pass => write!(f, "pass"),
            ContrastStatus::Warning => write!(f, "warning"),
            ContrastStatus::Fail => write!(f, "fail"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContrastCheckResponse {
    pub contrast_score: f64,
    #[serde(default)]
    pub status: Option<String>,
}

impl ContrastCheckResponse {
    /// Status reported by the server, or derived from the score when missing or unknown.
    pub fn status(&self) -> ContrastStatus {
        match self.status.as_deref() {
            Some("pass") => ContrastStatus::Pass,
            Some("warning") => ContrastStatus::Warning,
            Some("fail") => ContrastStatus::Fail,
            _ => ContrastStatus::from_score(self.contrast_score),
        }
    }
}

/// Response of `GET /api/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub message: String,
}
