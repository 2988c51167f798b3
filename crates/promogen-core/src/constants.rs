//! Shared constants: timings, languages, default output sizes.

use crate::models::{AssetFormat, OutputType};

/// Interval between job status queries while a generation run is polling.
pub const POLL_INTERVAL_MS: u64 = 3_000;

/// Hard upper bound on the polling phase, measured from entry into polling.
pub const POLL_TIMEOUT_MS: u64 = 300_000;

/// Delay between consecutive saves when materializing a whole batch.
pub const SAVE_STAGGER_MS: u64 = 100;

/// Per-request HTTP timeout.
pub const HTTP_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_API_URL: &str = "http://localhost:8001";

pub const DEFAULT_LANGUAGE: &str = "English";

/// Languages an output may be generated in.
pub const LANGUAGES: &[&str] = &[
    "English",
    "Spanish",
    "French",
    "German",
    "Italian",
    "Portuguese",
    "Dutch",
    "Polish",
    "Swedish",
    "Japanese",
    "Chinese",
    "Korean",
    "Arabic",
    "Hindi",
];

/// Formats a freshly added output requests.
pub const DEFAULT_FORMATS: &[AssetFormat] =
    &[AssetFormat::Png, AssetFormat::Jpeg, AssetFormat::Pdf];

/// Contrast score at or above which an image passes the contrast check.
pub const CONTRAST_PASS_THRESHOLD: f64 = 50.0;

/// Contrast score at or above which an image only warns.
pub const CONTRAST_WARNING_THRESHOLD: f64 = 30.0;

/// Default pixel dimensions for an output type.
pub fn default_dimensions(output_type: OutputType) -> (u32, u32) {
    match output_type {
        OutputType::Poster => (1080, 1350),
        OutputType::Banner => (1920, 600),
        OutputType::Ad => (1200, 628),
        OutputType::SocialPost => (1080, 1080),
        OutputType::Brochure => (1240, 1754),
    }
}

pub fn is_supported_language(language: &str) -> bool {
    LANGUAGES.contains(&language)
}
