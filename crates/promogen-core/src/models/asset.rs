use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

use super::output::{AssetFormat, OutputType};

const POSTER_PRINT_PREFIX: &str = "poster_print_";

/// Print size of a poster print variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintSize {
    A2,
    A3,
}

impl PrintSize {
    /// Pixel dimensions at 72 DPI.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            PrintSize::A2 => (1191, 1684),
            PrintSize::A3 => (842, 1191),
        }
    }
}

impl Display for PrintSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            PrintSize::A2 => write!(f, "A2"),
            PrintSize::A3 => write!(f, "A3"),
        }
    }
}

/// Typed view of an asset's `output_type` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetKind {
    Output(OutputType),
    PosterPrint(PrintSize),
    Other(String),
}

/// One generated asset as returned by `GET /api/assets/{job_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetResult {
    pub id: String,
    #[serde(default)]
    pub job_id: Option<String>,
    /// Raw output type. Besides the requested types the backend emits
    /// `poster_print_A2` / `poster_print_A3` for print variants.
    pub output_type: String,
    pub language: String,
    pub width: u32,
    pub height: u32,
    pub format: AssetFormat,
    /// Base64-encoded file payload.
    pub data: String,
    #[serde(default)]
    pub alt_text: Option<String>,
    /// 0..=100
    #[serde(default)]
    pub contrast_score: Option<f64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl AssetResult {
    pub fn kind(&self) -> AssetKind {
        if let Ok(t) = self.output_type.parse::<OutputType>() {
            return AssetKind::Output(t);
        }
        match self.output_type.strip_prefix(POSTER_PRINT_PREFIX) {
            Some("A2") => AssetKind::PosterPrint(PrintSize::A2),
            Some("A3") => AssetKind::PosterPrint(PrintSize::A3),
            _ => AssetKind::Other(self.output_type.clone()),
        }
    }

    /// `asset_{type}_{language}_{width}x{height}.{format}`
    ///
    /// Path separators coming from remote fields are replaced so the name always
    /// stays inside the target directory.
    pub fn file_name(&self) -> String {
        format!(
            "asset_{}_{}_{}x{}.{}",
            sanitize_component(&self.output_type),
            sanitize_component(&self.language),
            self.width,
            self.height,
            self.format.extension()
        )
    }

    /// Approximate decoded payload size in bytes.
    pub fn payload_len(&self) -> usize {
        let padding = self.data.bytes().rev().take_while(|b| *b == b'=').count();
        (self.data.len() / 4 * 3).saturating_sub(padding)
    }
}

fn sanitize_component(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect::<String>()
        .replace("..", "_")
}

/// Response of `GET /api/assets/{job_id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetsResponse {
    pub assets: Vec<AssetResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(output_type: &str, format: AssetFormat) -> AssetResult {
        AssetResult {
            id: "a1".into(),
            job_id: Some("J1".into()),
            output_type: output_type.into(),
            language: "English".into(),
            width: 1080,
            height: 1350,
            format,
            data: "aGVsbG8=".into(),
            alt_text: None,
            contrast_score: Some(64.2),
            created_at: None,
        }
    }

    #[test]
    fn file_name_follows_template() {
        let a = asset("poster", AssetFormat::Png);
        assert_eq!(a.file_name(), "asset_poster_English_1080x1350.png");
    }

    #[test]
    fn file_name_strips_path_separators() {
        let mut a = asset("../../etc", AssetFormat::Pdf);
        a.language = "a/b".into();
        let name = a.file_name();
        assert!(!name.contains('/'));
        assert!(!name.contains(".."));
    }

    #[test]
    fn kind_recognizes_print_variants() {
        assert_eq!(
            asset("poster_print_A2", AssetFormat::Pdf).kind(),
            AssetKind::PosterPrint(PrintSize::A2)
        );
        assert_eq!(
            asset("poster_print_A3", AssetFormat::Pdf).kind(),
            AssetKind::PosterPrint(PrintSize::A3)
        );
        assert_eq!(
            asset("social_post", AssetFormat::Png).kind(),
            AssetKind::Output(OutputType::SocialPost)
        );
        assert_eq!(
            asset("sticker", AssetFormat::Png).kind(),
            AssetKind::Other("sticker".into())
        );
    }

    #[test]
    fn payload_len_accounts_for_padding() {
        assert_eq!(asset("ad", AssetFormat::Png).payload_len(), 5);
    }

    #[test]
    fn assets_response_tolerates_extra_fields() {
        let json = r#"{"assets":[{
            "id":"x","job_id":"J1","output_type":"poster","language":"English",
            "width":1080,"height":1350,"format":"png","data":"AA==",
            "alt_text":"A red sneaker","contrast_score":71.5,
            "created_at":"2024-05-01T10:00:00+00:00","unexpected":true
        }]}"#;
        let resp: AssetsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.assets.len(), 1);
        assert_eq!(resp.assets[0].format, AssetFormat::Png);
        assert_eq!(resp.assets[0].alt_text.as_deref(), Some("A red sneaker"));
    }
}
