use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::constants::{default_dimensions, DEFAULT_FORMATS, DEFAULT_LANGUAGE};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OutputType {
    Poster,
    Banner,
    Ad,
    SocialPost,
    Brochure,
}

impl OutputType {
    pub const ALL: [OutputType; 5] = [
        OutputType::Poster,
        OutputType::Banner,
        OutputType::Ad,
        OutputType::SocialPost,
        OutputType::Brochure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputType::Poster => "poster",
            OutputType::Banner => "banner",
            OutputType::Ad => "ad",
            OutputType::SocialPost => "social_post",
            OutputType::Brochure => "brochure",
        }
    }
}

impl Display for OutputType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "poster" => Ok(OutputType::Poster),
            "banner" => Ok(OutputType::Banner),
            "ad" => Ok(OutputType::Ad),
            "social_post" => Ok(OutputType::SocialPost),
            "brochure" => Ok(OutputType::Brochure),
            _ => Err(anyhow::anyhow!("Invalid output type: {}", s)),
        }
    }
}

/// File format of a generated asset. Ordering fixes the order formats are sent in.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "lowercase")]
pub enum AssetFormat {
    Png,
    Jpeg,
    Pdf,
    Svg,
}

impl AssetFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            AssetFormat::Png => "png",
            AssetFormat::Jpeg => "jpeg",
            AssetFormat::Pdf => "pdf",
            AssetFormat::Svg => "svg",
        }
    }
}

impl Display for AssetFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.extension())
    }
}

impl FromStr for AssetFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png" => Ok(AssetFormat::Png),
            "jpeg" | "jpg" => Ok(AssetFormat::Jpeg),
            "pdf" => Ok(AssetFormat::Pdf),
            "svg" => Ok(AssetFormat::Svg),
            _ => Err(anyhow::anyhow!("Invalid asset format: {}", s)),
        }
    }
}

/// One requested marketing-asset configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSpec {
    /// Stable identity within a registry.
    pub id: String,
    pub output_type: OutputType,
    pub enabled: bool,
    pub language: String,
    pub width: u32,
    pub height: u32,
    pub formats: BTreeSet<AssetFormat>,
    /// Only meaningful for posters.
    pub generate_print: bool,
}

impl OutputSpec {
    /// Spec with the type's default size, default formats and print flag.
    pub fn with_defaults(id: String, output_type: OutputType) -> Self {
        let (width, height) = default_dimensions(output_type);
        Self {
            id,
            output_type,
            enabled: true,
            language: DEFAULT_LANGUAGE.to_string(),
            width,
            height,
            formats: DEFAULT_FORMATS.iter().copied().collect(),
            generate_print: output_type == OutputType::Poster,
        }
    }

    /// Whether print variants will actually be requested for this spec.
    pub fn wants_print(&self) -> bool {
        self.output_type == OutputType::Poster && self.generate_print
    }
}

/// Settings applied to every output of a generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalSettings {
    pub auto_alt_text: bool,
    pub contrast_check: bool,
    pub brand_guidelines: bool,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            auto_alt_text: true,
            contrast_check: true,
            brand_guidelines: false,
        }
    }
}
