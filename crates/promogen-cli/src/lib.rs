use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use promogen_api_client::ApiClient;
use promogen_core::models::{AssetFormat, AssetKind, AssetResult, OutputType, UploadJob};
use promogen_core::{ErrorMetadata, GenerationError, LogLevel, OutputSpecRegistry, SpecField};
use promogen_jobs::UploadSession;
use serde::Serialize;

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// One `--output` argument: `type[:language[:WxH[:fmt,fmt...]]]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArg {
    pub output_type: OutputType,
    pub language: Option<String>,
    pub size: Option<(u32, u32)>,
    pub formats: Option<BTreeSet<AssetFormat>>,
}

impl std::str::FromStr for OutputArg {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let output_type = parts
            .next()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| anyhow!("empty output spec"))?
            .parse::<OutputType>()?;

        let language = parts
            .next()
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        let size = match parts.next().filter(|p| !p.is_empty()) {
            Some(raw) => Some(parse_size(raw)?),
            None => None,
        };

        let formats = match parts.next().filter(|p| !p.is_empty()) {
            Some(raw) => Some(
                raw.split(',')
                    .map(|f| f.trim().parse::<AssetFormat>())
                    .collect::<Result<BTreeSet<_>, _>>()?,
            ),
            None => None,
        };

        if parts.next().is_some() {
            return Err(anyhow!("too many ':' sections in output spec {}", s));
        }

        Ok(Self {
            output_type,
            language,
            size,
            formats,
        })
    }
}

fn parse_size(raw: &str) -> anyhow::Result<(u32, u32)> {
    let (w, h) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| anyhow!("size must look like 1080x1350, got {}", raw))?;
    let width = w.trim().parse().with_context(|| format!("invalid width {}", w))?;
    let height = h.trim().parse().with_context(|| format!("invalid height {}", h))?;
    Ok((width, height))
}

/// Build the registry the generate command submits. With no `--output` the
/// registry keeps its single default poster.
pub fn build_registry(outputs: &[OutputArg], no_print: bool) -> anyhow::Result<OutputSpecRegistry> {
    let mut registry = OutputSpecRegistry::new();
    let placeholder = registry
        .specs()
        .first()
        .map(|s| s.id.clone())
        .ok_or_else(|| anyhow!("registry starts empty"))?;

    if outputs.is_empty() {
        if no_print {
            registry.update(&placeholder, SpecField::GeneratePrint(false))?;
        }
        return Ok(registry);
    }

    for arg in outputs {
        let id = registry.add(arg.output_type).id.clone();
        if let Some(language) = &arg.language {
            registry.update(&id, SpecField::Language(language.clone()))?;
        }
        if let Some((width, height)) = arg.size {
            registry.update(&id, SpecField::Width(width))?;
            registry.update(&id, SpecField::Height(height))?;
        }
        if let Some(wanted) = &arg.formats {
            let current = registry
                .get(&id)
                .map(|s| s.formats.clone())
                .unwrap_or_default();
            for format in current.symmetric_difference(wanted) {
                registry.toggle_format(&id, *format)?;
            }
        }
        if no_print {
            registry.update(&id, SpecField::GeneratePrint(false))?;
        }
    }
    registry.remove(&placeholder)?;
    Ok(registry)
}

/// Asset descriptor without its payload, for listings.
#[derive(Debug, Serialize)]
pub struct AssetRow {
    pub id: String,
    pub output_type: String,
    pub kind: &'static str,
    pub language: String,
    pub width: u32,
    pub height: u32,
    pub format: AssetFormat,
    pub bytes: usize,
    pub alt_text: Option<String>,
    pub contrast_score: Option<f64>,
    pub file_name: String,
}

impl From<&AssetResult> for AssetRow {
    fn from(asset: &AssetResult) -> Self {
        let kind = match asset.kind() {
            AssetKind::Output(_) => "output",
            AssetKind::PosterPrint(_) => "print",
            AssetKind::Other(_) => "other",
        };
        Self {
            id: asset.id.clone(),
            output_type: asset.output_type.clone(),
            kind,
            language: asset.language.clone(),
            width: asset.width,
            height: asset.height,
            format: asset.format,
            bytes: asset.payload_len(),
            alt_text: asset.alt_text.clone(),
            contrast_score: asset.contrast_score,
            file_name: asset.file_name(),
        }
    }
}

pub fn render_asset_table(assets: &[AssetResult]) -> String {
    let mut out = format!(
        "{:<20} {:<18} {:<10} {:>11} {:<5} {:>10} {:>8}  {}\n",
        "ID", "TYPE", "LANGUAGE", "SIZE", "FMT", "BYTES", "CONTRAST", "ALT TEXT"
    );
    for asset in assets {
        let row = AssetRow::from(asset);
        let contrast = row
            .contrast_score
            .map(|s| format!("{:.1}", s))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:<20} {:<18} {:<10} {:>11} {:<5} {:>10} {:>8}  {}\n",
            truncate_string(&row.id, 20),
            truncate_string(&row.output_type, 18),
            truncate_string(&row.language, 10),
            format!("{}x{}", row.width, row.height),
            row.format.to_string(),
            row.bytes,
            contrast,
            truncate_string(row.alt_text.as_deref().unwrap_or("-"), 40),
        ));
    }
    out.push_str(&format!("{} asset(s)\n", assets.len()));
    out
}

/// Present a lifecycle error the way it is shown to users, logging it at the
/// level the error asks for.
pub fn user_error(err: GenerationError) -> anyhow::Error {
    let code = err.error_code();
    match err.log_level() {
        LogLevel::Debug => tracing::debug!(code, error = %err, "Generation error"),
        LogLevel::Warn => tracing::warn!(code, error = %err, "Generation error"),
        LogLevel::Error => tracing::error!(code, error = %err, "Generation error"),
    }
    anyhow!(err.client_message())
}

/// Upload a source image and return the job the backend created for it.
pub async fn upload_image(client: Arc<ApiClient>, path: &Path) -> anyhow::Result<UploadJob> {
    let mut session = UploadSession::new(client);
    let job = session.upload(path).await.map_err(user_error)?;
    Ok(job.clone())
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
