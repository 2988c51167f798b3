//! Turns asset descriptors into saved files.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use promogen_core::constants::SAVE_STAGGER_MS;
use promogen_core::models::AssetResult;
use promogen_core::GenerationError;

/// Destination for decoded asset payloads.
#[async_trait]
pub trait AssetSink: Send + Sync {
    /// Persist `bytes` under `file_name`, returning where it ended up.
    async fn save(&self, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf>;
}

/// Writes into a directory. An existing file is never overwritten; the name gets
/// a `-1`, `-2`, ... suffix before the extension instead.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn free_path(&self, file_name: &str) -> io::Result<PathBuf> {
        let candidate = self.dir.join(file_name);
        if !tokio::fs::try_exists(&candidate).await? {
            return Ok(candidate);
        }

        let (stem, ext) = match file_name.rsplit_once('.') {
            Some((stem, ext)) => (stem, Some(ext)),
            None => (file_name, None),
        };
        let mut n = 1u32;
        loop {
            let name = match ext {
                Some(ext) => format!("{}-{}.{}", stem, n, ext),
                None => format!("{}-{}", stem, n),
            };
            let path = self.dir.join(name);
            if !tokio::fs::try_exists(&path).await? {
                return Ok(path);
            }
            n += 1;
        }
    }
}

#[async_trait]
impl AssetSink for DirectorySink {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.free_path(file_name).await?;
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }
}

/// Outcome of a batch save. Failures do not stop the batch.
#[derive(Debug, Default)]
pub struct SaveReport {
    pub saved: Vec<PathBuf>,
    /// Asset id and the reason it was not saved.
    pub failed: Vec<(String, GenerationError)>,
}

impl SaveReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct Materializer {
    sink: Arc<dyn AssetSink>,
    stagger: Duration,
}

impl Materializer {
    pub fn new(sink: Arc<dyn AssetSink>) -> Self {
        Self {
            sink,
            stagger: Duration::from_millis(SAVE_STAGGER_MS),
        }
    }

    pub fn with_stagger(mut self, stagger: Duration) -> Self {
        self.stagger = stagger;
        self
    }

    /// Decode one asset and hand it to the sink under its templated file name.
    pub async fn save_one(&self, asset: &AssetResult) -> Result<PathBuf, GenerationError> {
        let bytes = STANDARD.decode(asset.data.trim()).map_err(|e| {
            GenerationError::SaveFailed(format!(
                "asset {} has invalid base64 data: {}",
                asset.id, e
            ))
        })?;

        let file_name = asset.file_name();
        let path = self
            .sink
            .save(&file_name, &bytes)
            .await
            .map_err(|e| GenerationError::SaveFailed(format!("{}: {}", file_name, e)))?;

        tracing::debug!(
            asset_id = %asset.id,
            path = %path.display(),
            bytes = bytes.len(),
            "Asset saved"
        );
        Ok(path)
    }

    /// Save every asset in order, waiting the stagger delay between items.
    #[tracing::instrument(skip(self, assets), fields(count = assets.len()))]
    pub async fn save_all(&self, assets: &[AssetResult]) -> SaveReport {
        let mut report = SaveReport::default();

        for (i, asset) in assets.iter().enumerate() {
            if i > 0 && !self.stagger.is_zero() {
                tokio::time::sleep(self.stagger).await;
            }
            match self.save_one(asset).await {
                Ok(path) => report.saved.push(path),
                Err(e) => {
                    tracing::warn!(asset_id = %asset.id, error = %e, "Failed to save asset");
                    report.failed.push((asset.id.clone(), e));
                }
            }
        }

        tracing::info!(
            saved = report.saved.len(),
            failed = report.failed.len(),
            "Batch save finished"
        );
        report
    }
}
