//! Promogen CLI: generate marketing assets from a product image.
//!
//! Set PROMOGEN_API_URL (or API_URL) and optionally PROMOGEN_API_KEY (sent as X-API-Key).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand, ValueEnum};
use promogen_api_client::ApiClient;
use promogen_cli::{
    build_registry, init_tracing, render_asset_table, upload_image, user_error, AssetRow,
    OutputArg,
};
use promogen_core::models::{AssetResult, GlobalSettings};
use promogen_core::validation::is_image_media_type;
use promogen_core::{ClientConfig, ErrorMetadata, GenerationError};
use promogen_jobs::session::media_type_for;
use promogen_jobs::{DirectorySink, JobController, JobPhase, Materializer, UploadSession};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "promogen", about = "Marketing asset generator CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ListFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a source image and print the job it was assigned
    Upload {
        image: PathBuf,
    },
    /// Upload an image, generate assets, wait for the job and save the results
    Generate {
        /// Source product image
        image: PathBuf,
        /// Output spec: type[:language[:WxH[:png,jpeg,pdf,svg]]]; repeatable
        #[arg(long = "output", short = 'o')]
        outputs: Vec<OutputArg>,
        /// Do not request A2/A3 print variants for posters
        #[arg(long)]
        no_print: bool,
        /// Skip alt text generation
        #[arg(long)]
        no_alt_text: bool,
        /// Skip the contrast check
        #[arg(long)]
        no_contrast_check: bool,
        /// Apply brand guidelines
        #[arg(long)]
        brand_guidelines: bool,
        /// Directory the generated assets are saved to
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Show the status of a generation job
    Status {
        job_id: String,
    },
    /// List the assets of a completed job
    Assets {
        job_id: String,
        #[arg(long, value_enum, default_value = "table")]
        format: ListFormat,
    },
    /// Save the assets of a completed job
    Download {
        job_id: String,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Generate alt text for an image
    Analyze {
        image: PathBuf,
    },
    /// Score the text/background contrast of an image
    Contrast {
        image: PathBuf,
    },
    /// Check the API is reachable
    Ping,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

async fn read_image(path: &Path) -> anyhow::Result<Vec<u8>> {
    let media_type = media_type_for(&path.to_string_lossy());
    if !is_image_media_type(&media_type) {
        return Err(user_error(GenerationError::InvalidFileType { media_type }));
    }
    tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

async fn save_assets(
    assets: &[AssetResult],
    out_dir: &Path,
    config: &ClientConfig,
) -> anyhow::Result<()> {
    let materializer = Materializer::new(Arc::new(DirectorySink::new(out_dir)))
        .with_stagger(config.save_stagger());
    let report = materializer.save_all(assets).await;

    for path in &report.saved {
        println!("saved {}", path.display());
    }
    for (id, err) in &report.failed {
        eprintln!("failed {}: {}", id, err.client_message());
    }
    if !report.is_complete() {
        return Err(anyhow!(
            "{} of {} assets could not be saved",
            report.failed.len(),
            assets.len()
        ));
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn generate(
    client: Arc<ApiClient>,
    config: &ClientConfig,
    image: PathBuf,
    outputs: Vec<OutputArg>,
    no_print: bool,
    settings: GlobalSettings,
    out_dir: PathBuf,
) -> anyhow::Result<()> {
    let registry = build_registry(&outputs, no_print)?;

    let mut session = UploadSession::new(client.clone());
    let upload = session.upload(&image).await.map_err(user_error)?;
    println!(
        "uploaded {} ({} bytes) as job {}",
        upload.file_name, upload.size_bytes, upload.job_id
    );

    let mut controller = JobController::new(client, config.timings());
    let mut updates = controller.subscribe();
    controller
        .generate(session.job_id(), &registry, settings)
        .map_err(user_error)?;

    let mut last_phase = JobPhase::Idle;
    let mut last_polls = 0;
    loop {
        let snapshot = updates.borrow_and_update().clone();
        if snapshot.phase != last_phase {
            println!("{}", snapshot.phase.as_str());
            last_phase = snapshot.phase;
        }
        if snapshot.polls != last_polls {
            tracing::debug!(polls = snapshot.polls, "Still generating");
            last_polls = snapshot.polls;
        }
        if !snapshot.phase.is_active() {
            break;
        }

        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                controller.cancel();
                return Err(anyhow!("Generation cancelled"));
            }
        }
    }

    let done = controller.snapshot();
    match done.phase {
        JobPhase::Completed => {
            let assets = controller.assets().snapshot();
            println!("{} asset(s) generated", assets.len());
            save_assets(&assets, &out_dir, config).await
        }
        _ => match done.error {
            Some(err) => Err(user_error(err)),
            None => Err(anyhow!("Generation ended in state {}", done.phase.as_str())),
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ClientConfig::from_env().context(
        "Invalid configuration. Check PROMOGEN_API_URL (or API_URL) and PROMOGEN_* timings",
    )?;
    let client = Arc::new(ApiClient::from_config(&config).context("Failed to create API client")?);

    let cli = Cli::parse();

    match cli.command {
        Commands::Upload { image } => {
            let job = upload_image(client, &image).await?;
            print_json(&job)?;
        }
        Commands::Generate {
            image,
            outputs,
            no_print,
            no_alt_text,
            no_contrast_check,
            brand_guidelines,
            out_dir,
        } => {
            let settings = GlobalSettings {
                auto_alt_text: !no_alt_text,
                contrast_check: !no_contrast_check,
                brand_guidelines,
            };
            generate(client, &config, image, outputs, no_print, settings, out_dir).await?;
        }
        Commands::Status { job_id } => {
            let response = client.job_status(&job_id).await?;
            print_json(&response)?;
        }
        Commands::Assets { job_id, format } => {
            let assets = client.job_assets(&job_id).await?;
            match format {
                ListFormat::Json => {
                    let rows: Vec<AssetRow> = assets.iter().map(AssetRow::from).collect();
                    print_json(&rows)?;
                }
                ListFormat::Table => print!("{}", render_asset_table(&assets)),
            }
        }
        Commands::Download { job_id, out_dir } => {
            let assets = client.job_assets(&job_id).await?;
            if assets.is_empty() {
                println!("job {} has no assets", job_id);
            } else {
                save_assets(&assets, &out_dir, &config).await?;
            }
        }
        Commands::Analyze { image } => {
            let bytes = read_image(&image).await?;
            let response = client.analyze_image(&bytes).await?;
            print_json(&response)?;
        }
        Commands::Contrast { image } => {
            let bytes = read_image(&image).await?;
            let response = client.check_contrast(&bytes).await?;
            print_json(&serde_json::json!({
                "contrast_score": response.contrast_score,
                "status": response.status().to_string(),
            }))?;
        }
        Commands::Ping => {
            let response = client.health().await?;
            print_json(&response)?;
        }
    }

    Ok(())
}
