//! chunkdrop CLI: check files against the upload policy and upload them in chunks.
//!
//! Endpoint, chunk size and file concurrency come from CHUNKDROP_* variables (or
//! `.env`); flags override them.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use chunkdrop_api_client::HttpChunkTransport;
use chunkdrop_cli::{
    all_complete, init_tracing, per_chunk_targets, FileReport, PolicyRow, ValidationReport,
};
use chunkdrop_core::config::{FileConcurrency, UploaderConfig};
use chunkdrop_core::constants::MIB;
use chunkdrop_core::models::FileDescriptor;
use chunkdrop_core::policy::policy_table;
use chunkdrop_processing::batch::BatchUploader;
use chunkdrop_processing::local::LocalChunkStore;
use chunkdrop_processing::traits::TracingProgress;
use chunkdrop_processing::uploader::{ChunkedUploader, UploadOutcome};
use chunkdrop_processing::validator::MediaValidator;
use clap::{Parser, Subcommand};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "chunkdrop", about = "Validate and upload files in chunks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the upload policy table
    Policy,
    /// Check files against the upload policy without sending anything
    Validate {
        /// Files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Declared media type for every file (inferred from the extension if omitted)
        #[arg(long = "type")]
        declared_type: Option<String>,
    },
    /// Validate and upload files chunk by chunk
    Upload {
        /// Files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Declared media type for every file (inferred from the extension if omitted)
        #[arg(long = "type")]
        declared_type: Option<String>,
        /// Upload endpoint (overrides CHUNKDROP_ENDPOINT)
        #[arg(long)]
        endpoint: Option<String>,
        /// One target URL per chunk, in order, for a single file; replaces --endpoint
        #[arg(long = "chunk-url")]
        chunk_urls: Vec<String>,
        /// Chunk size in MiB (overrides CHUNKDROP_CHUNK_SIZE_MB)
        #[arg(long)]
        chunk_size_mb: Option<u64>,
        /// sequential, unbounded or a number (overrides CHUNKDROP_FILE_CONCURRENCY)
        #[arg(long)]
        concurrency: Option<FileConcurrency>,
    },
    /// Split a file into chunk files on disk
    Split {
        /// File to split
        file: PathBuf,
        /// Directory receiving the chunk files
        #[arg(long)]
        out: PathBuf,
        /// Declared media type (inferred from the extension if omitted)
        #[arg(long = "type")]
        declared_type: Option<String>,
        /// Chunk size in MiB (overrides CHUNKDROP_CHUNK_SIZE_MB)
        #[arg(long)]
        chunk_size_mb: Option<u64>,
        /// Reassemble the chunks and compare them with the original
        #[arg(long)]
        verify: bool,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

async fn load_files(
    paths: &[PathBuf],
    declared_type: Option<&str>,
) -> anyhow::Result<Vec<FileDescriptor>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let file = FileDescriptor::from_path(path, declared_type)
            .await
            .with_context(|| format!("Failed to open {}", path.display()))?;
        files.push(file);
    }
    Ok(files)
}

fn load_config(
    endpoint: Option<String>,
    chunk_size_mb: Option<u64>,
    concurrency: Option<FileConcurrency>,
) -> anyhow::Result<UploaderConfig> {
    let mut config = UploaderConfig::from_env().context("Failed to load configuration")?;

    if let Some(endpoint) = endpoint {
        config.endpoint = endpoint;
    }
    if let Some(mb) = chunk_size_mb {
        config.chunk_size_bytes = mb.saturating_mul(MIB);
    }
    if let Some(concurrency) = concurrency {
        config.file_concurrency = concurrency;
    }

    config.validate()?;
    Ok(config)
}

async fn validate(paths: &[PathBuf], declared_type: Option<&str>) -> anyhow::Result<()> {
    let validator = MediaValidator::new();
    let files = load_files(paths, declared_type).await?;

    let reports: Vec<ValidationReport> = files
        .iter()
        .map(|file| ValidationReport::new(file, &validator.validate(file)))
        .collect();
    print_json(&reports)?;

    let rejected = reports.iter().filter(|r| !r.accepted).count();
    if rejected > 0 {
        bail!("{} of {} files rejected", rejected, reports.len());
    }
    Ok(())
}

async fn upload(
    paths: &[PathBuf],
    declared_type: Option<&str>,
    config: &UploaderConfig,
    chunk_urls: Vec<String>,
) -> anyhow::Result<()> {
    let files = load_files(paths, declared_type).await?;

    let transport = if chunk_urls.is_empty() {
        HttpChunkTransport::from_config(config)?
    } else {
        HttpChunkTransport::new(
            Arc::new(per_chunk_targets(&files, chunk_urls)?),
            Duration::from_secs(config.http_timeout_secs),
        )?
    };
    let uploader = ChunkedUploader::from_config(config)?;
    let batch = BatchUploader::new(uploader, config.file_concurrency);

    let outcomes = batch.upload_all(&files, &transport, &TracingProgress).await;

    let reports: Vec<FileReport> = outcomes.iter().map(FileReport::from).collect();
    print_json(&reports)?;

    if !all_complete(&outcomes) {
        let unfinished = reports.iter().filter(|r| !r.is_success()).count();
        bail!("{} of {} files were not uploaded", unfinished, reports.len());
    }
    Ok(())
}

async fn split(
    path: &Path,
    out: &Path,
    declared_type: Option<&str>,
    chunk_size_bytes: u64,
    verify: bool,
) -> anyhow::Result<()> {
    let store = LocalChunkStore::new(out).await?;
    let file = FileDescriptor::from_path(path, declared_type)
        .await
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let uploader = ChunkedUploader::new(chunk_size_bytes)?;

    let outcome = uploader.upload(&file, &store, &TracingProgress).await;
    print_json(&FileReport::new(&file.name, &outcome))?;

    let session = match outcome {
        UploadOutcome::Uploaded(session) => session,
        UploadOutcome::Rejected(reason) => bail!("{} rejected: {}", file.name, reason),
        UploadOutcome::Failed { error, .. } => bail!("{} failed: {}", file.name, error),
    };

    if verify {
        let assembled = store.assemble(&file.name, session.total_chunks()).await?;
        let original = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if assembled != original {
            bail!("Reassembled chunks of {} differ from the original", file.name);
        }
        tracing::info!(
            file_name = %file.name,
            total_chunks = session.total_chunks(),
            "Chunks verified against original"
        );
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Policy => {
            let rows: Vec<PolicyRow> = policy_table().iter().map(PolicyRow::from).collect();
            print_json(&rows)?;
        }
        Commands::Validate {
            files,
            declared_type,
        } => {
            validate(&files, declared_type.as_deref()).await?;
        }
        Commands::Upload {
            files,
            declared_type,
            endpoint,
            chunk_urls,
            chunk_size_mb,
            concurrency,
        } => {
            let config = load_config(endpoint, chunk_size_mb, concurrency)?;
            upload(&files, declared_type.as_deref(), &config, chunk_urls).await?;
        }
        Commands::Split {
            file,
            out,
            declared_type,
            chunk_size_mb,
            verify,
        } => {
            let config = load_config(None, chunk_size_mb, None)?;
            split(
                &file,
                &out,
                declared_type.as_deref(),
                config.chunk_size_bytes,
                verify,
            )
            .await?;
        }
    }

    Ok(())
}
