use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use rollcall_core::{ErrorReport, Pipeline, PipelineConfig};
use std::fs;
use std::path::PathBuf;

mod formatter;

#[derive(Parser)]
#[command(name = "rollcall")]
#[command(
    about = "Attendance ingestion: locate, download, resolve and classify the latest workbook",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Local workbook to ingest instead of fetching through the drive index
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON report envelope
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = if let Some(config_path) = &cli.config {
        PipelineConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        // Try to load the default config from the current directory if it exists
        let default_config_path = PathBuf::from("rollcall.toml");
        if default_config_path.exists() {
            PipelineConfig::from_file(&default_config_path).with_context(|| {
                format!(
                    "Failed to load config from {}",
                    default_config_path.display()
                )
            })?
        } else {
            PipelineConfig::default()
        }
    };

    if cli.file.is_none() && config.index_url.is_empty() {
        bail!("no index_url configured; pass a workbook FILE or set index_url in rollcall.toml");
    }

    let pipeline = Pipeline::new(config)?;

    let result = match &cli.file {
        Some(path) => {
            let bytes = fs::read(path)
                .with_context(|| format!("Failed to read workbook: {}", path.display()))?;
            pipeline.ingest_bytes(&bytes)
        }
        None => pipeline.run(),
    };

    match result {
        Ok(report) => {
            match cli.format {
                OutputFormat::Human => formatter::print_human(&report),
                OutputFormat::Json => formatter::print_json(&report)?,
            }
            Ok(())
        }
        Err(err) => {
            let payload = ErrorReport::from_error(&err);
            match cli.format {
                OutputFormat::Human => formatter::print_error_human(&payload),
                OutputFormat::Json => formatter::print_error_json(&payload)?,
            }
            std::process::exit(1);
        }
    }
}
