//! `layoffs` batch binary.
//!
//! Reads `layoffs.toml` (or the path given with `--config`), runs the
//! pipeline once and prints the validation report to stdout. Diagnostics go
//! to stderr.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use layoffs_etl::{
  PipelineConfig,
  pipeline,
  report::{self, ReportFormat},
  settings::Overrides,
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Tech layoffs ETL: CSV to SQLite star schema")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "layoffs.toml")]
  config: PathBuf,

  /// Raw input CSV; overrides `input_path`.
  #[arg(short, long)]
  input: Option<PathBuf>,

  /// SQLite database file; overrides `database.path`.
  #[arg(short, long)]
  database: Option<PathBuf>,

  /// Exit with an error if validation finds a critical problem.
  #[arg(long)]
  fail_on_critical: bool,

  /// How to print the validation report.
  #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
  format: ReportFormat,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let overrides = Overrides {
    input:            cli.input,
    database:         cli.database,
    fail_on_critical: cli.fail_on_critical,
  };
  let config = PipelineConfig::load(&cli.config, &overrides)
    .with_context(|| format!("invalid configuration ({})", cli.config.display()))?;

  let summary = pipeline::run(&config).await?;

  let rendered = report::render(
    cli.format,
    &summary.report,
    summary.ingest.rows,
    &summary.findings,
  )
  .context("failed to render validation report")?;
  println!("{rendered}");

  summary.enforce(config.validation.policy)
}
