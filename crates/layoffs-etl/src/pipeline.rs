//! The end-to-end run: ingest → clean → star schema → load → validate.

use std::fs;

use anyhow::{Context as _, bail};
use layoffs_core::{
  clean::{CleanSummary, clean_file},
  ingest::{IngestSummary, ingest_csv},
  star::{StarSchema, star_schema_from_file},
  validation::{Finding, ValidationPolicy, ValidationReport},
  warehouse::Warehouse,
};
use layoffs_store_sqlite::SqliteWarehouse;

use crate::{PipelineConfig, progress::ProgressLog};

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
  pub ingest:   IngestSummary,
  pub clean:    CleanSummary,
  pub report:   ValidationReport,
  pub findings: Vec<Finding>,
}

impl RunSummary {
  /// Fail if `policy` rejects the run's findings. Call after the report has
  /// been emitted.
  pub fn enforce(&self, policy: ValidationPolicy) -> anyhow::Result<()> {
    if policy.rejects(&self.findings) {
      let critical = self.findings.iter().filter(|f| f.is_critical()).count();
      bail!("validation produced {critical} critical finding(s)");
    }
    Ok(())
  }
}

/// Run every stage against the paths in `config`, stopping at the first
/// error. Validation findings never fail the run here; see
/// [`RunSummary::enforce`].
pub async fn run(config: &PipelineConfig) -> anyhow::Result<RunSummary> {
  let log = ProgressLog::reset(&config.log_path)
    .with_context(|| format!("failed to reset progress log {}", config.log_path.display()))?;
  log.record("ETL process started")?;

  let ingest = ingest_csv(&config.input_path, &config.bronze_path)
    .context("bronze stage failed")?;
  log.record("Bronze layer complete")?;

  let clean = clean_file(&config.bronze_path, &config.silver_path)
    .context("silver stage failed")?;
  if clean.unparsed_dates > 0 {
    tracing::warn!(rows = clean.unparsed_dates, "reported_date could not be parsed");
  }
  log.record("Silver layer complete")?;

  let schema = star_schema_from_file(&config.silver_path).context("gold stage failed")?;
  log.record("Gold layer complete")?;

  if let Some(parent) = config.database.path.parent().filter(|p| !p.as_os_str().is_empty()) {
    fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {}", parent.display()))?;
  }
  let warehouse = SqliteWarehouse::open(&config.database.path)
    .await
    .with_context(|| format!("failed to open database {}", config.database.path.display()))?;
  log.record("Connection to database established")?;

  let report = publish(&warehouse, schema, &log).await?;
  let findings = report.findings(Some(ingest.rows));
  for finding in &findings {
    if finding.is_critical() {
      tracing::warn!("{finding}");
    }
  }

  Ok(RunSummary { ingest, clean, report, findings })
}

/// Load the star schema into `warehouse` and run the integrity checks.
async fn publish<W: Warehouse>(
  warehouse: &W,
  schema: StarSchema,
  log: &ProgressLog,
) -> anyhow::Result<ValidationReport> {
  warehouse
    .load(schema.into_tables())
    .await
    .context("failed to load star schema")?;
  log.record("Data successfully loaded into the database")?;

  let report = warehouse.validate().await.context("validation queries failed")?;
  log.record("Data successfully validated")?;
  Ok(report)
}
