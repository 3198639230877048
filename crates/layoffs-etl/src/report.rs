//! Rendering of the validation report for stdout.

use std::fmt::{self, Write as _};

use clap::ValueEnum;
use layoffs_core::validation::{Finding, OUTLIER_CEILING, ValidationReport};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
  /// Aligned text sections, one per check.
  #[default]
  Text,
  Json,
}

#[derive(Serialize)]
struct Tagged<'a> {
  severity: &'static str,
  #[serde(flatten)]
  finding:  &'a Finding,
}

#[derive(Serialize)]
struct JsonReport<'a> {
  raw_rows: usize,
  checks:   &'a ValidationReport,
  findings: Vec<Tagged<'a>>,
}

fn severity(finding: &Finding) -> &'static str {
  if finding.is_critical() { "critical" } else { "advisory" }
}

pub fn render(
  format: ReportFormat,
  report: &ValidationReport,
  raw_rows: usize,
  findings: &[Finding],
) -> anyhow::Result<String> {
  Ok(match format {
    ReportFormat::Text => render_text(report, raw_rows, findings)?,
    ReportFormat::Json => render_json(report, raw_rows, findings)?,
  })
}

pub fn render_json(
  report: &ValidationReport,
  raw_rows: usize,
  findings: &[Finding],
) -> serde_json::Result<String> {
  let json = JsonReport {
    raw_rows,
    checks: report,
    findings: findings
      .iter()
      .map(|finding| Tagged { severity: severity(finding), finding })
      .collect(),
  };
  serde_json::to_string_pretty(&json)
}

pub fn render_text(
  report: &ValidationReport,
  raw_rows: usize,
  findings: &[Finding],
) -> Result<String, fmt::Error> {
  let mut out = String::new();
  write_text(&mut out, report, raw_rows, findings)?;
  Ok(out)
}

fn write_text(
  out: &mut String,
  report: &ValidationReport,
  raw_rows: usize,
  findings: &[Finding],
) -> fmt::Result {
  writeln!(out, "Validation 1: null surrogate keys")?;
  for (table, count) in report.null_keys.by_table() {
    writeln!(out, "  {table:<14} {count}")?;
  }

  writeln!(out, "\nValidation 2: fact row count")?;
  writeln!(out, "  {:<14} {}", "fact_layoffs", report.fact_count)?;
  writeln!(out, "  {:<14} {raw_rows}", "raw records")?;

  writeln!(out, "\nValidation 3: distinct keys (fact / dimension)")?;
  for c in &report.cardinality {
    writeln!(
      out,
      "  {:<14} {} / {}",
      c.dimension, c.fact_distinct, c.dimension_distinct
    )?;
  }

  writeln!(out, "\nValidation 4: total_layoffs above {OUTLIER_CEILING} or negative")?;
  if report.outliers.is_empty() {
    writeln!(out, "  none")?;
  }
  for o in &report.outliers {
    writeln!(out, "  company_ID {:<6} {}", o.company_id, o.total_layoffs)?;
  }

  writeln!(out, "\nValidation 5: companies with repeated events")?;
  if report.repeated_companies.is_empty() {
    writeln!(out, "  none")?;
  }
  for e in &report.repeated_companies {
    writeln!(
      out,
      "  {:<6} {:<24} {:<16} {:<20} {}",
      e.company_id,
      e.company.as_deref().unwrap_or("-"),
      e.industry.as_deref().unwrap_or("-"),
      e.headquarter_location.as_deref().unwrap_or("-"),
      e.date.map(|d| d.to_string()).unwrap_or_else(|| "-".into()),
    )?;
  }

  writeln!(out, "\nFindings")?;
  if findings.is_empty() {
    writeln!(out, "  none")?;
  }
  for finding in findings {
    writeln!(out, "  [{}] {finding}", severity(finding))?;
  }
  Ok(())
}
