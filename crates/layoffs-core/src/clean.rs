//! The silver stage: type coercion and normalisation of raw rows.
//!
//! Coercion never fails. A value that cannot be read as a number or a date
//! becomes `None`; the `known_*` flags record which measures survived.

use std::path::Path;

use chrono::{DateTime, Datelike as _, NaiveDate, NaiveDateTime};

use crate::{
  Result, dataset,
  record::{CleanRecord, RawRecord},
};

/// Replacement for missing `additional_notes`.
pub const MISSING_NOTES: &str = "None";

/// Date layouts accepted in `reported_date`, tried in order. Two-digit
/// years (`%y`) come last so a four-digit year always wins.
const DATE_FORMATS: &[&str] = &[
  "%Y-%m-%d",
  "%Y/%m/%d",
  "%m/%d/%Y",
  "%d-%b-%Y",
  "%m/%d/%y",
  "%d-%b-%y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Counts gathered while cleaning a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanSummary {
  pub rows:                  usize,
  pub unknown_total_layoffs: usize,
  pub unknown_percentages:   usize,
  /// Rows whose `reported_date` was present but could not be parsed.
  pub unparsed_dates:        usize,
}

impl CleanSummary {
  fn observe(&mut self, had_date: bool, clean: &CleanRecord) {
    self.rows += 1;
    if !clean.known_total_layoffs {
      self.unknown_total_layoffs += 1;
    }
    if !clean.known_impacted_workforce_percentage {
      self.unknown_percentages += 1;
    }
    if had_date && clean.reported_date.is_none() {
      self.unparsed_dates += 1;
    }
  }
}

/// Parse a measure, treating anything that is not a finite number as
/// unknown.
pub fn coerce_number(value: Option<&str>) -> Option<f64> {
  value?
    .trim()
    .parse::<f64>()
    .ok()
    .filter(|v| v.is_finite())
}

/// Parse a calendar date; time-of-day and offsets are discarded.
pub fn coerce_date(value: Option<&str>) -> Option<NaiveDate> {
  let value = value?.trim();

  DATE_FORMATS
    .iter()
    .filter_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
    .find(has_full_year)
    .or_else(|| {
      DATETIME_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.date())
        .find(has_full_year)
    })
    .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

/// `%Y` also accepts one to three digits, so `1/5/23` would otherwise parse
/// as year 1 under `%Y/%m/%d`.
fn has_full_year(date: &NaiveDate) -> bool { (1000..=9999).contains(&date.year()) }

/// Lower-case and trim an industry label. Nothing else is touched.
pub fn normalize_industry(value: &str) -> String { value.to_lowercase().trim().to_owned() }

/// Clean a single row.
pub fn clean_record(raw: RawRecord) -> CleanRecord {
  let total_layoffs = coerce_number(raw.total_layoffs.as_deref());
  let impacted_workforce_percentage =
    coerce_number(raw.impacted_workforce_percentage.as_deref());

  CleanRecord {
    reported_date: coerce_date(raw.reported_date.as_deref()),
    industry: raw.industry.as_deref().map(normalize_industry),
    additional_notes: raw
      .additional_notes
      .unwrap_or_else(|| MISSING_NOTES.to_owned()),
    known_total_layoffs: total_layoffs.is_some(),
    known_impacted_workforce_percentage: impacted_workforce_percentage.is_some(),
    total_layoffs,
    impacted_workforce_percentage,
    company: raw.company,
    status: raw.status,
    sources: raw.sources,
    headquarter_location: raw.headquarter_location,
  }
}

/// Clean every row, preserving order and count.
pub fn clean_records(raws: Vec<RawRecord>) -> (Vec<CleanRecord>, CleanSummary) {
  let mut summary = CleanSummary::default();
  let cleaned = raws
    .into_iter()
    .map(|raw| {
      let had_date = raw.reported_date.is_some();
      let clean = clean_record(raw);
      summary.observe(had_date, &clean);
      clean
    })
    .collect();
  (cleaned, summary)
}

/// Read a bronze file, clean it and write the silver file.
pub fn clean_file(input: &Path, output: &Path) -> Result<CleanSummary> {
  let raws = dataset::read_raw(input)?;
  let (cleaned, summary) = clean_records(raws);
  dataset::write_silver(output, &cleaned)?;

  tracing::debug!(
    rows = summary.rows,
    unknown_total_layoffs = summary.unknown_total_layoffs,
    unknown_percentages = summary.unknown_percentages,
    unparsed_dates = summary.unparsed_dates,
    "cleaned {}",
    input.display()
  );
  Ok(summary)
}
