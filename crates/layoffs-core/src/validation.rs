//! Post-load integrity report.
//!
//! The report holds the raw results of the five warehouse checks.
//! [`ValidationReport::findings`] turns them into [`Finding`]s; whether a
//! critical finding stops the run is decided by [`ValidationPolicy`].

use std::{collections::BTreeMap, fmt};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::star::{DIM_COMPANY, DIM_DATE, DIM_INDUSTRY, DIM_LOCATION};

/// Layoff counts above this are flagged for manual review.
pub const OUTLIER_CEILING: f64 = 50_000.0;

/// Null surrogate keys found in each dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NullKeyCounts {
  pub company:  i64,
  pub industry: i64,
  pub location: i64,
  pub date:     i64,
}

impl NullKeyCounts {
  pub fn by_table(&self) -> [(&'static str, i64); 4] {
    [
      (DIM_COMPANY, self.company),
      (DIM_INDUSTRY, self.industry),
      (DIM_LOCATION, self.location),
      (DIM_DATE, self.date),
    ]
  }
}

/// Distinct foreign keys used by the fact table vs keys in the dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyCardinality {
  pub dimension:          &'static str,
  pub fact_distinct:      i64,
  pub dimension_distinct: i64,
}

impl KeyCardinality {
  /// The fact table cannot reference more keys than the dimension holds.
  pub fn is_consistent(&self) -> bool { self.fact_distinct <= self.dimension_distinct }
}

/// A fact row whose `total_layoffs` is implausibly high or negative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outlier {
  pub company_id:    i64,
  pub total_layoffs: f64,
}

/// One event of a company that appears in several fact rows, joined back to
/// its descriptive attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyEvent {
  pub company_id:           i64,
  pub company:              Option<String>,
  pub industry:             Option<String>,
  pub headquarter_location: Option<String>,
  pub date:                 Option<NaiveDate>,
}

/// Results of the five post-load checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
  pub null_keys:          NullKeyCounts,
  pub fact_count:         i64,
  pub cardinality:        Vec<KeyCardinality>,
  pub outliers:           Vec<Outlier>,
  /// Ordered by company name.
  pub repeated_companies: Vec<CompanyEvent>,
}

/// A data-quality observation derived from a [`ValidationReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
  NullKeys { table: &'static str, count: i64 },
  RowCountMismatch { expected: usize, actual: i64 },
  DanglingKeys { dimension: &'static str, fact_distinct: i64, dimension_distinct: i64 },
  Outliers { count: usize },
  /// A company whose repeated events disagree on industry or location.
  AttributeDrift { company_id: i64, company: Option<String> },
}

impl Finding {
  /// Critical findings point at a broken load rather than odd source data.
  pub fn is_critical(&self) -> bool {
    matches!(
      self,
      Self::NullKeys { .. } | Self::RowCountMismatch { .. } | Self::DanglingKeys { .. }
    )
  }
}

impl fmt::Display for Finding {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::NullKeys { table, count } => write!(f, "{table} has {count} null surrogate key(s)"),
      Self::RowCountMismatch { expected, actual } => {
        write!(f, "fact_layoffs has {actual} row(s) but the raw data has {expected}")
      }
      Self::DanglingKeys { dimension, fact_distinct, dimension_distinct } => write!(
        f,
        "fact_layoffs references {fact_distinct} distinct {dimension} key(s) but the \
         dimension holds {dimension_distinct}"
      ),
      Self::Outliers { count } => write!(
        f,
        "{count} fact row(s) with total_layoffs above {OUTLIER_CEILING} or negative"
      ),
      Self::AttributeDrift { company_id, company } => write!(
        f,
        "company {} ({company_id}) has inconsistent industry or location",
        company.as_deref().unwrap_or("<unknown>")
      ),
    }
  }
}

impl ValidationReport {
  /// Classify the report. `expected_rows` is the raw record count, when
  /// known, and is compared against the fact table size.
  pub fn findings(&self, expected_rows: Option<usize>) -> Vec<Finding> {
    let mut findings: Vec<Finding> = self
      .null_keys
      .by_table()
      .into_iter()
      .filter(|(_, count)| *count > 0)
      .map(|(table, count)| Finding::NullKeys { table, count })
      .collect();

    if let Some(expected) = expected_rows
      && i64::try_from(expected).ok() != Some(self.fact_count)
    {
      findings.push(Finding::RowCountMismatch { expected, actual: self.fact_count });
    }

    findings.extend(self.cardinality.iter().filter(|c| !c.is_consistent()).map(|c| {
      Finding::DanglingKeys {
        dimension:          c.dimension,
        fact_distinct:      c.fact_distinct,
        dimension_distinct: c.dimension_distinct,
      }
    }));

    if !self.outliers.is_empty() {
      findings.push(Finding::Outliers { count: self.outliers.len() });
    }

    findings.extend(self.drifting_companies());
    findings
  }

  fn drifting_companies(&self) -> impl Iterator<Item = Finding> + '_ {
    type Seen<'a> = (&'a Option<String>, &'a Option<String>);
    let mut by_company: BTreeMap<i64, (&Option<String>, Vec<Seen<'_>>)> = BTreeMap::new();
    for event in &self.repeated_companies {
      let entry = by_company
        .entry(event.company_id)
        .or_insert_with(|| (&event.company, Vec::new()));
      let seen = (&event.industry, &event.headquarter_location);
      if !entry.1.contains(&seen) {
        entry.1.push(seen);
      }
    }

    by_company
      .into_iter()
      .filter(|(_, (_, seen))| seen.len() > 1)
      .map(|(company_id, (company, _))| Finding::AttributeDrift {
        company_id,
        company: company.clone(),
      })
  }
}

/// What to do when validation produces a critical finding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
  /// Report everything, never fail.
  #[default]
  Report,
  /// Fail the run after reporting if any finding is critical.
  FailOnCritical,
}

impl ValidationPolicy {
  pub fn rejects(self, findings: &[Finding]) -> bool {
    self == Self::FailOnCritical && findings.iter().any(Finding::is_critical)
  }
}
