//! Conversions between core types and SQLite column values.
//!
//! Dates are stored as `YYYY-MM-DD` text.

use chrono::NaiveDate;
use layoffs_core::{
  table::Value,
  validation::{CompanyEvent, KeyCardinality, NullKeyCounts, Outlier, ValidationReport},
};
use rusqlite::types::Value as SqlValue;

use crate::{Error, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(date: NaiveDate) -> String { date.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

pub fn encode_value(value: &Value) -> SqlValue {
  match value {
    Value::Null => SqlValue::Null,
    Value::Integer(i) => SqlValue::Integer(*i),
    Value::Real(r) => SqlValue::Real(*r),
    Value::Text(s) => SqlValue::Text(s.clone()),
    Value::Date(d) => SqlValue::Text(encode_date(*d)),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// A repeated-company row as read from SQLite, date still encoded.
pub struct RawCompanyEvent {
  pub company_id:           i64,
  pub company:              Option<String>,
  pub industry:             Option<String>,
  pub headquarter_location: Option<String>,
  pub date:                 Option<String>,
}

impl RawCompanyEvent {
  pub fn into_event(self) -> Result<CompanyEvent> {
    Ok(CompanyEvent {
      company_id:           self.company_id,
      company:              self.company,
      industry:             self.industry,
      headquarter_location: self.headquarter_location,
      date:                 self.date.as_deref().map(decode_date).transpose()?,
    })
  }
}

/// Everything the validation queries return, before date decoding.
pub struct RawReport {
  pub null_keys:          NullKeyCounts,
  pub fact_count:         i64,
  pub cardinality:        Vec<KeyCardinality>,
  pub outliers:           Vec<Outlier>,
  pub repeated_companies: Vec<RawCompanyEvent>,
}

impl RawReport {
  pub fn into_report(self) -> Result<ValidationReport> {
    Ok(ValidationReport {
      null_keys:          self.null_keys,
      fact_count:         self.fact_count,
      cardinality:        self.cardinality,
      outliers:           self.outliers,
      repeated_companies: self
        .repeated_companies
        .into_iter()
        .map(RawCompanyEvent::into_event)
        .collect::<Result<_>>()?,
    })
  }
}
