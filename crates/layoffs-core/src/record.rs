//! Row types for the bronze (raw) and silver (cleaned) layers.
//!
//! Field order on both structs is the CSV column order; `csv` + `serde` derive
//! the header row from it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Columns every raw input file must carry.
pub const RAW_COLUMNS: [&str; 9] = [
  "company",
  "status",
  "sources",
  "industry",
  "headquarter_location",
  "reported_date",
  "total_layoffs",
  "impacted_workforce_percentage",
  "additional_notes",
];

/// Columns of a silver file: the raw columns plus the two "known" flags.
pub const SILVER_COLUMNS: [&str; 11] = [
  "company",
  "status",
  "sources",
  "industry",
  "headquarter_location",
  "reported_date",
  "total_layoffs",
  "impacted_workforce_percentage",
  "additional_notes",
  "known_total_layoffs",
  "known_impacted_workforce_percentage",
];

// ─── Bronze ──────────────────────────────────────────────────────────────────

/// One layoff event exactly as it appears in the source file.
///
/// Every field is free text; an empty CSV field deserialises to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawRecord {
  pub company:                       Option<String>,
  pub status:                        Option<String>,
  pub sources:                       Option<String>,
  pub industry:                      Option<String>,
  pub headquarter_location:          Option<String>,
  pub reported_date:                 Option<String>,
  /// A number, the sentinel `Unclear`, or anything else a human typed.
  pub total_layoffs:                 Option<String>,
  pub impacted_workforce_percentage: Option<String>,
  pub additional_notes:              Option<String>,
}

// ─── Silver ──────────────────────────────────────────────────────────────────

/// A layoff event after type coercion and normalisation.
///
/// The `known_*` flags are denormalised copies of `measure.is_some()` so that
/// downstream consumers can tell "zero" from "unknown" without re-deriving
/// it. They are only ever set by [`crate::clean::clean_record`] or read back
/// from a silver file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanRecord {
  pub company:                             Option<String>,
  pub status:                              Option<String>,
  pub sources:                             Option<String>,
  pub industry:                            Option<String>,
  pub headquarter_location:                Option<String>,
  pub reported_date:                       Option<NaiveDate>,
  pub total_layoffs:                       Option<f64>,
  pub impacted_workforce_percentage:       Option<f64>,
  pub additional_notes:                    String,
  #[serde(with = "int_flag")]
  pub known_total_layoffs:                 bool,
  #[serde(with = "int_flag")]
  pub known_impacted_workforce_percentage: bool,
}

/// (company, status, sources): the natural key of `dim_company`.
pub type CompanyKey = (Option<String>, Option<String>, Option<String>);

impl CleanRecord {
  pub fn company_key(&self) -> CompanyKey {
    (self.company.clone(), self.status.clone(), self.sources.clone())
  }
}

/// Booleans stored as the small integers `0` and `1`.
pub(crate) mod int_flag {
  use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

  pub fn serialize<S: Serializer>(value: &bool, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u8(u8::from(*value))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    match u8::deserialize(d)? {
      0 => Ok(false),
      1 => Ok(true),
      other => Err(D::Error::custom(format!("expected 0 or 1, got {other}"))),
    }
  }
}
