//! The gold stage: reshape cleaned rows into a star schema.
//!
//! Four dimensions are derived from the cleaned dataset, each keyed by a
//! dense surrogate sequence starting at 1 in order of first appearance. The
//! fact table keeps one row per cleaned record and only references the
//! dimensions through those surrogate keys.
//!
//! Dimensions and facts are built in a single pass, so every foreign key is
//! resolved at the moment its dimension row is created.

use std::{collections::HashMap, hash::Hash, path::Path};

use chrono::{Datelike as _, NaiveDate};

use crate::{
  Result, dataset,
  record::{CleanRecord, CompanyKey},
  table::{Column, ColumnType, Table},
};

pub const DIM_COMPANY: &str = "dim_company";
pub const DIM_DATE: &str = "dim_date";
pub const DIM_INDUSTRY: &str = "dim_industry";
pub const DIM_LOCATION: &str = "dim_location";
pub const FACT_LAYOFFS: &str = "fact_layoffs";

// ─── Rows ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimCompany {
  pub company_id: i64,
  pub company:    Option<String>,
  pub status:     Option<String>,
  pub sources:    Option<String>,
}

/// A reported date with its calendar parts. All parts are absent when the
/// date itself is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimDate {
  pub date_id: i64,
  pub date:    Option<NaiveDate>,
  pub year:    Option<i32>,
  pub month:   Option<u32>,
  /// Day of the month.
  pub day:     Option<u32>,
  pub quarter: Option<u32>,
}

impl DimDate {
  pub fn new(date_id: i64, date: Option<NaiveDate>) -> Self {
    Self {
      date_id,
      date,
      year: date.map(|d| d.year()),
      month: date.map(|d| d.month()),
      day: date.map(|d| d.day()),
      quarter: date.map(quarter_of),
    }
  }
}

/// Calendar quarter (1–4) of `date`.
pub fn quarter_of(date: NaiveDate) -> u32 { date.month0() / 3 + 1 }

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimIndustry {
  pub industry_id: i64,
  pub industry:    Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimLocation {
  pub location_id:          i64,
  pub headquarter_location: Option<String>,
}

/// One layoff event: surrogate keys plus measures, nothing descriptive.
#[derive(Debug, Clone, PartialEq)]
pub struct FactLayoff {
  pub company_id:                          i64,
  pub industry_id:                         i64,
  pub location_id:                         i64,
  pub date_id:                             i64,
  pub total_layoffs:                       Option<f64>,
  pub known_total_layoffs:                 bool,
  pub impacted_workforce_percentage:       Option<f64>,
  pub known_impacted_workforce_percentage: bool,
}

/// The five gold tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StarSchema {
  pub dim_company:  Vec<DimCompany>,
  pub dim_date:     Vec<DimDate>,
  pub dim_industry: Vec<DimIndustry>,
  pub dim_location: Vec<DimLocation>,
  pub fact_layoffs: Vec<FactLayoff>,
}

// ─── Builder ─────────────────────────────────────────────────────────────────

/// Assigns surrogate keys to natural keys in first-seen order.
struct KeyIndex<K> {
  ids:  HashMap<K, i64>,
  keys: Vec<K>,
}

impl<K: Eq + Hash + Clone> KeyIndex<K> {
  fn new() -> Self { Self { ids: HashMap::new(), keys: Vec::new() } }

  fn key_for(&mut self, key: K) -> i64 {
    if let Some(&id) = self.ids.get(&key) {
      return id;
    }
    self.keys.push(key.clone());
    let id = self.keys.len() as i64;
    self.ids.insert(key, id);
    id
  }

  /// `(surrogate, natural)` pairs in key order.
  fn into_entries(self) -> impl Iterator<Item = (i64, K)> {
    (1..).zip(self.keys)
  }
}

/// Derive the star schema from cleaned records.
///
/// Deterministic: the same input always yields the same keys. Absent natural
/// keys are ordinary values and receive their own dimension row.
pub fn build_star_schema(records: &[CleanRecord]) -> StarSchema {
  let mut companies = KeyIndex::<CompanyKey>::new();
  let mut dates = KeyIndex::<Option<NaiveDate>>::new();
  let mut industries = KeyIndex::<Option<String>>::new();
  let mut locations = KeyIndex::<Option<String>>::new();

  let fact_layoffs = records
    .iter()
    .map(|r| FactLayoff {
      company_id:                          companies.key_for(r.company_key()),
      industry_id:                         industries.key_for(r.industry.clone()),
      location_id:                         locations.key_for(r.headquarter_location.clone()),
      date_id:                             dates.key_for(r.reported_date),
      total_layoffs:                       r.total_layoffs,
      known_total_layoffs:                 r.known_total_layoffs,
      impacted_workforce_percentage:       r.impacted_workforce_percentage,
      known_impacted_workforce_percentage: r.known_impacted_workforce_percentage,
    })
    .collect();

  StarSchema {
    dim_company: companies
      .into_entries()
      .map(|(company_id, (company, status, sources))| DimCompany {
        company_id,
        company,
        status,
        sources,
      })
      .collect(),
    dim_date: dates
      .into_entries()
      .map(|(date_id, date)| DimDate::new(date_id, date))
      .collect(),
    dim_industry: industries
      .into_entries()
      .map(|(industry_id, industry)| DimIndustry { industry_id, industry })
      .collect(),
    dim_location: locations
      .into_entries()
      .map(|(location_id, headquarter_location)| DimLocation {
        location_id,
        headquarter_location,
      })
      .collect(),
    fact_layoffs,
  }
}

/// Read a silver file and build its star schema.
pub fn star_schema_from_file(path: &Path) -> Result<StarSchema> {
  let records = dataset::read_silver(path)?;
  let schema = build_star_schema(&records);
  tracing::debug!(
    companies = schema.dim_company.len(),
    dates = schema.dim_date.len(),
    industries = schema.dim_industry.len(),
    locations = schema.dim_location.len(),
    facts = schema.fact_layoffs.len(),
    "built star schema from {}",
    path.display()
  );
  Ok(schema)
}

// ─── Tables ──────────────────────────────────────────────────────────────────

impl StarSchema {
  /// Convert into named tables, dimensions first and the fact table last.
  pub fn into_tables(self) -> Vec<Table> {
    use ColumnType::{Date, Integer, Real, Text};

    let mut company = Table::new(DIM_COMPANY, vec![
      Column::new("company_ID", Integer),
      Column::new("company", Text),
      Column::new("status", Text),
      Column::new("sources", Text),
    ]);
    for row in self.dim_company {
      company.push(vec![
        row.company_id.into(),
        row.company.into(),
        row.status.into(),
        row.sources.into(),
      ]);
    }

    let mut date = Table::new(DIM_DATE, vec![
      Column::new("date_ID", Integer),
      Column::new("date", Date),
      Column::new("year", Integer),
      Column::new("month", Integer),
      Column::new("day", Integer),
      Column::new("quarter", Integer),
    ]);
    for row in self.dim_date {
      date.push(vec![
        row.date_id.into(),
        row.date.into(),
        row.year.into(),
        row.month.into(),
        row.day.into(),
        row.quarter.into(),
      ]);
    }

    let mut industry = Table::new(DIM_INDUSTRY, vec![
      Column::new("industry_ID", Integer),
      Column::new("industry", Text),
    ]);
    for row in self.dim_industry {
      industry.push(vec![row.industry_id.into(), row.industry.into()]);
    }

    let mut location = Table::new(DIM_LOCATION, vec![
      Column::new("location_ID", Integer),
      Column::new("headquarter_location", Text),
    ]);
    for row in self.dim_location {
      location.push(vec![row.location_id.into(), row.headquarter_location.into()]);
    }

    let mut fact = Table::new(FACT_LAYOFFS, vec![
      Column::new("company_ID", Integer),
      Column::new("industry_ID", Integer),
      Column::new("location_ID", Integer),
      Column::new("date_ID", Integer),
      Column::new("total_layoffs", Real),
      Column::new("known_total_layoffs", Integer),
      Column::new("impacted_workforce_percentage", Real),
      Column::new("known_impacted_workforce_percentage", Integer),
    ]);
    for row in self.fact_layoffs {
      fact.push(vec![
        row.company_id.into(),
        row.industry_id.into(),
        row.location_id.into(),
        row.date_id.into(),
        row.total_layoffs.into(),
        row.known_total_layoffs.into(),
        row.impacted_workforce_percentage.into(),
        row.known_impacted_workforce_percentage.into(),
      ]);
    }

    vec![company, date, industry, location, fact]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::table::Value;

  fn record(company: &str, industry: Option<&str>, date: Option<(i32, u32, u32)>) -> CleanRecord {
    CleanRecord {
      company:                             Some(company.into()),
      status:                              Some("Public".into()),
      sources:                             Some("news".into()),
      industry:                            industry.map(Into::into),
      headquarter_location:                Some("Austin".into()),
      reported_date:                       date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
      total_layoffs:                       Some(100.0),
      impacted_workforce_percentage:       None,
      additional_notes:                    "None".into(),
      known_total_layoffs:                 true,
      known_impacted_workforce_percentage: false,
    }
  }

  fn sample() -> Vec<CleanRecord> {
    vec![
      record("Acme", Some("tech"), Some((2023, 1, 5))),
      record("Beta", Some("retail"), Some((2023, 4, 1))),
      record("Acme", Some("tech"), Some((2023, 11, 30))),
      record("Gamma", None, Some((2023, 1, 5))),
      record("Beta", Some("retail"), None),
    ]
  }

  fn assert_dense(ids: impl Iterator<Item = i64>) {
    let ids: Vec<i64> = ids.collect();
    let expected: Vec<i64> = (1..=ids.len() as i64).collect();
    assert_eq!(ids, expected);
  }

  #[test]
  fn surrogate_keys_are_dense_from_one() {
    let s = build_star_schema(&sample());
    assert_dense(s.dim_company.iter().map(|r| r.company_id));
    assert_dense(s.dim_date.iter().map(|r| r.date_id));
    assert_dense(s.dim_industry.iter().map(|r| r.industry_id));
    assert_dense(s.dim_location.iter().map(|r| r.location_id));

    assert_eq!(s.dim_company.len(), 3);
    assert_eq!(s.dim_date.len(), 4);
    assert_eq!(s.dim_industry.len(), 3);
    assert_eq!(s.dim_location.len(), 1);
  }

  #[test]
  fn dimensions_follow_first_appearance() {
    let s = build_star_schema(&sample());
    let names: Vec<_> = s.dim_company.iter().map(|r| r.company.as_deref()).collect();
    assert_eq!(names, [Some("Acme"), Some("Beta"), Some("Gamma")]);
  }

  #[test]
  fn same_company_different_dates() {
    let s = build_star_schema(&sample());
    let (first, third) = (&s.fact_layoffs[0], &s.fact_layoffs[2]);
    assert_eq!(first.company_id, third.company_id);
    assert_ne!(first.date_id, third.date_id);
    assert_eq!(s.fact_layoffs.len(), 5);
  }

  #[test]
  fn absent_natural_keys_get_their_own_row() {
    let s = build_star_schema(&sample());

    let unknown_industry = s
      .dim_industry
      .iter()
      .find(|r| r.industry.is_none())
      .expect("unknown industry row");
    assert_eq!(s.fact_layoffs[3].industry_id, unknown_industry.industry_id);

    let unknown_date = s
      .dim_date
      .iter()
      .find(|r| r.date.is_none())
      .expect("unknown date row");
    assert_eq!(s.fact_layoffs[4].date_id, unknown_date.date_id);
    assert_eq!(unknown_date.year, None);
    assert_eq!(unknown_date.quarter, None);
  }

  #[test]
  fn every_fact_key_resolves_to_one_dimension_row() {
    let s = build_star_schema(&sample());
    for f in &s.fact_layoffs {
      assert_eq!(s.dim_company.iter().filter(|d| d.company_id == f.company_id).count(), 1);
      assert_eq!(s.dim_industry.iter().filter(|d| d.industry_id == f.industry_id).count(), 1);
      assert_eq!(s.dim_location.iter().filter(|d| d.location_id == f.location_id).count(), 1);
      assert_eq!(s.dim_date.iter().filter(|d| d.date_id == f.date_id).count(), 1);
    }
  }

  #[test]
  fn building_twice_is_identical() {
    let records = sample();
    assert_eq!(build_star_schema(&records), build_star_schema(&records));
  }

  #[test]
  fn date_parts() {
    let d = DimDate::new(1, NaiveDate::from_ymd_opt(2023, 11, 30));
    assert_eq!(
      (d.year, d.month, d.day, d.quarter),
      (Some(2023), Some(11), Some(30), Some(4))
    );

    let quarters: Vec<u32> = (1..=12)
      .map(|m| quarter_of(NaiveDate::from_ymd_opt(2024, m, 1).unwrap()))
      .collect();
    assert_eq!(quarters, [1, 1, 1, 2, 2, 2, 3, 3, 3, 4, 4, 4]);
  }

  #[test]
  fn company_key_includes_status_and_sources() {
    let mut acquired = record("Acme", Some("tech"), Some((2023, 1, 5)));
    acquired.status = Some("Acquired".into());
    let s = build_star_schema(&[record("Acme", Some("tech"), Some((2023, 1, 5))), acquired]);
    assert_eq!(s.dim_company.len(), 2);
    assert_ne!(s.fact_layoffs[0].company_id, s.fact_layoffs[1].company_id);
  }

  #[test]
  fn tables_use_literal_names() {
    let tables = build_star_schema(&sample()).into_tables();
    let names: Vec<_> = tables.iter().map(|t| t.name).collect();
    assert_eq!(names, [DIM_COMPANY, DIM_DATE, DIM_INDUSTRY, DIM_LOCATION, FACT_LAYOFFS]);

    let fact = &tables[4];
    let columns: Vec<_> = fact.columns.iter().map(|c| c.name).collect();
    assert_eq!(columns, [
      "company_ID",
      "industry_ID",
      "location_ID",
      "date_ID",
      "total_layoffs",
      "known_total_layoffs",
      "impacted_workforce_percentage",
      "known_impacted_workforce_percentage",
    ]);
    assert_eq!(fact.len(), 5);
    assert_eq!(fact.rows[0][5], Value::Integer(1));
    assert_eq!(fact.rows[0][6], Value::Null);

    let date = &tables[1];
    assert_eq!(date.column_index("quarter"), Some(5));
    assert_eq!(date.rows[0][1], Value::Date(NaiveDate::from_ymd_opt(2023, 1, 5).unwrap()));
  }

  #[test]
  fn empty_input_gives_empty_schema() {
    let s = build_star_schema(&[]);
    assert_eq!(s, StarSchema::default());
    assert!(s.into_tables().iter().all(Table::is_empty));
  }
}
