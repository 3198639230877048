//! A minimal, backend-neutral table representation.
//!
//! The star-schema builder produces strongly typed rows; loaders consume
//! [`Table`]s so that replacing a table is the same operation for every
//! dataset.

use chrono::NaiveDate;

/// Storage class of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
  Integer,
  Real,
  Text,
  /// Calendar date; backends choose their own encoding.
  Date,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
  pub name: &'static str,
  pub kind: ColumnType,
}

impl Column {
  pub const fn new(name: &'static str, kind: ColumnType) -> Self { Self { name, kind } }
}

/// A single cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  Null,
  Integer(i64),
  Real(f64),
  Text(String),
  Date(NaiveDate),
}

impl From<i64> for Value {
  fn from(v: i64) -> Self { Self::Integer(v) }
}

impl From<bool> for Value {
  fn from(v: bool) -> Self { Self::Integer(i64::from(v)) }
}

impl From<Option<f64>> for Value {
  fn from(v: Option<f64>) -> Self { v.map_or(Self::Null, Self::Real) }
}

impl From<Option<String>> for Value {
  fn from(v: Option<String>) -> Self { v.map_or(Self::Null, Self::Text) }
}

impl From<Option<NaiveDate>> for Value {
  fn from(v: Option<NaiveDate>) -> Self { v.map_or(Self::Null, Self::Date) }
}

impl From<Option<i32>> for Value {
  fn from(v: Option<i32>) -> Self { v.map_or(Self::Null, |i| Self::Integer(i64::from(i))) }
}

impl From<Option<u32>> for Value {
  fn from(v: Option<u32>) -> Self { v.map_or(Self::Null, |i| Self::Integer(i64::from(i))) }
}

/// A named, fully materialised table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
  pub name:    &'static str,
  pub columns: Vec<Column>,
  pub rows:    Vec<Vec<Value>>,
}

impl Table {
  pub fn new(name: &'static str, columns: Vec<Column>) -> Self {
    Self { name, columns, rows: Vec::new() }
  }

  /// Append a row; its arity must match the column list.
  pub fn push(&mut self, row: Vec<Value>) {
    debug_assert_eq!(row.len(), self.columns.len(), "row arity for {}", self.name);
    self.rows.push(row);
  }

  pub fn column_index(&self, name: &str) -> Option<usize> {
    self.columns.iter().position(|c| c.name == name)
  }

  pub fn len(&self) -> usize { self.rows.len() }

  pub fn is_empty(&self) -> bool { self.rows.is_empty() }
}
