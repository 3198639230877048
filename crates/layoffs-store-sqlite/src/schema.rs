//! DDL and DML generated from a [`Table`] description.
//!
//! Tables are recreated on every load, so there is no migration story: the
//! column list of the incoming [`Table`] is the schema.

use layoffs_core::table::{ColumnType, Table};

/// Executed once per connection.
pub const SESSION: &str = "
PRAGMA journal_mode = WAL;
";

/// Double-quote an identifier; column names such as `company_ID` are
/// mixed-case and must round-trip literally.
pub fn quote_ident(name: &str) -> String { format!("\"{}\"", name.replace('"', "\"\"")) }

pub fn sql_type(kind: ColumnType) -> &'static str {
  match kind {
    ColumnType::Integer => "INTEGER",
    ColumnType::Real => "REAL",
    // ISO 8601 `YYYY-MM-DD`, which sorts and compares correctly as text.
    ColumnType::Text | ColumnType::Date => "TEXT",
  }
}

pub fn drop_table(table: &Table) -> String {
  format!("DROP TABLE IF EXISTS {};", quote_ident(table.name))
}

pub fn create_table(table: &Table) -> String {
  let columns = table
    .columns
    .iter()
    .map(|c| format!("{} {}", quote_ident(c.name), sql_type(c.kind)))
    .collect::<Vec<_>>()
    .join(", ");
  format!("CREATE TABLE {} ({columns});", quote_ident(table.name))
}

pub fn insert_row(table: &Table) -> String {
  let columns = table
    .columns
    .iter()
    .map(|c| quote_ident(c.name))
    .collect::<Vec<_>>()
    .join(", ");
  let placeholders = (1..=table.columns.len())
    .map(|i| format!("?{i}"))
    .collect::<Vec<_>>()
    .join(", ");
  format!(
    "INSERT INTO {} ({columns}) VALUES ({placeholders})",
    quote_ident(table.name)
  )
}
