//! [`SqliteWarehouse`], the SQLite implementation of [`Warehouse`].

use std::path::Path;

use layoffs_core::{
  star::{DIM_COMPANY, DIM_DATE, DIM_INDUSTRY, DIM_LOCATION},
  table::Table,
  validation::{KeyCardinality, NullKeyCounts, OUTLIER_CEILING, Outlier, ValidationReport},
  warehouse::Warehouse,
};

use crate::{
  Result,
  encode::{RawCompanyEvent, RawReport, encode_value},
  queries, schema,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// The gold layer, held in a single SQLite file.
///
/// Tables carry no foreign-key constraints; integrity is checked after the
/// load by [`Warehouse::validate`].
#[derive(Clone)]
pub struct SqliteWarehouse {
  conn: tokio_rusqlite::Connection,
}

impl SqliteWarehouse {
  /// Open (or create) a warehouse at `path`.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let warehouse = Self { conn };
    warehouse.init_session().await?;
    Ok(warehouse)
  }

  /// Open an in-memory warehouse. Used by tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let warehouse = Self { conn };
    warehouse.init_session().await?;
    Ok(warehouse)
  }

  async fn init_session(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(schema::SESSION)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Number of rows currently in `table`.
  pub async fn row_count(&self, table: &str) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", schema::quote_ident(table));
    let count: i64 = self
      .conn
      .call(move |conn| Ok(conn.query_row(&sql, [], |r| r.get(0))?))
      .await?;
    Ok(count)
  }

  /// Run an arbitrary single-column integer query. Test helper.
  #[cfg(test)]
  pub(crate) async fn query_i64s(&self, sql: &'static str) -> Result<Vec<Option<i64>>> {
    let values = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
          .query_map([], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(values)
  }
}

/// Drop, recreate and fill one table on `conn`. The caller owns the
/// transaction.
fn replace_in(conn: &rusqlite::Connection, table: &Table) -> rusqlite::Result<()> {
  conn.execute_batch(&schema::drop_table(table))?;
  conn.execute_batch(&schema::create_table(table))?;

  let mut stmt = conn.prepare(&schema::insert_row(table))?;
  for row in &table.rows {
    stmt.execute(rusqlite::params_from_iter(row.iter().map(encode_value)))?;
  }
  Ok(())
}

fn run_checks(conn: &rusqlite::Connection) -> rusqlite::Result<RawReport> {
  let null_keys = conn.query_row(queries::NULL_KEYS, [], |r| {
    Ok(NullKeyCounts {
      company:  r.get(0)?,
      industry: r.get(1)?,
      location: r.get(2)?,
      date:     r.get(3)?,
    })
  })?;

  let fact_count: i64 = conn.query_row(queries::FACT_COUNT, [], |r| r.get(0))?;

  let cardinality = conn.query_row(queries::KEY_CARDINALITY, [], |r| {
    [DIM_COMPANY, DIM_INDUSTRY, DIM_LOCATION, DIM_DATE]
      .into_iter()
      .enumerate()
      .map(|(i, dimension)| -> rusqlite::Result<KeyCardinality> {
        Ok(KeyCardinality {
          dimension,
          fact_distinct:      r.get(2 * i)?,
          dimension_distinct: r.get(2 * i + 1)?,
        })
      })
      .collect::<rusqlite::Result<Vec<_>>>()
  })?;

  let mut stmt = conn.prepare(queries::OUTLIERS)?;
  let outliers = stmt
    .query_map(rusqlite::params![OUTLIER_CEILING], |r| {
      Ok(Outlier { company_id: r.get(0)?, total_layoffs: r.get(1)? })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut stmt = conn.prepare(queries::REPEATED_COMPANIES)?;
  let repeated_companies = stmt
    .query_map([], |r| {
      Ok(RawCompanyEvent {
        company_id:           r.get(0)?,
        company:              r.get(1)?,
        industry:             r.get(2)?,
        headquarter_location: r.get(3)?,
        date:                 r.get(4)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  Ok(RawReport { null_keys, fact_count, cardinality, outliers, repeated_companies })
}

// ─── Warehouse impl ──────────────────────────────────────────────────────────

impl Warehouse for SqliteWarehouse {
  type Error = crate::Error;

  async fn replace_table(&self, table: Table) -> Result<()> {
    let (name, rows) = (table.name, table.len());

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        replace_in(&tx, &table)?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    tracing::debug!(table = name, rows, "replaced table");
    Ok(())
  }

  async fn load(&self, tables: Vec<Table>) -> Result<()> {
    let sizes: Vec<(&'static str, usize)> = tables.iter().map(|t| (t.name, t.len())).collect();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for table in &tables {
          replace_in(&tx, table)?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    for (name, rows) in sizes {
      tracing::debug!(table = name, rows, "loaded table");
    }
    Ok(())
  }

  async fn validate(&self) -> Result<ValidationReport> {
    let raw = self
      .conn
      .call(|conn| Ok(run_checks(conn)?))
      .await?;
    raw.into_report()
  }
}
