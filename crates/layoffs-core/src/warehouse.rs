//! The `Warehouse` trait: where the gold tables are loaded and checked.
//!
//! Implemented by storage backends (e.g. `layoffs-store-sqlite`). The
//! orchestrator depends on this abstraction, not on a concrete database.

use std::future::Future;

use crate::{table::Table, validation::ValidationReport};

pub trait Warehouse: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Drop and recreate `table.name`, then insert its rows, as one atomic
  /// operation. Existing contents never survive.
  fn replace_table(
    &self,
    table: Table,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Replace every table in `tables` inside a single transaction, in the
  /// order given. Either all tables are replaced or none is.
  fn load(
    &self,
    tables: Vec<Table>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Run the post-load integrity checks against the loaded tables.
  fn validate(
    &self,
  ) -> impl Future<Output = Result<ValidationReport, Self::Error>> + Send + '_;
}
