//! The bronze stage: snapshot the raw file unmodified.

use std::{fs, path::Path};

use crate::{Error, Result, dataset};

/// What the bronze stage copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
  /// Data records in the raw file, header excluded.
  pub rows:  usize,
  pub bytes: u64,
}

/// Copy `input` byte for byte to `output` and count its records.
///
/// The count is taken from the copy, so it describes exactly what later
/// stages will read.
pub fn ingest_csv(input: &Path, output: &Path) -> Result<IngestSummary> {
  dataset::ensure_parent(output)?;
  let bytes = fs::copy(input, output).map_err(|e| Error::io(input, e))?;
  let rows = dataset::count_records(output)?;

  tracing::debug!(rows, bytes, "ingested {} -> {}", input.display(), output.display());
  Ok(IngestSummary { rows, bytes })
}
