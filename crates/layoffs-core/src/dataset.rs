//! CSV readers and writers for the bronze and silver layers.

use std::{fs, path::Path};

use csv::StringRecord;

use crate::{
  Error, Result,
  record::{CleanRecord, RAW_COLUMNS, RawRecord, SILVER_COLUMNS},
};

/// Rows may differ in length from the header.
fn open_reader(path: &Path) -> Result<csv::Reader<fs::File>> {
  let file = fs::File::open(path).map_err(|e| Error::io(path, e))?;
  Ok(
    csv::ReaderBuilder::new()
      .flexible(true)
      .trim(csv::Trim::Headers)
      .from_reader(file),
  )
}

/// Fail with [`Error::MissingColumn`] unless every `required` column is in
/// `headers`.
pub fn require_columns(
  headers:  &StringRecord,
  required: &[&'static str],
  path:     &Path,
) -> Result<()> {
  match required.iter().find(|c| !headers.iter().any(|h| h == **c)) {
    Some(column) => Err(Error::MissingColumn {
      column: *column,
      path:   path.to_path_buf(),
    }),
    None => Ok(()),
  }
}

/// Count the data records of a CSV file, excluding the header row.
pub fn count_records(path: &Path) -> Result<usize> {
  let mut reader = open_reader(path)?;
  let mut record = csv::ByteRecord::new();
  let mut rows = 0usize;
  while reader.read_byte_record(&mut record)? {
    rows += 1;
  }
  Ok(rows)
}

/// Read every row of a raw (bronze) file. Short rows are padded with empty
/// fields, which read as `None`.
pub fn read_raw(path: &Path) -> Result<Vec<RawRecord>> {
  let mut reader = open_reader(path)?;
  let headers = reader.headers()?.clone();
  require_columns(&headers, &RAW_COLUMNS, path)?;

  let mut rows = Vec::new();
  for record in reader.records() {
    let mut record = record?;
    while record.len() < headers.len() {
      record.push_field("");
    }
    rows.push(record.deserialize(Some(&headers))?);
  }
  Ok(rows)
}

/// Read every row of a cleaned (silver) file.
pub fn read_silver(path: &Path) -> Result<Vec<CleanRecord>> {
  let mut reader = open_reader(path)?;
  require_columns(reader.headers()?, &SILVER_COLUMNS, path)?;
  Ok(reader.deserialize().collect::<Result<Vec<CleanRecord>, _>>()?)
}

/// Write `records` to `path` as a silver file, replacing any existing file.
///
/// The header row is always written, even for an empty dataset.
pub fn write_silver(path: &Path, records: &[CleanRecord]) -> Result<()> {
  let file = create_file(path)?;
  let mut writer = csv::WriterBuilder::new()
    .has_headers(false)
    .from_writer(file);

  writer.write_record(SILVER_COLUMNS)?;
  for record in records {
    writer.serialize(record)?;
  }
  writer.flush().map_err(|e| Error::io(path, e))?;
  Ok(())
}

/// Create (or truncate) `path`, creating missing parent directories.
pub(crate) fn create_file(path: &Path) -> Result<fs::File> {
  ensure_parent(path)?;
  fs::File::create(path).map_err(|e| Error::io(path, e))
}

pub(crate) fn ensure_parent(path: &Path) -> Result<()> {
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use std::io::Write as _;

  use chrono::NaiveDate;

  use super::*;

  fn write_file(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut f = fs::File::create(&path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    path
  }

  const HEADER: &str = "company,status,sources,industry,headquarter_location,\
                        reported_date,total_layoffs,impacted_workforce_percentage,\
                        additional_notes\n";

  #[test]
  fn read_raw_maps_empty_fields_to_none() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
      dir.path(),
      "raw.csv",
      &format!("{HEADER}Acme,Public,,Tech,\"Austin, TX\",2023-01-05,Unclear,,\n"),
    );

    let rows = read_raw(&path).unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.company.as_deref(), Some("Acme"));
    assert_eq!(row.sources, None);
    assert_eq!(row.headquarter_location.as_deref(), Some("Austin, TX"));
    assert_eq!(row.total_layoffs.as_deref(), Some("Unclear"));
    assert_eq!(row.impacted_workforce_percentage, None);
    assert_eq!(row.additional_notes, None);
  }

  #[test]
  fn read_raw_rejects_missing_column() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
      dir.path(),
      "raw.csv",
      "company,status,sources,industry\nAcme,Public,x,Tech\n",
    );

    let err = read_raw(&path).unwrap_err();
    assert!(matches!(
      err,
      Error::MissingColumn { column: "headquarter_location", .. }
    ));
  }

  #[test]
  fn read_raw_ignores_extra_columns() {
    let dir = tempfile::tempdir().unwrap();
    let header = HEADER.trim_end().to_owned() + ",country\n";
    let path = write_file(
      dir.path(),
      "raw.csv",
      &format!("{header}Acme,Public,x,Tech,Austin,2023-01-05,10,5,n,USA\n"),
    );

    let rows = read_raw(&path).unwrap();
    assert_eq!(rows[0].additional_notes.as_deref(), Some("n"));
  }

  #[test]
  fn short_rows_are_padded_and_counted() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
      dir.path(),
      "raw.csv",
      &format!("{HEADER}Acme,Public,s1,Tech,Austin,2023-01-05,100,10\nBeta,Private\n"),
    );

    assert_eq!(count_records(&path).unwrap(), 2);
    let rows = read_raw(&path).unwrap();
    assert_eq!(rows[0].impacted_workforce_percentage.as_deref(), Some("10"));
    assert_eq!(rows[0].additional_notes, None);
    assert_eq!(rows[1].status.as_deref(), Some("Private"));
    assert_eq!(rows[1].reported_date, None);
  }

  #[test]
  fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_raw(&dir.path().join("nope.csv")).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
  }

  #[test]
  fn silver_encoding() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/silver.csv");
    let record = CleanRecord {
      company:                             Some("Acme".into()),
      status:                              Some("Public".into()),
      sources:                             None,
      industry:                            Some("tech".into()),
      headquarter_location:                Some("Austin".into()),
      reported_date:                       NaiveDate::from_ymd_opt(2023, 1, 5),
      total_layoffs:                       Some(500.0),
      impacted_workforce_percentage:       None,
      additional_notes:                    "None".into(),
      known_total_layoffs:                 true,
      known_impacted_workforce_percentage: false,
    };

    write_silver(&path, std::slice::from_ref(&record)).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some(SILVER_COLUMNS.join(",").as_str()));
    assert_eq!(
      lines.next(),
      Some("Acme,Public,,tech,Austin,2023-01-05,500.0,,None,1,0")
    );

    assert_eq!(read_silver(&path).unwrap(), vec![record]);
  }

  #[test]
  fn empty_silver_still_has_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("silver.csv");
    write_silver(&path, &[]).unwrap();
    assert!(read_silver(&path).unwrap().is_empty());
    assert_eq!(count_records(&path).unwrap(), 0);
  }

  #[test]
  fn count_records_handles_quoted_newlines() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
      dir.path(),
      "raw.csv",
      "a,b\n1,\"two\nlines\"\n3,4\n",
    );
    assert_eq!(count_records(&path).unwrap(), 2);
  }
}
