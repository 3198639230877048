//! Plain-text run log: one `<timestamp>,<message>` line per stage.

use std::{
  fs::{self, File, OpenOptions},
  io::{self, Write as _},
  path::PathBuf,
};

use chrono::{Local, NaiveDateTime};

/// Month as an abbreviated name, e.g. `2024-Mar-07-14:05:09`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%b-%d-%H:%M:%S";

pub fn format_line(at: NaiveDateTime, message: &str) -> String {
  format!("{},{message}\n", at.format(TIMESTAMP_FORMAT))
}

/// Append-only progress log, truncated once at the start of a run.
#[derive(Debug, Clone)]
pub struct ProgressLog {
  path: PathBuf,
}

impl ProgressLog {
  /// Create or truncate the log at `path`.
  pub fn reset(path: impl Into<PathBuf>) -> io::Result<Self> {
    let path = path.into();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      fs::create_dir_all(parent)?;
    }
    File::create(&path)?;
    Ok(Self { path })
  }

  /// Append `message` stamped with the local time.
  pub fn record(&self, message: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().append(true).open(&self.path)?;
    file.write_all(format_line(Local::now().naive_local(), message).as_bytes())?;
    tracing::info!("{message}");
    Ok(())
  }
}
