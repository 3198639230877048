//! Pipeline configuration.
//!
//! Layered, lowest precedence first: built-in defaults, an optional TOML
//! file, `LAYOFFS_*` environment variables (nested keys joined with `__`,
//! e.g. `LAYOFFS_DATABASE__PATH`), then command-line overrides.

use std::path::{Component, Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use layoffs_core::validation::ValidationPolicy;
use serde::Deserialize;

/// Every path and setting a pipeline run needs.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
  /// Raw source CSV. Required.
  pub input_path:  PathBuf,
  pub bronze_path: PathBuf,
  pub silver_path: PathBuf,
  /// Progress log, truncated at the start of every run.
  pub log_path:    PathBuf,
  pub database:    DatabaseConfig,
  #[serde(default)]
  pub validation:  ValidationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
  /// SQLite file holding the gold tables. Required.
  pub path: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValidationConfig {
  #[serde(default)]
  pub policy: ValidationPolicy,
}

/// Values supplied on the command line; `None` leaves lower layers alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
  pub input:            Option<PathBuf>,
  pub database:         Option<PathBuf>,
  pub fail_on_critical: bool,
}

fn path_value(path: &Option<PathBuf>) -> Option<String> {
  path.as_ref().map(|p| p.to_string_lossy().into_owned())
}

impl PipelineConfig {
  /// Resolve configuration from all layers. `file` may not exist.
  ///
  /// Fails before anything is read or opened if a required setting is
  /// missing or the paths collide.
  pub fn load(file: &Path, overrides: &Overrides) -> Result<Self, ConfigError> {
    let mut builder = Config::builder()
      .set_default("bronze_path", "data/tech_layoffs_bronze.csv")?
      .set_default("silver_path", "data/tech_layoffs_silver.csv")?
      .set_default("log_path", "data/etl_log.txt")?
      .add_source(File::from(file).required(false))
      .add_source(
        Environment::with_prefix("LAYOFFS")
          .prefix_separator("_")
          .separator("__"),
      )
      .set_override_option("input_path", path_value(&overrides.input))?
      .set_override_option("database.path", path_value(&overrides.database))?;

    if overrides.fail_on_critical {
      builder = builder.set_override("validation.policy", "fail_on_critical")?;
    }

    let config: Self = builder.build()?.try_deserialize()?;
    config.check()?;
    Ok(config)
  }

  /// Reject configurations where one stage would overwrite another's input.
  fn check(&self) -> Result<(), ConfigError> {
    let stages = [
      ("input_path", normalize(&self.input_path)),
      ("bronze_path", normalize(&self.bronze_path)),
      ("silver_path", normalize(&self.silver_path)),
      ("log_path", normalize(&self.log_path)),
      ("database.path", normalize(&self.database.path)),
    ];
    for (i, (a, pa)) in stages.iter().enumerate() {
      if let Some((b, _)) = stages[i + 1..].iter().find(|(_, pb)| pb == pa) {
        return Err(ConfigError::Message(format!(
          "{a} and {b} both point at {}",
          pa.display()
        )));
      }
    }
    Ok(())
  }
}

/// Drop `.` components so `./data/x.csv` and `data/x.csv` compare equal.
/// `..` is kept as is.
fn normalize(path: &Path) -> PathBuf {
  path
    .components()
    .filter(|c| !matches!(c, Component::CurDir))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn write_toml(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("layoffs.toml");
    std::fs::write(&path, contents).unwrap();
    path
  }

  #[test]
  fn file_values_and_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_toml(
      dir.path(),
      r#"
        input_path = "raw/tech_layoffs.csv"

        [database]
        path = "gold/techlayoffs.db"
      "#,
    );

    let config = PipelineConfig::load(&file, &Overrides::default()).unwrap();
    assert_eq!(config.input_path, PathBuf::from("raw/tech_layoffs.csv"));
    assert_eq!(config.database.path, PathBuf::from("gold/techlayoffs.db"));
    assert_eq!(config.bronze_path, PathBuf::from("data/tech_layoffs_bronze.csv"));
    assert_eq!(config.log_path, PathBuf::from("data/etl_log.txt"));
    assert_eq!(config.validation.policy, ValidationPolicy::Report);
  }

  #[test]
  fn overrides_win_over_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_toml(
      dir.path(),
      r#"
        input_path = "raw/a.csv"

        [database]
        path = "a.db"

        [validation]
        policy = "report"
      "#,
    );

    let overrides = Overrides {
      input:            Some("raw/b.csv".into()),
      database:         Some("b.db".into()),
      fail_on_critical: true,
    };
    let config = PipelineConfig::load(&file, &overrides).unwrap();
    assert_eq!(config.input_path, PathBuf::from("raw/b.csv"));
    assert_eq!(config.database.path, PathBuf::from("b.db"));
    assert_eq!(config.validation.policy, ValidationPolicy::FailOnCritical);
  }

  #[test]
  fn policy_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_toml(
      dir.path(),
      r#"
        input_path = "in.csv"
        [database]
        path = "out.db"
        [validation]
        policy = "fail_on_critical"
      "#,
    );
    let config = PipelineConfig::load(&file, &Overrides::default()).unwrap();
    assert_eq!(config.validation.policy, ValidationPolicy::FailOnCritical);
  }

  #[test]
  fn missing_database_is_a_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_toml(dir.path(), "input_path = \"in.csv\"\n");
    assert!(PipelineConfig::load(&file, &Overrides::default()).is_err());
  }

  #[test]
  fn missing_file_without_overrides_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let absent = dir.path().join("absent.toml");
    assert!(PipelineConfig::load(&absent, &Overrides::default()).is_err());
  }

  #[test]
  fn colliding_paths_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_toml(
      dir.path(),
      r#"
        input_path  = "same.csv"
        bronze_path = "same.csv"
        [database]
        path = "out.db"
      "#,
    );
    let err = PipelineConfig::load(&file, &Overrides::default()).unwrap_err();
    assert!(err.to_string().contains("input_path and bronze_path"), "{err}");
  }

  #[test]
  fn collisions_ignore_current_dir_components() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_toml(
      dir.path(),
      r#"
        input_path = "in.csv"
        [database]
        path = "out.db"
      "#,
    );
    let overrides = Overrides {
      input: Some("./data/./tech_layoffs_silver.csv".into()),
      ..Overrides::default()
    };
    let err = PipelineConfig::load(&file, &overrides).unwrap_err();
    assert!(err.to_string().contains("input_path and silver_path"), "{err}");

    assert_eq!(normalize(Path::new("./data/x.csv")), PathBuf::from("data/x.csv"));
  }
}
