//! Layered configuration: TOML file, then `HABITUAL_*` environment variables.
//! Command-line flags are applied on top by `main`.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::{FixedOffset, Local, Offset as _};
use habitual_store_sqlite::seed::DEMO_USERNAME;
use serde::Deserialize;

/// Runtime settings, deserialised from `habitual.toml` and the environment.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  /// Path of the SQLite database file. A leading `~/` is expanded.
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  /// The user whose habits every command operates on.
  #[serde(default = "default_username")]
  pub username:   String,
  /// Wall-clock offset used to split check-ins into days and weeks, such as
  /// `+02:00`. Unset means the system's current local offset.
  #[serde(default)]
  pub utc_offset: Option<String>,
}

fn default_store_path() -> PathBuf { PathBuf::from("habitual.db") }

fn default_username() -> String { DEMO_USERNAME.to_owned() }

impl Settings {
  /// Read `file` if it exists, then overlay `HABITUAL_`-prefixed variables.
  pub fn load(file: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(file.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("HABITUAL"))
      .build()
      .with_context(|| format!("failed to read config file {}", file.display()))?;

    settings
      .try_deserialize()
      .context("failed to deserialise settings")
  }

  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }

  pub fn resolved_offset(&self) -> anyhow::Result<FixedOffset> {
    match &self.utc_offset {
      Some(raw) => raw
        .trim()
        .parse::<FixedOffset>()
        .with_context(|| format!("invalid utc_offset {raw:?} (expected e.g. \"+02:00\")")),
      None => Ok(Local::now().offset().fix()),
    }
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  let rest = match s.as_ref() {
    "~" => "",
    s => match s.strip_prefix("~/") {
      Some(rest) => rest,
      None => return path.to_path_buf(),
    },
  };
  match std::env::var("HOME") {
    Ok(home) if rest.is_empty() => PathBuf::from(home),
    Ok(home) => PathBuf::from(home).join(rest),
    Err(_) => path.to_path_buf(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_file_yields_defaults() {
    let settings = Settings::load(Path::new("does-not-exist.toml")).unwrap();
    assert_eq!(settings.store_path, PathBuf::from("habitual.db"));
    assert_eq!(settings.username, "admin");
  }

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(expand_tilde(Path::new("~")), PathBuf::from(&home));
    assert_eq!(expand_tilde(Path::new("~/h.db")), PathBuf::from(&home).join("h.db"));
    assert_eq!(expand_tilde(Path::new("~alice/h.db")), PathBuf::from("~alice/h.db"));
  }

  #[test]
  fn configured_offset_is_parsed() {
    let mut settings = Settings::load(Path::new("does-not-exist.toml")).unwrap();
    settings.utc_offset = Some("-05:00".into());
    assert_eq!(settings.resolved_offset().unwrap(), FixedOffset::west_opt(5 * 3600).unwrap());

    settings.utc_offset = Some("tomorrow".into());
    assert!(settings.resolved_offset().is_err());
  }

  #[test]
  fn plain_paths_are_left_alone() {
    assert_eq!(expand_tilde(Path::new("/tmp/h.db")), PathBuf::from("/tmp/h.db"));
    assert_eq!(expand_tilde(Path::new("h.db")), PathBuf::from("h.db"));
  }
}
