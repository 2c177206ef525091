//! `habitual`: track daily and weekly habits and their streaks.
//!
//! # Usage
//!
//! ```text
//! habitual seed
//! habitual done "Swim"
//! habitual rank --days 30
//! habitual --db ~/habits.db --user alice status
//! ```

mod commands;
mod render;
mod settings;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use chrono::Utc;
use clap::Parser;
use commands::{Command, Ctx};
use habitual_store_sqlite::SqliteStore;
use settings::Settings;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "habitual", version, about = "Track habits and their streaks")]
struct Cli {
  /// Path to a TOML config file (store_path, username, utc_offset).
  #[arg(short, long, value_name = "FILE", default_value = "habitual.toml", global = true)]
  config: PathBuf,

  /// SQLite database file; overrides `store_path`.
  #[arg(long, value_name = "PATH", env = "HABITUAL_DB", global = true)]
  db: Option<PathBuf>,

  /// User to act as; overrides `username`.
  #[arg(short, long, global = true)]
  user: Option<String>,

  /// Print machine-readable JSON instead of tables.
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
  // Logs go to stderr so tables and JSON on stdout stay clean.
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = Settings::load(&cli.config)?;
  let store_path = cli.db.unwrap_or_else(|| settings.resolved_store_path());
  let offset = settings.resolved_offset()?;
  let username = cli.user.unwrap_or(settings.username);

  tracing::debug!(store = %store_path.display(), %username, %offset, "opening store");
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {}", store_path.display()))?;

  let ctx = Ctx::new(store, username, cli.json, Utc::now(), offset);
  commands::run(&ctx, cli.command).await
}
