use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::debug;

use estimate_cli::app::{self, Command};
use estimate_cli::config::Settings;
use estimate_cli::logging;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Draft, price and keep project cost estimates.
///
/// Drafts are TOML files; see `estimate_cli::draft` for the format. Flags
/// override the settings file.
#[derive(Debug, Parser)]
#[command(name = "estimator", version)]
struct Cli {
    /// Settings file. Defaults to `estimator.toml` in the working directory
    /// when it exists.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Storage backend (`sqlite` or `memory`).
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Connection string. For SQLite a file path (e.g. `estimates.db`) or
    /// `:memory:`.
    #[arg(long, global = true)]
    db: Option<String>,

    /// Log level or filter directive. `RUST_LOG` takes precedence.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Also append log records to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn apply_overrides(
        &self,
        settings: &mut Settings,
    ) {
        if let Some(backend) = &self.backend {
            settings.database.backend = backend.clone();
        }
        if let Some(db) = &self.db {
            settings.database.connection_string = db.clone();
        }
        if let Some(level) = &self.log_level {
            settings.logging.level = level.clone();
        }
        if let Some(file) = &self.log_file {
            settings.logging.file = Some(file.clone());
        }
    }
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level.as_deref().unwrap_or("info"));

    let mut settings = Settings::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut settings);

    if !logging::env_filter_is_set() {
        logging::set_log_level(&settings.logging.level)?;
    }
    if let Some(path) = &settings.logging.file {
        logging::enable_file_logging(path)?;
    }

    debug!(backend = %settings.database.backend, "connecting to estimate store");
    let repo = app::build_registry()
        .create(&settings.database)
        .await
        .with_context(|| {
            format!(
                "cannot open '{}' backend at '{}'",
                settings.database.backend, settings.database.connection_string
            )
        })?;

    let output = app::run(cli.command, &*repo, &settings).await?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
