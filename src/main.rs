//! Kraken CLI - inspect and erase per-application record stores

use clap::{Parser, Subcommand};
use kraken_db::config::{self, StoreConfig};
use kraken_db::ui::{self, Icons};
use kraken_db::{Error, RecordStore, Registry};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "kraken")]
#[command(version)]
#[command(about = "Inspect and erase Kraken DB record stores")]
#[command(long_about = r#"
Kraken DB keeps one SQLite file per (application, database) pair under the
user's config directory. This tool locates, inspects and erases them.

Example usage:
  kraken path --app "My App" --db main
  kraken tables --app "My App" --db main --format json
  kraken erase --app "My App" --db main --yes
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ./kraken.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print where a database file lives
    Path {
        /// Application name
        #[arg(short, long)]
        app: String,

        /// Database name (without extension)
        #[arg(short, long)]
        db: String,
    },

    /// List the tables of a database and their row counts
    Tables {
        /// Application name
        #[arg(short, long)]
        app: String,

        /// Database name (without extension)
        #[arg(short, long)]
        db: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Delete a database file, and its application directory when empty
    Erase {
        /// Application name
        #[arg(short, long)]
        app: String,

        /// Database name (without extension)
        #[arg(short, long)]
        db: String,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Write a kraken.toml with the given settings
    InitConfig {
        /// Directory to use instead of the platform config directory
        #[arg(long)]
        base_dir: Option<PathBuf>,

        /// SQLite busy timeout in milliseconds
        #[arg(long)]
        busy_timeout_ms: Option<u64>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let store_config = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Path { app, db } => {
            let path = RecordStore::locate(&app, &db, &store_config)?;
            println!("{}", path.display());
            if !path.exists() {
                ui::warn("database does not exist yet");
            }
        }

        Commands::Tables { app, db, format } => {
            let store = open_existing(&app, &db, &store_config)?;
            let stats = store.table_stats()?;

            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                ui::header(Icons::DATABASE, &store.database_path().display().to_string());
                if stats.is_empty() {
                    println!("{}", ui::dim("no tables"));
                } else {
                    println!("{}", ui::tables_table(&stats));
                }
            }
        }

        Commands::Erase { app, db, yes } => {
            if !yes {
                anyhow::bail!("refusing to erase {}/{} without --yes", app, db);
            }
            let store = open_existing(&app, &db, &store_config)?;
            let path = store.database_path().to_path_buf();

            match store.erase_database() {
                Ok(()) => ui::success(&format!("Erased {}", path.display())),
                Err(Error::DirectoryNotEmpty(dir)) => {
                    ui::success(&format!("Erased {}", path.display()));
                    ui::warn(&kept_directory_notice(&dir));
                }
                Err(e) => {
                    ui::error(&format!("Failed to erase {}", path.display()));
                    return Err(e.into());
                }
            }
        }

        Commands::InitConfig {
            base_dir,
            busy_timeout_ms,
            force,
        } => {
            let path = cli.config.unwrap_or_else(config::default_config_path);
            let new_config = StoreConfig {
                base_dir,
                busy_timeout_ms,
            };
            config::write_config(&path, &new_config, force)?;
            ui::info("Wrote config", &path.display().to_string());
        }
    }

    Ok(())
}

/// Open a database that must already exist, without declaring any tables
fn open_existing(app: &str, db: &str, store_config: &StoreConfig) -> anyhow::Result<RecordStore> {
    let path = RecordStore::locate(app, db, store_config)?;
    if !path.is_file() {
        anyhow::bail!("no database at {}", path.display());
    }
    tracing::debug!("Opening {}", path.display());
    Ok(RecordStore::open_with(app, db, &Registry::new(), store_config)?)
}

/// `ui::warn` supplies the icon
fn kept_directory_notice(dir: &Path) -> String {
    format!("{} still holds other databases; kept", dir.display())
}
