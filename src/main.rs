//! Todolist server - JSON CRUD over SQLite plus the companion web page

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use todolist::config::{self, Settings, TodoConfig};
use todolist::server::{self, AppState};
use todolist::storage::{SharedStore, TodoStore};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "todolist")]
#[command(version)]
#[command(about = "Todo-list HTTP service backed by SQLite")]
struct Cli {
    /// Port to listen on [default: 8080]
    #[arg(long)]
    port: Option<u16>,

    /// Path to the database file [default: todos.db]
    #[arg(long)]
    db: Option<PathBuf>,

    /// Log level or filter directive [default: info]
    #[arg(long)]
    log_level: Option<String>,

    /// Directory holding index.html, style.css and main.js [default: ./frontend]
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Optional TOML config file
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> TodoConfig {
        TodoConfig {
            port: self.port,
            db: self.db.clone(),
            log_level: self.log_level.clone(),
            static_dir: self.static_dir.clone(),
        }
    }
}

/// Bad arguments are a startup failure (1); help and version are not (0).
fn parse_exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() { 1 } else { 0 }
}

fn init_logging(level: &str) {
    // RUST_LOG wins over --log-level
    let (filter, rejected) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, false),
        Err(_) => match EnvFilter::try_new(level) {
            Ok(filter) => (filter, false),
            Err(_) => (EnvFilter::new(config::DEFAULT_LOG_LEVEL), true),
        },
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    if rejected {
        tracing::warn!("Unknown log level {:?}, using {}", level, config::DEFAULT_LOG_LEVEL);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            std::process::exit(parse_exit_code(&err));
        }
    };

    let file = config::load_config(cli.config.as_deref())?;
    let settings = Settings::resolve(file, cli.overrides());

    init_logging(&settings.log_level);

    config::ensure_db_dir(&settings.db)?;
    let store = TodoStore::open(&settings.db)
        .with_context(|| format!("failed to open database {}", settings.db.display()))?;
    tracing::info!("Database {} ready ({} items)", settings.db.display(), store.count()?);

    let store = SharedStore::new(store);
    let state = Arc::new(AppState {
        store: store.clone(),
        static_dir: settings.static_dir.clone(),
    });
    tracing::info!(
        "Serving static files from {} (log level {})",
        settings.static_dir.display(),
        settings.log_level
    );

    server::start_server(settings.port, state, server::shutdown_signal()).await?;

    match store.into_inner() {
        Some(store) => store.close()?,
        None => tracing::warn!("Store still referenced at shutdown; closing on drop"),
    }
    tracing::info!("Server stopped");

    Ok(())
}
