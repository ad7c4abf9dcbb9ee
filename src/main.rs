use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod server;
use server::{run_server, RequestsLoggingLevel};

mod trivia_store;
use trivia_store::SqliteTriviaStore;

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the SQLite trivia database file. Created if it does not exist.
    #[clap(value_parser = parse_path)]
    pub db_path: PathBuf,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 5000)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Insert the default categories into an empty database before serving.
    #[clap(long)]
    pub seed_categories: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    info!("Opening SQLite trivia database at {:?}...", cli_args.db_path);
    let store = Arc::new(SqliteTriviaStore::new(&cli_args.db_path)?);

    if cli_args.seed_categories {
        let inserted = store.seed_default_categories()?;
        if inserted > 0 {
            info!("Seeded {} default categories", inserted);
        }
    }

    info!("Ready to serve at port {}!", cli_args.port);
    run_server(store, cli_args.logging_level, cli_args.port).await
}
