//! notion-sync — mirror unsynced database records into a Notion database.
//!
//! Reads configuration from an optional TOML file and the environment
//! (a `.env` file is loaded first when present), fetches records from the
//! configured backend, and creates or updates one Notion page per record.
//! Exits non-zero when any record fails or the run cannot start.

use clap::Parser;
use notion_sync_core::{create_source, run_sync, NotionClient, SyncConfig};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "notion-sync", author, version, about, long_about = None)]
struct Args {
    /// Optional TOML config file; environment variables override it
    #[arg(short, long)]
    config: Option<String>,

    /// Database backend (postgresql, mysql, sqlite, mongodb); overrides DB_TYPE
    #[arg(short, long)]
    backend: Option<String>,

    /// Print the summary as JSON instead of the text block
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience — production uses real env vars)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Init logging
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    tracing::info!("Initializing Notion sync client...");
    let config = match SyncConfig::load(args.config.as_deref(), args.backend.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Fatal error: {}", e);
            std::process::exit(1);
        }
    };

    let client = match NotionClient::new(config.notion.clone()) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Fatal error: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Connecting to {} database...", config.database.backend);
    let source = match create_source(&config.database) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Fatal error: {}", e);
            std::process::exit(1);
        }
    };

    let summary = match run_sync(source.as_ref(), &client).await {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Fatal error: {}", e);
            std::process::exit(1);
        }
    };

    if summary.total() == 0 && !args.json {
        return Ok(());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", summary.render());
    }

    let code = summary.exit_code();
    if code != 0 {
        std::process::exit(code);
    }

    Ok(())
}
