//! # mls-sync
//!
//! One-shot MLS reconciliation for cron or manual use.
//!
//! ```text
//! mls-sync [--limit N] [--status STATUS]
//! ```
//!
//! Loads the same configuration as the API server, runs a single sync, prints
//! the report as JSON on stdout, and exits non-zero on failure.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use vista_db::{Database, DbConfig};
use vista_sync::{HttpFeedClient, Reconciler, SqliteListingStore, SyncConfig, SyncOptions};

fn parse_args() -> Result<SyncOptions, String> {
    let mut options = SyncOptions::default();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--limit" => {
                let value = args.next().ok_or("--limit requires a value")?;
                let limit: u32 = value
                    .parse()
                    .map_err(|_| format!("invalid --limit value: {value}"))?;
                options.limit = Some(limit);
            }
            "--status" => {
                options.status = Some(args.next().ok_or("--status requires a value")?);
            }
            "--help" | "-h" => {
                println!("Usage: mls-sync [--limit N] [--status STATUS]");
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
    }

    Ok(options)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let options = match parse_args() {
        Ok(options) => options,
        Err(message) => {
            eprintln!("mls-sync: {message}");
            std::process::exit(2);
        }
    };

    if let Err(err) = run(options).await {
        eprintln!("mls-sync: {err}");
        std::process::exit(1);
    }
}

async fn run(options: SyncOptions) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::var("VISTA_CONFIG").unwrap_or_else(|_| "vista.toml".to_string());
    let config = SyncConfig::load(&config_path)?;
    config.validate()?;

    let db = Database::new(DbConfig::new(&config.database.path)).await?;
    let feed = Arc::new(HttpFeedClient::new(&config.feed)?);

    let reconciler = Reconciler::new(
        feed,
        Arc::new(SqliteListingStore::new(db.clone())),
        db.sync_logs(),
        config.sync.clone(),
    );

    info!("Running MLS sync");
    let report = reconciler.sync_listings(options).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    db.close().await;
    Ok(())
}
