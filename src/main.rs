//! fogg-task server and operator CLI.

use anyhow::{Context, Result};
use clap::Parser;
use fogg_task::ai::{AiBridge, ChatCompletionsClient};
use fogg_task::api::{AppState, start_server};
use fogg_task::cli::{Cli, Command, SessionCommand};
use fogg_task::config::{Config, ConfigLoader, ConfigPaths};
use fogg_task::db::Database;
use fogg_task::filter::TaskFilter;
use fogg_task::format::format_forest_markdown;
use fogg_task::hierarchy::assemble_forest;
use fogg_task::logging;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const MS_PER_HOUR: i64 = 60 * 60 * 1000;

fn open_database(path: &Path) -> Result<Database> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating database directory {}", parent.display()))?;
        }
    }
    Database::open(path).with_context(|| format!("opening database {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&cli.log, cli.verbose)?;

    let mut paths = ConfigPaths::discover();
    if let Some(ref config_path) = cli.config {
        paths = paths.with_file(config_path);
    }
    let mut loader = ConfigLoader::load_with_paths(paths)?;
    if let Some(path) = loader.config_path() {
        info!(path = %path.display(), "Loaded configuration");
    }

    // Command-line flags are the highest tier
    let config = loader.config_mut();
    if let Some(ref db_path) = cli.database {
        config.server.db_path = db_path.into();
    }
    if let Some(ref host) = cli.host {
        config.server.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    let config = loader.into_config();

    match cli.command {
        Some(Command::Session(cmd)) => run_session(&config, cmd),
        Some(Command::Tree {
            user,
            hide_archived,
        }) => run_tree(&config, &user, hide_archived),
        Some(Command::Serve) | None => run_server(config).await,
    }
}

async fn run_server(config: Config) -> Result<()> {
    let db = Arc::new(open_database(&config.server.db_path)?);
    match db.purge_expired_sessions() {
        Ok(0) => {}
        Ok(n) => info!(removed = n, "Removed expired sessions"),
        Err(e) => warn!("Failed to purge expired sessions: {}", e),
    }

    let provider = Arc::new(ChatCompletionsClient::from_config(&config.ai));
    let bridge = AiBridge::new(provider, Duration::from_secs(config.ai.timeout_secs));
    let state = AppState::new(db, bridge);

    let (shutdown_tx, addr) = start_server(
        state,
        &config.server.host,
        config.server.port,
        &config.server.cors_origins,
    )
    .await?;
    info!(%addr, db = %config.server.db_path.display(), "fogg-task ready");

    tokio::signal::ctrl_c().await?;
    info!("Interrupt received");
    let _ = shutdown_tx.send(());
    // Give in-flight requests a moment to finish
    tokio::time::sleep(Duration::from_millis(200)).await;
    Ok(())
}

fn run_session(config: &Config, cmd: SessionCommand) -> Result<()> {
    let db = open_database(&config.server.db_path)?;
    match cmd {
        SessionCommand::Issue { user, ttl_hours } => {
            let hours = ttl_hours.unwrap_or(config.server.session_ttl_hours);
            let ttl_ms = i64::try_from(hours)
                .context("ttl too large")?
                .saturating_mul(MS_PER_HOUR);
            let session = db.create_session(&user, ttl_ms)?;
            println!("{}", session.token);
        }
        SessionCommand::Revoke { token } => {
            if db.revoke_session(&token)? {
                println!("Revoked");
            } else {
                anyhow::bail!("No such session");
            }
        }
        SessionCommand::Purge => {
            let removed = db.purge_expired_sessions()?;
            println!("Removed {} expired session(s)", removed);
        }
    }
    Ok(())
}

fn run_tree(config: &Config, user: &str, hide_archived: bool) -> Result<()> {
    let db = open_database(&config.server.db_path)?;
    let filter = TaskFilter {
        hide_archived,
        ..TaskFilter::default()
    };
    let tasks = filter.apply(db.list_tasks(user)?, chrono::Local::now());
    print!("{}", format_forest_markdown(&assemble_forest(tasks)));
    Ok(())
}
