//! Nextup CLI - Command-line front end for the shared turn queue
//!
//! Composition root: loads settings, initialises logging, wires the
//! SQLite store into the turn queue service and renders its view.

mod config;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use config::{Cli, Commands, Settings};
use nextup_core::application::{EnqueueOutcome, TurnQueueService};
use nextup_core::domain::ResetMode;
use nextup_core::port::time_provider::SystemTimeProvider;
use nextup_core::port::{AnonymousIdentityProvider, IdentityProvider, StaticIdentityProvider};
use nextup_infra_sqlite::{create_pool, run_migrations, SqliteQueueStore};
use render::StatusRow;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn init_logging(verbose: u8) -> Result<()> {
    let log_format = std::env::var("NEXTUP_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let default_directive = match verbose {
        0 => "nextup=warn",
        1 => "nextup=info",
        _ => "nextup=debug",
    };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .context("Failed to create env filter")?;

    // stdout carries command output, logs go to stderr
    match log_format.as_str() {
        "json" => {
            // Machine-readable structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}

async fn build_service(
    settings: &Settings,
    identity_provider: Arc<dyn IdentityProvider>,
    reset_mode: ResetMode,
) -> Result<TurnQueueService> {
    let db_url = settings.database_url();

    if let Some(file) = settings.database_file() {
        if let Some(parent) = file.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }
    }

    info!(db_path = %db_url, queue = %settings.queue, "Opening queue store");

    let pool = create_pool(&db_url)
        .await
        .with_context(|| format!("Failed to open database {}", db_url))?;
    run_migrations(&pool).await.context("Migration failed")?;

    // DI wiring
    let store = Arc::new(SqliteQueueStore::new(pool));
    let config = settings.queue_config().with_reset_mode(reset_mode);

    let service = TurnQueueService::new(
        config,
        store,
        identity_provider,
        Arc::new(SystemTimeProvider),
    )
    .context("Invalid queue configuration")?
    .with_retry_policy(settings.retry_policy());

    Ok(service)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    debug!("nextup v{} starting", VERSION);

    let mut reset_mode = cli.settings.reset_mode;
    let identity_provider: Arc<dyn IdentityProvider> = match &cli.command {
        Commands::Join(identity) => match identity.participant() {
            Some(participant) => Arc::new(StaticIdentityProvider::new(participant)),
            None => Arc::new(AnonymousIdentityProvider),
        },
        Commands::Reset { history: true } => {
            reset_mode = ResetMode::WaitingAndHistory;
            Arc::new(AnonymousIdentityProvider)
        }
        _ => Arc::new(AnonymousIdentityProvider),
    };

    let service = build_service(&cli.settings, identity_provider, reset_mode).await?;

    match cli.command {
        Commands::Join(_) => match service.join().await? {
            EnqueueOutcome::Joined(entry) => {
                println!(
                    "{}",
                    format!(
                        "✓ {} joined at position {}",
                        entry.participant.display_name(),
                        entry.sequence_key
                    )
                    .green()
                    .bold()
                );
                if entry.sequence_key == 1 {
                    println!("  It's your turn.");
                }
            }
            EnqueueOutcome::AlreadyQueued => {
                println!("{}", "Already in the queue (or already went)".yellow());
            }
            EnqueueOutcome::InvalidIdentity => {
                println!(
                    "{}",
                    "No identity given: pass --id or set NEXTUP_USER_ID".yellow()
                );
            }
        },

        Commands::Next => match service.advance().await? {
            Some(done) => {
                println!(
                    "{}",
                    format!("✓ {} is done", done.display_name()).green().bold()
                );
                match service.active_participant().await? {
                    Some(next) => println!("  Up next: {}", next.display_name().cyan().bold()),
                    None => println!("  {}", "Nobody left in the queue".yellow()),
                }
            }
            None => println!("{}", "Nobody is waiting".yellow()),
        },

        Commands::Reset { .. } => {
            let summary = service.reset().await?;
            println!("{}", "✓ Queue reset".green().bold());
            println!("  {} waiting cleared", summary.waiting_cleared);
            if summary.history_cleared > 0 {
                println!("  {} history cleared", summary.history_cleared);
            }
        }

        Commands::Show { json } => {
            let view = service.view().await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
                return Ok(());
            }

            println!("{}", render::active_line(&view).cyan().bold());
            println!();

            println!("{}", format!("Waiting ({})", view.waiting_count()).bold());
            match render::rows_table(&view.waiting_rows) {
                Some(table) => println!("{}", table),
                None => println!("  {}", "nobody".dimmed()),
            }
            println!();

            println!("{}", format!("Already went ({})", view.history_count()).bold());
            match render::rows_table(&view.history_rows) {
                Some(table) => println!("{}", table),
                None => println!("  {}", "nobody".dimmed()),
            }
        }

        Commands::Status => {
            let snapshot = service.snapshot().await?;
            let config = service.config();

            println!("{}", "Queue Status".cyan().bold());
            println!();
            println!(
                "{}",
                render::status_table(StatusRow {
                    queue: config.name.clone(),
                    state: snapshot.state(),
                    waiting: snapshot.waiting.len(),
                    history: snapshot.history.len(),
                    reset_mode: config.reset_mode.to_string(),
                    duplicates: config.allow_duplicates,
                })
            );
            println!("  {} {}", "DB:".bold(), cli.settings.database_url());
        }
    }

    Ok(())
}
