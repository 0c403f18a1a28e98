use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::info;

use bday_bot::handler::CommandHandler;
use bday_bot::poller::poll_commands;
use bday_bot::trigger::{run_daily, DailyTrigger, ReminderRunner};
use bday_core::{ChannelId, Config};
use bday_notify::{Dispatcher, Notifier, NotifyError, TelegramNotifier};
use bday_store::{read_csv_file, BirthdayStore};

// ── CLI ─────────────────────────────────────────────────────────────

/// Birthday reminder bot for Telegram chats.
#[derive(Parser, Debug)]
#[command(name = "bday-bot", version, about)]
struct Cli {
    /// Env file to load instead of `./.env`.
    #[arg(long, env = "BDAY_ENV_FILE")]
    env_file: Option<String>,

    /// SQLite database path (overrides BDAY_DB).
    #[arg(long)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the daily trigger and answer chat commands (default).
    Serve,
    /// Evaluate reminders once and deliver them.
    RunOnce {
        /// Reference date (YYYY-MM-DD); defaults to today in the configured timezone.
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Print messages to stdout instead of sending them.
        #[arg(long)]
        dry_run: bool,
    },
    /// Import a CSV file into one chat.
    Import {
        path: PathBuf,
        #[arg(long, allow_negative_numbers = true)]
        chat: i64,
    },
}

// ── Dry-run transport ───────────────────────────────────────────────

struct StdoutNotifier;

#[async_trait]
impl Notifier for StdoutNotifier {
    async fn send(&self, channel: ChannelId, text: &str) -> Result<(), NotifyError> {
        println!("── chat {channel} ──\n{text}\n");
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "stdout"
    }
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.env_file.as_deref() {
        Some(path) => bday_core::config::load_dotenv_from(path)?,
        None => bday_core::config::load_dotenv(),
    }
    let mut config = Config::from_env().context("failed to load configuration")?;
    if let Some(db) = cli.db {
        config.storage.db_path = db;
    }
    config.log_summary();

    let store = BirthdayStore::open(&config.storage.db_path)
        .await
        .with_context(|| format!("failed to open {}", config.storage.db_path.display()))?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config, store).await,
        Commands::RunOnce { date, dry_run } => run_once(config, store, date, dry_run).await,
        Commands::Import { path, chat } => import(store, &path, ChannelId(chat)).await,
    }
}

fn telegram(config: &Config) -> Result<Arc<TelegramNotifier>> {
    let token = config.telegram.require_token()?;
    let notifier =
        TelegramNotifier::from_config(token.to_string(), config.telegram.api_url.clone(), None)
            .context("failed to set up Telegram transport")?;
    Ok(Arc::new(notifier))
}

async fn serve(config: Config, store: BirthdayStore) -> Result<()> {
    let telegram = telegram(&config)?;
    let trigger = DailyTrigger::new(&config.schedule.cron, config.schedule.timezone)?;

    let runner = Arc::new(ReminderRunner::new(
        Arc::new(store.clone()),
        Dispatcher::new(telegram.clone()),
        config.schedule.timezone,
    ));
    let handler = Arc::new(CommandHandler::new(
        store,
        runner.clone(),
        config.storage.import_path.clone(),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let daily = tokio::spawn(run_daily(trigger, runner, shutdown_rx.clone()));
    let poller = tokio::spawn(poll_commands(
        telegram,
        handler,
        config.telegram.poll_timeout_secs,
        shutdown_rx,
    ));

    info!("bday-bot running, press Ctrl+C to stop");
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("shutdown requested");

    shutdown_tx.send(true).ok();
    let _ = tokio::join!(daily, poller);
    info!("bday-bot exited cleanly");
    Ok(())
}

async fn run_once(
    config: Config,
    store: BirthdayStore,
    date: Option<NaiveDate>,
    dry_run: bool,
) -> Result<()> {
    let transport: Arc<dyn Notifier> = if dry_run {
        Arc::new(StdoutNotifier)
    } else {
        telegram(&config)?
    };
    let runner = ReminderRunner::new(
        Arc::new(store),
        Dispatcher::new(transport),
        config.schedule.timezone,
    );

    let today = date.unwrap_or_else(|| runner.today(Utc::now()));
    let summary = runner.run_for_date(today).await?;
    if summary.failed > 0 {
        anyhow::bail!("{} of {} channels failed", summary.failed, summary.channels);
    }
    Ok(())
}

async fn import(store: BirthdayStore, path: &std::path::Path, chat: ChannelId) -> Result<()> {
    let batch = read_csv_file(path).with_context(|| format!("failed to import {}", path.display()))?;
    let added = store.import(chat, &batch.entries).await?;
    info!(
        chat_id = %chat,
        added,
        duplicates = batch.entries.len() - added,
        skipped = batch.skipped,
        "CSV import finished"
    );
    println!("Imported: {added} (skipped {} bad rows)", batch.skipped);
    Ok(())
}
