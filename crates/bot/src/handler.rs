//! Executes chat commands against the store and the reminder runner.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};

use bday_core::ChannelId;
use bday_store::{read_csv_file, BirthdayStore, NewBirthday};

use crate::commands::{AddArgs, Command};
use crate::trigger::ReminderRunner;

pub const GREETING: &str = "Hello! I remind this chat about birthdays.\n\
    /add Name YYYY-MM-DD [days_before] — add a birthday\n\
    /list — show birthdays of this chat\n\
    /remove <id|Name> — remove a birthday\n\
    /import_local — import the CSV file next to the bot\n\
    /test_now — send all due reminders now";
pub const ADD_USAGE: &str = "Usage: /add Name YYYY-MM-DD [days_before]";
pub const REMOVE_USAGE: &str = "Usage: /remove <id|Name>";
pub const BAD_DATE: &str = "Date must be in YYYY-MM-DD format";
pub const EMPTY_LIST: &str = "Nothing here yet. Add someone with /add";
pub const RUN_DONE: &str = "✓ Checked and sent all due reminders.";

/// Turns a parsed [`Command`] into store operations and a reply text.
pub struct CommandHandler {
    store: BirthdayStore,
    runner: Arc<ReminderRunner>,
    import_path: PathBuf,
}

impl CommandHandler {
    pub fn new(store: BirthdayStore, runner: Arc<ReminderRunner>, import_path: PathBuf) -> Self {
        Self {
            store,
            runner,
            import_path,
        }
    }

    /// Handle one command from `chat` and return the reply.
    pub async fn handle(&self, chat: ChannelId, command: Command) -> Result<String> {
        match command {
            Command::Start => Ok(GREETING.to_string()),
            Command::Add(None) => Ok(ADD_USAGE.to_string()),
            Command::Add(Some(args)) => self.add(chat, args).await,
            Command::List => self.list(chat).await,
            Command::Remove(None) => Ok(REMOVE_USAGE.to_string()),
            Command::Remove(Some(ident)) => {
                let removed = self.store.remove(chat, &ident).await?;
                let reply = if removed > 0 { "Removed." } else { "Nothing found." };
                Ok(reply.to_string())
            }
            Command::ImportLocal => Ok(self.import_local(chat).await),
            Command::TestNow => {
                let summary = self.runner.run_now(Utc::now()).await?;
                info!(chat_id = %chat, due = summary.due, "on-demand reminder run");
                Ok(RUN_DONE.to_string())
            }
        }
    }

    async fn add(&self, chat: ChannelId, args: AddArgs) -> Result<String> {
        let Some(date) = NewBirthday::parse_date(&args.date) else {
            return Ok(BAD_DATE.to_string());
        };
        let entry = match NewBirthday::new(&args.name, date, args.days_before) {
            Ok(entry) => entry,
            Err(_) => return Ok(ADD_USAGE.to_string()),
        };

        let inserted = self.store.add(chat, &entry).await?;
        let date = entry.date.format("%Y-%m-%d");
        Ok(if inserted {
            format!("OK, added: {} — {} ({} d. ahead)", entry.name, date, entry.days_before)
        } else {
            format!("Already on the list: {} — {}", entry.name, date)
        })
    }

    async fn list(&self, chat: ChannelId) -> Result<String> {
        let rows = self.store.list(chat).await?;
        if rows.is_empty() {
            return Ok(EMPTY_LIST.to_string());
        }
        let lines: Vec<String> = rows
            .iter()
            .map(|r| format!("#{} {} — {} ({} d. ahead)", r.id, r.name, r.date, r.days_before))
            .collect();
        Ok(format!("Birthdays:\n{}", lines.join("\n")))
    }

    /// Import failures are reported to the chat, not propagated.
    async fn import_local(&self, chat: ChannelId) -> String {
        if !self.import_path.exists() {
            return format!("File {} not found next to the bot.", self.import_path.display());
        }

        let batch = match read_csv_file(&self.import_path) {
            Ok(batch) => batch,
            Err(e) => {
                warn!(path = %self.import_path.display(), error = %e, "CSV import rejected");
                return format!("Import failed: {e}");
            }
        };

        match self.store.import(chat, &batch.entries).await {
            Ok(added) if batch.skipped > 0 => {
                format!("Imported: {added} (skipped {} bad rows)", batch.skipped)
            }
            Ok(added) => format!("Imported: {added}"),
            Err(e) => {
                warn!(chat_id = %chat, error = %e, "CSV import failed");
                format!("Import failed: {e}")
            }
        }
    }
}
