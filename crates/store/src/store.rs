//! SQLite-backed birthday store.
//!
//! Rows are keyed by an autoincrement id and deduplicated on
//! `(chat_id, name, date)`: inserting an existing triple is a no-op.

use std::path::Path;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use bday_core::ChannelId;

use crate::error::Result;
use crate::model::{BirthdayRow, NewBirthday, Snapshot, DATE_FORMAT};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS birthdays(
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    chat_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    date TEXT NOT NULL,
    days_before INTEGER NOT NULL DEFAULT 0
)"#;

const CREATE_UNIQUE_INDEX: &str = "CREATE UNIQUE INDEX IF NOT EXISTS ux_birthdays_chat_name_date \
     ON birthdays(chat_id, name, date)";

const INSERT_OR_IGNORE: &str =
    "INSERT OR IGNORE INTO birthdays(chat_id, name, date, days_before) VALUES (?, ?, ?, ?)";

/// Source of the record snapshot a reminder run works on.
#[async_trait::async_trait]
pub trait RecordSource: Send + Sync {
    /// Read every stored record in one consistent pass.
    async fn snapshot(&self) -> Result<Snapshot>;
}

/// Birthday storage on top of a SQLite connection pool.
#[derive(Debug, Clone)]
pub struct BirthdayStore {
    pool: SqlitePool,
}

impl BirthdayStore {
    /// Open (creating if missing) the database file at `path`.
    pub async fn open(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;
        let store = Self { pool };
        store.migrate().await?;
        info!(path = %path.display(), "birthday store opened");
        Ok(store)
    }

    /// Private in-memory database, used by tests and dry runs.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        // One long-lived connection: every new in-memory connection is a new database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_UNIQUE_INDEX).execute(&self.pool).await?;
        Ok(())
    }

    /// Insert a birthday. Returns `false` if the same entry already existed.
    pub async fn add(&self, chat_id: ChannelId, entry: &NewBirthday) -> Result<bool> {
        let result = sqlx::query(INSERT_OR_IGNORE)
            .bind(chat_id.0)
            .bind(&entry.name)
            .bind(entry.date.format(DATE_FORMAT).to_string())
            .bind(i64::from(entry.days_before))
            .execute(&self.pool)
            .await?;
        let inserted = result.rows_affected() > 0;
        debug!(chat_id = %chat_id, name = %entry.name, inserted, "birthday add");
        Ok(inserted)
    }

    /// Insert a batch in one transaction. Returns how many rows were new.
    pub async fn import(&self, chat_id: ChannelId, entries: &[NewBirthday]) -> Result<usize> {
        let mut tx = self.pool.begin().await?;
        let mut added = 0usize;
        for entry in entries {
            let result = sqlx::query(INSERT_OR_IGNORE)
                .bind(chat_id.0)
                .bind(&entry.name)
                .bind(entry.date.format(DATE_FORMAT).to_string())
                .bind(i64::from(entry.days_before))
                .execute(&mut *tx)
                .await?;
            if result.rows_affected() > 0 {
                added += 1;
            }
        }
        tx.commit().await?;
        info!(chat_id = %chat_id, added, total = entries.len(), "birthdays imported");
        Ok(added)
    }

    /// All birthdays of one chat, ordered by date.
    pub async fn list(&self, chat_id: ChannelId) -> Result<Vec<BirthdayRow>> {
        let rows = sqlx::query_as::<_, BirthdayRow>(
            "SELECT id, chat_id, name, date, days_before FROM birthdays \
             WHERE chat_id = ? ORDER BY date, id",
        )
        .bind(chat_id.0)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Every stored birthday across all chats, in insertion order.
    pub async fn list_all(&self) -> Result<Vec<BirthdayRow>> {
        let rows = sqlx::query_as::<_, BirthdayRow>(
            "SELECT id, chat_id, name, date, days_before FROM birthdays ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Remove by id (all-digit `ident`) or by exact name otherwise.
    ///
    /// Returns the number of deleted rows. Only rows of `chat_id` are touched.
    pub async fn remove(&self, chat_id: ChannelId, ident: &str) -> Result<u64> {
        let ident = ident.trim();
        let by_id = if !ident.is_empty() && ident.chars().all(|c| c.is_ascii_digit()) {
            ident.parse::<i64>().ok()
        } else {
            None
        };

        let result = match by_id {
            Some(id) => {
                sqlx::query("DELETE FROM birthdays WHERE chat_id = ? AND id = ?")
                    .bind(chat_id.0)
                    .bind(id)
                    .execute(&self.pool)
                    .await?
            }
            None => {
                sqlx::query("DELETE FROM birthdays WHERE chat_id = ? AND name = ?")
                    .bind(chat_id.0)
                    .bind(ident)
                    .execute(&self.pool)
                    .await?
            }
        };
        let removed = result.rows_affected();
        debug!(chat_id = %chat_id, ident, removed, "birthday remove");
        Ok(removed)
    }
}

#[async_trait::async_trait]
impl RecordSource for BirthdayStore {
    async fn snapshot(&self) -> Result<Snapshot> {
        let rows = self.list_all().await?;
        Ok(Snapshot::from_rows(&rows))
    }
}
