use std::env;
use std::path::PathBuf;

use chrono_tz::Tz;

use crate::error::CoreError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

/// Load a specific env file. Unlike [`load_dotenv`], a missing file is an error.
pub fn load_dotenv_from(path: &str) -> Result<(), CoreError> {
    dotenvy::from_filename(path)
        .map(|_| ())
        .map_err(|e| CoreError::Config(format!("failed to load env file '{path}': {e}")))
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

pub const DEFAULT_TIMEZONE: &str = "Asia/Almaty";
pub const DEFAULT_SCHEDULE: &str = "0 9 * * *";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

// ── Top-level config ──────────────────────────────────────────

/// Process-wide configuration, built once at startup and passed down by value.
#[derive(Debug, Clone)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub schedule: ScheduleConfig,
    pub storage: StorageConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(env_opt)
    }

    /// Build config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Ok(Self {
            telegram: TelegramConfig::from_lookup(&get)?,
            schedule: ScheduleConfig::from_lookup(&get)?,
            storage: StorageConfig::from_lookup(&get),
        })
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!(
            "  telegram:  api_url={}, poll_timeout={}s, token={}",
            self.telegram.api_url,
            self.telegram.poll_timeout_secs,
            match self.telegram.bot_token.as_deref() {
                None => "(not set)",
                Some(t) if t.starts_with("${") => "(env ref)",
                Some(_) => "(set)",
            }
        );
        tracing::info!(
            "  schedule:  cron=\"{}\", timezone={}",
            self.schedule.cron,
            self.schedule.timezone
        );
        tracing::info!(
            "  storage:   db={}, import={}",
            self.storage.db_path.display(),
            self.storage.import_path.display()
        );
    }
}

// ── Telegram ──────────────────────────────────────────────────

#[derive(Clone)]
pub struct TelegramConfig {
    /// Bot token, or a `${VAR}` reference resolved by the notifier.
    /// Only commands that talk to Telegram need it.
    pub bot_token: Option<String>,
    pub api_url: String,
    pub poll_timeout_secs: u64,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .finish()
    }
}

impl TelegramConfig {
    /// The configured token, or an error naming the missing variable.
    pub fn require_token(&self) -> Result<&str, CoreError> {
        self.bot_token
            .as_deref()
            .ok_or_else(|| CoreError::Config("BOT_TOKEN is not set".to_string()))
    }

    fn from_lookup(get: &dyn Fn(&str) -> Option<String>) -> Result<Self, CoreError> {
        let bot_token = get("BOT_TOKEN");
        let poll_timeout_secs = match get("TELEGRAM_POLL_TIMEOUT") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                CoreError::Config(format!("TELEGRAM_POLL_TIMEOUT must be seconds, got '{raw}'"))
            })?,
            None => 30,
        };
        Ok(Self {
            bot_token,
            api_url: get("TELEGRAM_API_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string()),
            poll_timeout_secs,
        })
    }
}

// ── Schedule ──────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    /// Single reference timezone used to derive "today" for every run.
    pub timezone: Tz,
    /// 5- or 6-field cron expression evaluated in `timezone`.
    pub cron: String,
}

impl ScheduleConfig {
    fn from_lookup(get: &dyn Fn(&str) -> Option<String>) -> Result<Self, CoreError> {
        let tz_name = get("BDAY_TIMEZONE").unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        Ok(Self {
            timezone: parse_timezone(&tz_name)?,
            cron: get("BDAY_SCHEDULE").unwrap_or_else(|| DEFAULT_SCHEDULE.to_string()),
        })
    }
}

/// Parse an IANA timezone name (e.g. "Asia/Almaty", "UTC").
pub fn parse_timezone(name: &str) -> Result<Tz, CoreError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| CoreError::Config(format!("unknown timezone '{name}': {e}")))
}

// ── Storage ───────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub db_path: PathBuf,
    /// CSV file read by the `/import_local` command.
    pub import_path: PathBuf,
}

impl StorageConfig {
    fn from_lookup(get: &dyn Fn(&str) -> Option<String>) -> Self {
        Self {
            db_path: PathBuf::from(get("BDAY_DB").unwrap_or_else(|| "birthdays.db".to_string())),
            import_path: PathBuf::from(
                get("BDAY_IMPORT_PATH").unwrap_or_else(|| "birthdays.csv".to_string()),
            ),
        }
    }
}
