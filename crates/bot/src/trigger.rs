//! Reminder runs: the daily cron trigger and the on-demand path share
//! [`ReminderRunner::run_now`].
//!
//! "Today" is derived once per run from the configured timezone and reused
//! for every record in the snapshot.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use bday_engine::RunReport;
use bday_notify::Dispatcher;
use bday_store::RecordSource;

use crate::cron::normalize_cron;

// ── Trigger ─────────────────────────────────────────────────────────

/// When the daily run fires: a cron schedule evaluated in one timezone.
#[derive(Debug, Clone)]
pub struct DailyTrigger {
    expression: String,
    schedule: ::cron::Schedule,
    timezone: Tz,
}

impl DailyTrigger {
    /// Build from a 5- or 6-field cron expression.
    pub fn new(expression: &str, timezone: Tz) -> Result<Self> {
        let expression = normalize_cron(expression).map_err(anyhow::Error::msg)?;
        let schedule = ::cron::Schedule::from_str(&expression)
            .with_context(|| format!("invalid cron expression '{expression}'"))?;
        Ok(Self {
            expression,
            schedule,
            timezone,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Next tick strictly after `now`, in local time.
    pub fn next_fire(&self, now: DateTime<Utc>) -> Option<DateTime<Tz>> {
        self.schedule
            .after(&now.with_timezone(&self.timezone))
            .next()
    }
}

// ── Runner ──────────────────────────────────────────────────────────

/// Outcome of one reminder run, for logs and command replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub today: NaiveDate,
    pub due: usize,
    pub channels: usize,
    pub delivered: usize,
    pub failed: usize,
    pub skipped: usize,
    pub rejected: usize,
}

/// Takes a snapshot, runs the engine, and hands bodies to the dispatcher.
pub struct ReminderRunner {
    source: Arc<dyn RecordSource>,
    dispatcher: Dispatcher,
    timezone: Tz,
}

impl ReminderRunner {
    pub fn new(source: Arc<dyn RecordSource>, dispatcher: Dispatcher, timezone: Tz) -> Self {
        Self {
            source,
            dispatcher,
            timezone,
        }
    }

    /// Local calendar date of `now` in the configured timezone.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.timezone).date_naive()
    }

    /// Evaluate the current snapshot for `today` without delivering anything.
    pub async fn preview(&self, today: NaiveDate) -> Result<(RunReport, usize)> {
        let snapshot = self
            .source
            .snapshot()
            .await
            .context("failed to read birthday snapshot")?;

        for row in &snapshot.rejected {
            warn!(
                row_id = row.id,
                chat_id = row.chat_id,
                reason = %row.reason,
                "skipping malformed stored birthday"
            );
        }

        let report = bday_engine::run(today, &snapshot.records);
        for skipped in &report.skipped {
            warn!(
                chat_id = %skipped.channel,
                name = %skipped.person_name,
                error = %skipped.error,
                "skipping record without a resolvable occurrence"
            );
        }
        Ok((report, snapshot.rejected.len()))
    }

    /// Run for an explicit reference date and deliver the result.
    pub async fn run_for_date(&self, today: NaiveDate) -> Result<RunSummary> {
        let (report, rejected) = self.preview(today).await?;
        let results = self.dispatcher.deliver(&report.messages).await;
        let delivered = results.iter().filter(|r| r.success).count();

        let summary = RunSummary {
            today,
            due: report.due_count,
            channels: report.messages.len(),
            delivered,
            failed: results.len() - delivered,
            skipped: report.skipped.len(),
            rejected,
        };
        info!(
            today = %summary.today,
            due = summary.due,
            channels = summary.channels,
            delivered = summary.delivered,
            failed = summary.failed,
            skipped = summary.skipped,
            rejected = summary.rejected,
            "reminder run finished"
        );
        Ok(summary)
    }

    /// Run for the local date of `now`.
    pub async fn run_now(&self, now: DateTime<Utc>) -> Result<RunSummary> {
        self.run_for_date(self.today(now)).await
    }
}

// ── Timer loop ──────────────────────────────────────────────────────

/// Sleep until each cron tick and run reminders, until `shutdown` flips to true.
pub async fn run_daily(
    trigger: DailyTrigger,
    runner: Arc<ReminderRunner>,
    mut shutdown: watch::Receiver<bool>,
) {
    info!(
        cron = %trigger.expression(),
        timezone = %trigger.timezone(),
        "daily reminder trigger registered"
    );

    loop {
        if *shutdown.borrow() {
            break;
        }

        let now = Utc::now();
        let Some(next) = trigger.next_fire(now) else {
            warn!(cron = %trigger.expression(), "cron schedule has no future ticks, trigger stopped");
            break;
        };
        let wait = (next.with_timezone(&Utc) - now)
            .to_std()
            .unwrap_or(Duration::ZERO);
        debug!(next = %next, wait_secs = wait.as_secs(), "next reminder run scheduled");

        tokio::select! {
            _ = tokio::time::sleep(wait) => {
                if let Err(e) = runner.run_now(Utc::now()).await {
                    error!(error = %e, "scheduled reminder run failed");
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    info!("daily reminder trigger stopped");
}
