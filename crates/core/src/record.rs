//! Recurring birthday records as seen by the reminder engine.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{CalendarError, CoreError};

/// Year used to validate month/day pairs. Being a leap year, it admits Feb 29.
const LEAP_REFERENCE_YEAR: i32 = 2000;

// ── ChannelId ─────────────────────────────────────────────────

/// Opaque identifier of a recipient channel (a Telegram chat id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub i64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ChannelId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

// ── MonthDay ──────────────────────────────────────────────────

/// A recurring calendar position: the same month and day every year.
///
/// Construction rejects pairs that are not a date in any year (`13-01`,
/// `04-31`). `02-29` is accepted and resolved per year by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "(u32, u32)", into = "(u32, u32)")]
pub struct MonthDay {
    month: u32,
    day: u32,
}

impl MonthDay {
    pub fn new(month: u32, day: u32) -> Result<Self, CalendarError> {
        if NaiveDate::from_ymd_opt(LEAP_REFERENCE_YEAR, month, day).is_none() {
            return Err(CalendarError::InvalidMonthDay { month, day });
        }
        Ok(Self { month, day })
    }

    /// Take month and day from a concrete date (e.g. a stored date of birth).
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            day: date.day(),
        }
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn day(self) -> u32 {
        self.day
    }

    pub fn is_leap_day(self) -> bool {
        self.month == 2 && self.day == 29
    }
}

impl TryFrom<(u32, u32)> for MonthDay {
    type Error = CalendarError;

    fn try_from((month, day): (u32, u32)) -> Result<Self, Self::Error> {
        Self::new(month, day)
    }
}

impl From<MonthDay> for (u32, u32) {
    fn from(md: MonthDay) -> Self {
        (md.month, md.day)
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

// ── RecurringRecord ───────────────────────────────────────────

/// One person's yearly event, owned by a channel.
///
/// Records are never merged: two records for the same person in the same
/// channel are evaluated independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringRecord {
    pub channel: ChannelId,
    pub person_name: String,
    pub month_day: MonthDay,
    /// Days before the event at which an advance reminder fires. `0` = day-of only.
    pub lead_days: u32,
}

impl RecurringRecord {
    /// Build a record, trimming the name. Fails if the name is empty.
    pub fn new(
        channel: ChannelId,
        person_name: &str,
        month_day: MonthDay,
        lead_days: u32,
    ) -> Result<Self, CoreError> {
        let person_name = person_name.trim();
        if person_name.is_empty() {
            return Err(CoreError::InvalidRecord(format!(
                "empty person name in channel {channel}"
            )));
        }
        Ok(Self {
            channel,
            person_name: person_name.to_string(),
            month_day,
            lead_days,
        })
    }
}

/// Normalize a raw lead time from an input path. Negative values become 0.
pub fn clamp_lead_days(raw: i64) -> u32 {
    raw.clamp(0, i64::from(u32::MAX)) as u32
}
