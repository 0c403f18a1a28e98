//! Row types and the ingestion contract shared by every input path.

use chrono::NaiveDate;

use bday_core::{clamp_lead_days, ChannelId, CoreError, MonthDay, RecurringRecord};

/// Storage format of the `date` column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A birthday as stored in the `birthdays` table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct BirthdayRow {
    pub id: i64,
    pub chat_id: i64,
    pub name: String,
    /// Full date of birth, `YYYY-MM-DD`.
    pub date: String,
    pub days_before: i64,
}

impl BirthdayRow {
    /// Convert to the engine's record type.
    ///
    /// Fails on an unparseable date or an empty name. A negative
    /// `days_before` is clamped to 0.
    pub fn to_record(&self) -> Result<RecurringRecord, CoreError> {
        let date = NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT).map_err(|e| {
            CoreError::InvalidRecord(format!("row {}: bad date '{}': {e}", self.id, self.date))
        })?;
        RecurringRecord::new(
            ChannelId(self.chat_id),
            &self.name,
            MonthDay::from_date(date),
            clamp_lead_days(self.days_before),
        )
    }
}

/// A validated birthday about to be inserted, from a chat command or an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBirthday {
    pub name: String,
    pub date: NaiveDate,
    pub days_before: u32,
}

impl NewBirthday {
    /// Trim the name, reject it if empty, clamp a negative lead time to 0.
    pub fn new(name: &str, date: NaiveDate, days_before: i64) -> Result<Self, CoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::InvalidRecord("empty name".to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            date,
            days_before: clamp_lead_days(days_before),
        })
    }

    /// Parse the `YYYY-MM-DD` date form used by commands and CSV files.
    pub fn parse_date(raw: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
    }
}

/// A stored row that could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRow {
    pub id: i64,
    pub chat_id: i64,
    pub reason: String,
}

/// A consistent view of every stored record at one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub records: Vec<RecurringRecord>,
    pub rejected: Vec<RejectedRow>,
}

impl Snapshot {
    /// Split rows into valid records and rejects, keeping row order.
    pub fn from_rows(rows: &[BirthdayRow]) -> Self {
        let mut snapshot = Self::default();
        for row in rows {
            match row.to_record() {
                Ok(record) => snapshot.records.push(record),
                Err(e) => snapshot.rejected.push(RejectedRow {
                    id: row.id,
                    chat_id: row.chat_id,
                    reason: e.to_string(),
                }),
            }
        }
        snapshot
    }
}
