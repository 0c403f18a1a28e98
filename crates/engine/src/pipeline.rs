//! One reminder run: occurrences, classification, aggregation.

use chrono::NaiveDate;
use indexmap::IndexMap;

use bday_core::{CalendarError, ChannelId, RecurringRecord};

use crate::aggregator::aggregate;
use crate::matcher::classify;
use crate::notice::DueNotice;
use crate::occurrence::next_occurrence;

/// A record left out of a run because its occurrence could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub channel: ChannelId,
    pub person_name: String,
    pub error: CalendarError,
}

/// Output of [`run`]. `messages` has one rendered body per channel with at
/// least one due notice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub messages: IndexMap<ChannelId, String>,
    pub due_count: usize,
    pub skipped: Vec<SkippedRecord>,
}

impl RunReport {
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Due notices for `today`, in input order, plus records that were skipped.
pub fn collect_due(
    today: NaiveDate,
    records: &[RecurringRecord],
) -> (Vec<(ChannelId, DueNotice)>, Vec<SkippedRecord>) {
    let mut due = Vec::new();
    let mut skipped = Vec::new();

    for record in records {
        let occurrence = match next_occurrence(record.month_day, today) {
            Ok(date) => date,
            Err(error) => {
                skipped.push(SkippedRecord {
                    channel: record.channel,
                    person_name: record.person_name.clone(),
                    error,
                });
                continue;
            }
        };

        if let Some(hit) = classify(occurrence, today, record.lead_days) {
            due.push((
                record.channel,
                DueNotice {
                    person_name: record.person_name.clone(),
                    occurrence,
                    days_until: hit.days_until,
                    kind: hit.kind,
                },
            ));
        }
    }

    (due, skipped)
}

/// Evaluate a snapshot of records against a single reference date.
///
/// `today` must be derived once by the caller and shared by the whole run.
/// A record that cannot be resolved is skipped and the run continues.
pub fn run(today: NaiveDate, records: &[RecurringRecord]) -> RunReport {
    let (due, skipped) = collect_due(today, records);
    let due_count = due.len();
    RunReport {
        messages: aggregate(due),
        due_count,
        skipped,
    }
}
