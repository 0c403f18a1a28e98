//! Due notices produced by a single run.

use chrono::NaiveDate;

/// Which reminder fires for a record on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    /// The event is today.
    Today,
    /// The event is exactly `lead_days` ahead.
    Upcoming,
}

/// Result of classifying one occurrence against "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Due {
    pub kind: NoticeKind,
    pub days_until: u32,
}

/// A reminder for one person, ready for aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueNotice {
    pub person_name: String,
    pub occurrence: NaiveDate,
    pub days_until: u32,
    pub kind: NoticeKind,
}
