//! Resolves a recurring month/day into a concrete date for a given year.

use chrono::NaiveDate;

use bday_core::{CalendarError, MonthDay};

/// Gregorian leap year: divisible by 4, and not by 100 unless also by 400.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Resolve a raw `(month, day)` pair in `year`.
///
/// Fails if the pair is not a date in any year. Feb 29 falls back to Feb 28
/// outside leap years.
pub fn resolve(month: u32, day: u32, year: i32) -> Result<NaiveDate, CalendarError> {
    resolve_month_day(MonthDay::new(month, day)?, year)
}

/// Resolve an already validated [`MonthDay`] in `year`.
pub fn resolve_month_day(md: MonthDay, year: i32) -> Result<NaiveDate, CalendarError> {
    let day = if md.is_leap_day() && !is_leap_year(year) {
        28
    } else {
        md.day()
    };
    NaiveDate::from_ymd_opt(year, md.month(), day).ok_or(CalendarError::YearOutOfRange {
        year: i64::from(year),
    })
}
