//! Next concrete occurrence of a recurring month/day.

use chrono::{Datelike, NaiveDate};

use bday_core::{CalendarError, MonthDay};

use crate::normalizer::resolve_month_day;

/// Next date on or after `today` that falls on `md`.
///
/// Tries the current year first, then the following one. The Feb 29
/// fallback is applied to whichever year is chosen, so a leap-day birthday
/// rolling into a common year lands on Feb 28. The result lies within
/// `[today, today + 366 days]`.
pub fn next_occurrence(md: MonthDay, today: NaiveDate) -> Result<NaiveDate, CalendarError> {
    let candidate = resolve_month_day(md, today.year())?;
    if candidate >= today {
        return Ok(candidate);
    }
    resolve_month_day(md, today.year() + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn md(m: u32, d: u32) -> MonthDay {
        MonthDay::new(m, d).unwrap()
    }

    #[test]
    fn later_this_year() {
        assert_eq!(next_occurrence(md(4, 10), date(2024, 4, 7)).unwrap(), date(2024, 4, 10));
    }

    #[test]
    fn same_day_is_today() {
        assert_eq!(next_occurrence(md(4, 10), date(2024, 4, 10)).unwrap(), date(2024, 4, 10));
    }

    #[test]
    fn already_passed_rolls_to_next_year() {
        assert_eq!(next_occurrence(md(4, 10), date(2024, 4, 11)).unwrap(), date(2025, 4, 10));
        assert_eq!(next_occurrence(md(1, 1), date(2024, 12, 31)).unwrap(), date(2025, 1, 1));
    }

    #[test]
    fn leap_day_in_leap_year() {
        assert_eq!(next_occurrence(md(2, 29), date(2024, 2, 29)).unwrap(), date(2024, 2, 29));
        assert_eq!(next_occurrence(md(2, 29), date(2024, 1, 15)).unwrap(), date(2024, 2, 29));
    }

    #[test]
    fn leap_day_rolls_into_common_year() {
        assert_eq!(next_occurrence(md(2, 29), date(2024, 3, 1)).unwrap(), date(2025, 2, 28));
    }

    #[test]
    fn leap_day_in_common_year_uses_feb_28() {
        assert_eq!(next_occurrence(md(2, 29), date(2023, 2, 28)).unwrap(), date(2023, 2, 28));
        assert_eq!(next_occurrence(md(2, 29), date(2023, 3, 1)).unwrap(), date(2024, 2, 29));
    }

    #[test]
    fn leap_day_rolls_into_leap_year() {
        assert_eq!(next_occurrence(md(2, 29), date(2027, 3, 1)).unwrap(), date(2028, 2, 29));
    }

    #[test]
    fn end_of_calendar_is_an_error() {
        assert!(matches!(
            next_occurrence(md(1, 1), NaiveDate::MAX),
            Err(CalendarError::YearOutOfRange { .. })
        ));
    }
}
