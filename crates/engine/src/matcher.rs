//! Due classification under a per-record lead time.

use chrono::NaiveDate;

use crate::notice::{Due, NoticeKind};

/// Classify an occurrence relative to `today`.
///
/// - `days_until == 0` is [`NoticeKind::Today`] whatever the lead time.
/// - `days_until == lead_days` with `lead_days > 0` is [`NoticeKind::Upcoming`].
/// - Anything else, including an occurrence before `today`, is not due.
///
/// With `lead_days == 0` only the day-of reminder can fire.
pub fn classify(occurrence: NaiveDate, today: NaiveDate, lead_days: u32) -> Option<Due> {
    let days_until = u32::try_from(occurrence.signed_duration_since(today).num_days()).ok()?;
    if days_until == 0 {
        Some(Due {
            kind: NoticeKind::Today,
            days_until,
        })
    } else if lead_days > 0 && days_until == lead_days {
        Some(Due {
            kind: NoticeKind::Upcoming,
            days_until,
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn today_regardless_of_lead() {
        let d = date(2024, 4, 10);
        for lead in [0, 1, 3, 30] {
            assert_eq!(
                classify(d, d, lead),
                Some(Due { kind: NoticeKind::Today, days_until: 0 })
            );
        }
    }

    #[test]
    fn upcoming_when_lead_matches() {
        assert_eq!(
            classify(date(2024, 4, 10), date(2024, 4, 7), 3),
            Some(Due { kind: NoticeKind::Upcoming, days_until: 3 })
        );
    }

    #[test]
    fn not_due_between_lead_and_event() {
        assert_eq!(classify(date(2024, 4, 10), date(2024, 4, 8), 3), None);
        assert_eq!(classify(date(2024, 4, 10), date(2024, 4, 6), 3), None);
    }

    #[test]
    fn zero_lead_never_upcoming() {
        let today = date(2024, 1, 1);
        for offset in 1..=366 {
            let occurrence = today + chrono::Duration::days(offset);
            assert_eq!(classify(occurrence, today, 0), None);
        }
    }

    #[test]
    fn past_occurrence_not_due() {
        assert_eq!(classify(date(2024, 4, 9), date(2024, 4, 10), 1), None);
    }

    #[test]
    fn long_lead_across_year_boundary() {
        assert_eq!(
            classify(date(2025, 1, 5), date(2024, 12, 6), 30),
            Some(Due { kind: NoticeKind::Upcoming, days_until: 30 })
        );
    }
}
