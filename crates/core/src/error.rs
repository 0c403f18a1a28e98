use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

/// Calendar arithmetic failures.
///
/// Month/day pairs are validated when a [`MonthDay`](crate::MonthDay) is
/// built, so inside the engine only the year range can still fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("{month:02}-{day:02} is not a date in any year")]
    InvalidMonthDay { month: u32, day: u32 },

    #[error("year {year} is outside the supported calendar range")]
    YearOutOfRange { year: i64 },
}

pub type Result<T> = std::result::Result<T, CoreError>;
