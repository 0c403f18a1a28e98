//! Error types for storage and import.

/// Errors raised by [`BirthdayStore`](crate::BirthdayStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    #[error(transparent)]
    Core(#[from] bday_core::CoreError),
}

/// Errors raised while reading a CSV import file.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("could not read CSV headers")]
    EmptyHeader,

    #[error("expected columns name,date[,days_before]; found: {}", found.join(", "))]
    MissingColumns { found: Vec<String> },
}

/// Result alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
