//! Birthday storage and bulk import.
//!
//! This crate provides:
//! - `BirthdayStore`: SQLite-backed create/list/remove plus consistent snapshots
//! - `RecordSource` trait: the snapshot contract the reminder run depends on
//! - CSV import with delimiter sniffing and header aliases

pub mod error;
pub mod import;
pub mod model;
pub mod store;

pub use error::{ImportError, Result, StoreError};
pub use import::{parse_csv, read_csv_file, ImportBatch};
pub use model::{BirthdayRow, NewBirthday, RejectedRow, Snapshot};
pub use store::{BirthdayStore, RecordSource};
