//! Recurrence-and-due-matching engine for yearly reminders.
//!
//! This crate provides:
//! - Date normalization for a recurring month/day in a given year (Feb 29 fallback)
//! - Next-occurrence calculation relative to a reference date
//! - Due classification under a per-record lead time
//! - Per-channel aggregation into deterministic message bodies
//!
//! Everything here is pure: no I/O, no clock reads, no logging. The caller
//! supplies "today" once per run.

pub mod aggregator;
pub mod matcher;
pub mod normalizer;
pub mod notice;
pub mod occurrence;
pub mod pipeline;

pub use aggregator::aggregate;
pub use matcher::classify;
pub use normalizer::{is_leap_year, resolve};
pub use notice::{Due, DueNotice, NoticeKind};
pub use occurrence::next_occurrence;
pub use pipeline::{run, RunReport, SkippedRecord};
