//! CSV import of birthdays.
//!
//! Accepts the spreadsheets people actually export: comma, semicolon, pipe or
//! tab separated, optional UTF-8 BOM, English or Russian header names, and
//! quoted fields (including embedded delimiters and line breaks). Rows that
//! cannot be understood are skipped and counted.

use std::path::Path;

use tracing::debug;

use crate::error::ImportError;
use crate::model::NewBirthday;

const DELIMITERS: [char; 4] = [',', ';', '|', '\t'];

const NAME_KEYS: &[&str] = &["name", "имя"];
const DATE_KEYS: &[&str] = &["date", "дата"];
const DAYS_KEYS: &[&str] = &["days_before", "daysbefore", "days", "дни", "за_дней"];

/// Parsed rows of one import file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportBatch {
    pub entries: Vec<NewBirthday>,
    /// Non-blank rows dropped for a missing name or a bad date.
    pub skipped: usize,
}

/// Read and parse a CSV file.
pub fn read_csv_file(path: &Path) -> Result<ImportBatch, ImportError> {
    let text = std::fs::read_to_string(path)?;
    parse_csv(&text)
}

/// Parse CSV text with a `name,date[,days_before]` header.
pub fn parse_csv(text: &str) -> Result<ImportBatch, ImportError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let header_line = text
        .lines()
        .find(|l| !l.trim().is_empty())
        .ok_or(ImportError::EmptyHeader)?;
    let delimiter = sniff_delimiter(header_line);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    let mut records = reader.records();

    let header = loop {
        match records.next() {
            Some(record) => {
                let record = record?;
                if !is_blank(&record) {
                    break record;
                }
            }
            None => return Err(ImportError::EmptyHeader),
        }
    };

    let keys: Vec<String> = header.iter().map(str::to_lowercase).collect();
    let find = |aliases: &[&str]| keys.iter().position(|k| aliases.iter().any(|a| *a == k.as_str()));

    let (name_idx, date_idx) = match (find(NAME_KEYS), find(DATE_KEYS)) {
        (Some(n), Some(d)) => (n, d),
        _ => {
            return Err(ImportError::MissingColumns {
                found: header.iter().map(str::to_string).collect(),
            })
        }
    };
    let days_idx = find(DAYS_KEYS);
    debug!(?delimiter, name_idx, date_idx, ?days_idx, "csv header resolved");

    let mut batch = ImportBatch::default();
    for record in records {
        let record = record?;
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        let name = cell(name_idx);
        let raw_date = cell(date_idx);
        if name.is_empty() && raw_date.is_empty() {
            continue;
        }

        let Some(date) = NewBirthday::parse_date(raw_date) else {
            batch.skipped += 1;
            continue;
        };
        let days = days_idx
            .map(cell)
            .and_then(|raw| raw.parse::<i64>().ok())
            .unwrap_or(0);

        match NewBirthday::new(name, date, days) {
            Ok(entry) => batch.entries.push(entry),
            Err(_) => batch.skipped += 1,
        }
    }
    Ok(batch)
}

fn is_blank(record: &csv::StringRecord) -> bool {
    record.iter().all(str::is_empty)
}

/// Pick the candidate delimiter occurring most often in the header line.
/// Ties go to the earlier candidate; no candidate at all means `,`.
fn sniff_delimiter(header: &str) -> char {
    let mut best = (',', 0usize);
    for candidate in DELIMITERS {
        let count = header.matches(candidate).count();
        if count > best.1 {
            best = (candidate, count);
        }
    }
    best.0
}
