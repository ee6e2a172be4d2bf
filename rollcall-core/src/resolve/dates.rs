//! Excel date-serial conversion and date-header pattern matching

use chrono::{Duration, NaiveDate};
use regex::Regex;
use std::sync::OnceLock;

/// Heuristic window for treating a bare number as an Excel date serial.
/// The range is a guess, not a format guarantee; keep it here so it can be
/// tuned without touching header resolution.
pub const SERIAL_MIN: f64 = 1.0;
pub const SERIAL_MAX: f64 = 100_000.0;

const MS_PER_DAY: f64 = 86_400_000.0;

pub fn looks_like_serial(value: f64) -> bool {
    value > SERIAL_MIN && value < SERIAL_MAX
}

/// Convert an Excel date serial (days since Dec 30, 1899) to a calendar date.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * MS_PER_DAY).round() as i64;
    epoch
        .checked_add_signed(Duration::milliseconds(millis))
        .map(|dt| dt.date())
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

static DATE_HEADER_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

fn date_header_patterns() -> &'static [Regex] {
    DATE_HEADER_PATTERNS.get_or_init(|| {
        [
            r"^\d{4}-\d{1,2}-\d{1,2}$", // YYYY-MM-DD
            r"^\d{1,2}-\d{1,2}-\d{4}$", // DD-MM-YYYY
            r"^\d{4}/\d{1,2}/\d{1,2}$", // YYYY/MM/DD
            r"^\d{1,2}/\d{1,2}/\d{4}$", // MM/DD/YYYY or DD/MM/YYYY, accepted either way
        ]
        .iter()
        .map(|pattern| Regex::new(pattern).unwrap())
        .collect()
    })
}

/// Whether a normalized header names a calendar date.
///
/// Beyond the explicit patterns there is a broad fallback: any `-` or `/`
/// separated string of at least two all-numeric parts. Headers matching
/// neither are ignored by the resolver, never fatal.
pub fn is_date_header(header: &str) -> bool {
    let trimmed = header.trim();
    if trimmed.is_empty() {
        return false;
    }

    if date_header_patterns().iter().any(|re| re.is_match(trimmed)) {
        return true;
    }

    let separator = if trimmed.contains('-') {
        '-'
    } else if trimmed.contains('/') {
        '/'
    } else {
        return false;
    };

    let parts: Vec<&str> = trimmed.split(separator).collect();
    parts.len() >= 2
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}
