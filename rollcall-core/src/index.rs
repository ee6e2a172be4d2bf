//! File locator: picks the newest monthly workbook from the CSV index
//!
//! The index is a CSV with at least `Name` and `FileId` columns, one row per
//! monthly export. Rows still waiting on the drive sync carry a sentinel
//! `FileId` and are skipped.

use crate::error::IngestError;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use tracing::{debug, info};

/// FileId placeholder for rows whose workbook has not synced yet.
pub const PENDING_SENTINEL: &str = "PENDING_SYNC";

static NAME_PATTERN: OnceLock<Regex> = OnceLock::new();

fn name_pattern() -> &'static Regex {
    NAME_PATTERN.get_or_init(|| Regex::new(r"Attendance_(\d{4})_(\d{2})").unwrap())
}

/// One valid row of the file index, after filtering and name parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileIndexEntry {
    pub name: String,
    pub file_id: String,
    pub year: u16,
    pub month: u8,
}

#[derive(Debug, Deserialize)]
struct RawIndexRow {
    #[serde(rename = "Name", default)]
    name: String,
    #[serde(rename = "FileId", default)]
    file_id: String,
}

/// Parse the index CSV into valid entries, dropping pending, malformed-name
/// and empty-id rows.
pub fn parse_index(csv_text: &str) -> Result<Vec<FileIndexEntry>, IngestError> {
    let mut reader = csv::Reader::from_reader(csv_text.as_bytes());
    let mut entries = Vec::new();

    for row in reader.deserialize::<RawIndexRow>() {
        let row = row?;
        let name = row.name.trim();
        let file_id = row.file_id.trim();

        if file_id.is_empty() || file_id == PENDING_SENTINEL || !name.starts_with("Attendance_") {
            continue;
        }

        let Some(caps) = name_pattern().captures(name) else {
            debug!(name, "index row name does not match Attendance_YYYY_MM, skipping");
            continue;
        };
        // Both groups are all-digit by construction of the pattern.
        let year: u16 = caps[1].parse().unwrap_or(0);
        let month: u8 = caps[2].parse().unwrap_or(0);

        entries.push(FileIndexEntry {
            name: name.to_string(),
            file_id: file_id.to_string(),
            year,
            month,
        });
    }

    debug!(valid = entries.len(), "index parsed");
    Ok(entries)
}

/// Pick the fileId of the most recent valid entry by (year, month).
pub fn locate_latest(csv_text: &str) -> Result<String, IngestError> {
    let mut entries = parse_index(csv_text)?;
    entries.sort_by(|a, b| (b.year, b.month).cmp(&(a.year, a.month)));

    match entries.first() {
        Some(latest) => {
            info!(name = %latest.name, file_id = %latest.file_id, "latest attendance file selected");
            Ok(latest.file_id.clone())
        }
        None => Err(IngestError::NoIndexEntry),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIXED_INDEX: &str = "\
Name,FileId
Attendance_2024_05,id-may
Attendance_2024_06,id-june
Attendance_2024_07,PENDING_SYNC
Attendance_2023_12,id-dec
Budget_2024_06,id-budget
Attendance_garbled,id-bad
,id-noname
Attendance_2024_04,
";

    #[test]
    fn picks_latest_valid_entry() {
        let file_id = locate_latest(MIXED_INDEX).unwrap();
        // 2024_07 is pending, so 2024_06 wins.
        assert_eq!(file_id, "id-june");
    }

    #[test]
    fn year_beats_month() {
        let csv = "Name,FileId\nAttendance_2023_12,old\nAttendance_2024_01,new\n";
        assert_eq!(locate_latest(csv).unwrap(), "new");
    }

    #[test]
    fn drops_pending_malformed_and_empty_rows() {
        let entries = parse_index(MIXED_INDEX).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Attendance_2024_05", "Attendance_2024_06", "Attendance_2023_12"]
        );
    }

    #[test]
    fn empty_index_is_an_error() {
        let err = locate_latest("Name,FileId\n").unwrap_err();
        assert!(matches!(err, IngestError::NoIndexEntry));
    }

    #[test]
    fn fields_are_trimmed() {
        let csv = "Name,FileId\n  Attendance_2024_06  ,  id-june  \n";
        let entries = parse_index(csv).unwrap();
        assert_eq!(entries[0].file_id, "id-june");
        assert_eq!(entries[0].year, 2024);
        assert_eq!(entries[0].month, 6);
    }
}
