//! Schema resolver: header-row discovery, header normalization, column roles
//!
//! Exports prepend a varying number of title and blank rows, so the header
//! row is located by content (searching for the anchor column name) rather
//! than by position. Header cells themselves arrive as strings, date-typed
//! cells, or bare Excel date serials; all are normalized into canonical
//! column names before any row is materialized.

use crate::error::IngestError;
use crate::reader::{CellValue, SheetData};
use std::collections::HashMap;
use tracing::{debug, info, warn};

pub mod dates;

/// Column name whose presence (case-insensitive) marks the header row.
pub const HEADER_ANCHOR: &str = "EMPLOYEECODE";

/// The six identity columns every export is expected to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardColumn {
    EmployeeCode,
    EmployeeName,
    DepartmentName,
    Designation,
    Location,
    Shift,
}

impl StandardColumn {
    pub const ALL: [StandardColumn; 6] = [
        StandardColumn::EmployeeCode,
        StandardColumn::EmployeeName,
        StandardColumn::DepartmentName,
        StandardColumn::Designation,
        StandardColumn::Location,
        StandardColumn::Shift,
    ];

    pub fn canonical_name(self) -> &'static str {
        match self {
            StandardColumn::EmployeeCode => "EmployeeCode",
            StandardColumn::EmployeeName => "EmployeeName",
            StandardColumn::DepartmentName => "DepartmentName",
            StandardColumn::Designation => "Designation",
            StandardColumn::Location => "Location",
            StandardColumn::Shift => "Shift",
        }
    }

    /// Case-insensitive match against a normalized header.
    pub fn from_header(header: &str) -> Option<Self> {
        let trimmed = header.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.canonical_name().eq_ignore_ascii_case(trimmed))
    }
}

/// Role assigned to each resolved column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    /// One of the six identity columns.
    Standard(StandardColumn),
    /// Header names a calendar date; holds per-day attendance status.
    Date,
    /// Neither identity nor date-like; excluded from processing, never fatal.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct ResolvedColumn {
    pub name: String,
    pub role: ColumnRole,
}

/// One employee row keyed by resolved column name. The six identity keys are
/// always present, empty when the export lacks the column.
#[derive(Debug, Clone, Default)]
pub struct AttendanceRecord {
    fields: HashMap<String, String>,
}

impl AttendanceRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn standard(&self, column: StandardColumn) -> &str {
        self.get(column.canonical_name())
    }
}

/// Output of schema resolution: ordered columns with roles, plus every data
/// row below the header materialized as an [`AttendanceRecord`].
#[derive(Debug, Clone)]
pub struct ResolvedTable {
    pub columns: Vec<ResolvedColumn>,
    pub rows: Vec<AttendanceRecord>,
    pub header_row: u32,
}

impl ResolvedTable {
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn date_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.role == ColumnRole::Date)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Last date column in document order, assumed most recent.
    pub fn last_date_column(&self) -> Option<&str> {
        self.date_columns().last().copied()
    }
}

/// Resolve the schema of a raw sheet and materialize its data rows.
pub fn resolve(
    sheet: &SheetData,
    header_scan_rows: u32,
    max_rows: u32,
) -> Result<ResolvedTable, IngestError> {
    let Some((max_row, max_col)) = sheet.data_bounds() else {
        return Err(IngestError::HeaderNotFound { rows_scanned: 0 });
    };
    let width = max_col + 1;
    let last_row = max_row.min(max_rows);

    let header_row = find_header_row(sheet, width, header_scan_rows.min(last_row + 1))?;

    let headers: Vec<String> = sheet
        .row_values(header_row, width)
        .iter()
        .enumerate()
        .map(|(position, cell)| normalize_header(cell, position))
        .collect();

    let columns: Vec<ResolvedColumn> = headers
        .iter()
        .map(|header| match StandardColumn::from_header(header) {
            // Standard columns are keyed under their canonical spelling so
            // record lookups never depend on the export's casing.
            Some(standard) => ResolvedColumn {
                name: standard.canonical_name().to_string(),
                role: ColumnRole::Standard(standard),
            },
            None if dates::is_date_header(header) => ResolvedColumn {
                name: header.clone(),
                role: ColumnRole::Date,
            },
            None => ResolvedColumn {
                name: header.clone(),
                role: ColumnRole::Ignored,
            },
        })
        .collect();

    let ignored: Vec<&str> = columns
        .iter()
        .filter(|c| c.role == ColumnRole::Ignored)
        .map(|c| c.name.as_str())
        .collect();
    if !ignored.is_empty() {
        warn!(?ignored, "columns ignored: neither identity nor date-like");
    }

    let mut rows = Vec::new();
    let mut first_row_values = None;
    for row_idx in (header_row + 1)..=last_row {
        let values = sheet.row_values(row_idx, width);
        if values.iter().all(CellValue::is_empty) {
            continue;
        }
        if first_row_values.is_none() {
            first_row_values = Some(values.iter().map(record_value).collect());
        }
        rows.push(build_record(&columns, &values));
    }

    if rows.is_empty() {
        return Err(IngestError::EmptyFile);
    }

    let date_count = columns.iter().filter(|c| c.role == ColumnRole::Date).count();
    if date_count == 0 {
        return Err(IngestError::NoDateColumns {
            columns: columns.iter().map(|c| c.name.clone()).collect(),
            sample_row: first_row_values.unwrap_or_default(),
        });
    }

    info!(
        header_row,
        columns = columns.len(),
        date_columns = date_count,
        rows = rows.len(),
        "schema resolved"
    );

    Ok(ResolvedTable {
        columns,
        rows,
        header_row,
    })
}

/// Scan leading rows for the anchor column name, case-insensitively, against
/// each row's full serialized form.
fn find_header_row(sheet: &SheetData, width: u32, scan_rows: u32) -> Result<u32, IngestError> {
    for row in 0..scan_rows {
        let serialized = sheet
            .row_values(row, width)
            .iter()
            .map(record_value)
            .collect::<Vec<_>>()
            .join("|");
        if serialized.to_uppercase().contains(HEADER_ANCHOR) {
            debug!(header_row = row, "header row located by anchor column");
            return Ok(row);
        }
    }
    Err(IngestError::HeaderNotFound {
        rows_scanned: scan_rows,
    })
}

/// Normalize one raw header cell at `position` into its canonical name.
fn normalize_header(cell: &CellValue, position: usize) -> String {
    match cell {
        CellValue::Empty => placeholder(position),
        CellValue::Text(s) if s.trim().is_empty() => placeholder(position),
        CellValue::Text(s) => s.trim().to_string(),
        CellValue::DateTime(serial) => dates::serial_to_date(*serial)
            .map(dates::format_date)
            .unwrap_or_else(|| format_number(*serial)),
        CellValue::Number(n) if dates::looks_like_serial(*n) => dates::serial_to_date(*n)
            .map(dates::format_date)
            .unwrap_or_else(|| format_number(*n)),
        CellValue::Number(n) => format_number(*n),
        CellValue::Bool(b) => b.to_string(),
        CellValue::Error(e) => e.clone(),
    }
}

fn placeholder(position: usize) -> String {
    format!("Column{}", position + 1)
}

fn build_record(columns: &[ResolvedColumn], values: &[CellValue]) -> AttendanceRecord {
    let mut record = AttendanceRecord::new();
    // Missing identity columns still get a key.
    for standard in StandardColumn::ALL {
        record.set(standard.canonical_name(), "");
    }
    for (column, value) in columns.iter().zip(values) {
        record.set(column.name.clone(), record_value(value));
    }
    record
}

/// Stringification policy for data cells.
fn record_value(value: &CellValue) -> String {
    match value {
        CellValue::Empty => String::new(),
        CellValue::Text(s) => s.trim().to_string(),
        CellValue::Number(n) => format_number(*n),
        CellValue::Bool(b) => b.to_string(),
        CellValue::DateTime(serial) => dates::serial_to_date(*serial)
            .map(dates::format_date)
            .unwrap_or_else(|| format_number(*serial)),
        CellValue::Error(e) => e.clone(),
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn sheet_from(rows: &[&[CellValue]]) -> SheetData {
        let mut cells = HashMap::new();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                if !matches!(value, CellValue::Empty) {
                    cells.insert((r as u32, c as u32), value.clone());
                }
            }
        }
        SheetData {
            name: "Sheet1".to_string(),
            cells,
        }
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn header_row() -> Vec<CellValue> {
        vec![
            text("EmployeeCode"),
            text("EmployeeName"),
            text("DepartmentName"),
            text("Designation"),
            text("Location"),
            text("Shift"),
            text("2024-06-01"),
        ]
    }

    #[test]
    fn header_found_below_title_and_blank_rows() {
        let title = vec![text("Monthly Attendance Register")];
        let header = header_row();
        let data = vec![
            text("E1"),
            text("Alice"),
            text("PROD"),
            text("ROLLER"),
            text("BASEMENT"),
            text("DAY"),
            text("Present"),
        ];
        let sheet = sheet_from(&[&title, &[], &header, &data]);

        let table = resolve(&sheet, 20, 1000).unwrap();
        assert_eq!(table.header_row, 2);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].standard(StandardColumn::EmployeeName), "Alice");
        assert_eq!(table.rows[0].get("2024-06-01"), "Present");
    }

    #[test]
    fn missing_anchor_is_fatal() {
        let sheet = sheet_from(&[
            &[text("Code"), text("Name")],
            &[text("E1"), text("Alice")],
        ]);
        let err = resolve(&sheet, 20, 1000).unwrap_err();
        assert!(matches!(err, IngestError::HeaderNotFound { .. }));
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn anchor_is_matched_case_insensitively_anywhere_in_the_row() {
        let header = vec![text("x"), text("  employeecode  "), text("2024-06-01")];
        let data = vec![text("ignored"), text("E1"), text("P")];
        let sheet = sheet_from(&[&header, &data]);
        let table = resolve(&sheet, 20, 1000).unwrap();
        assert_eq!(table.header_row, 0);
    }

    #[test]
    fn blank_headers_get_positional_placeholders() {
        assert_eq!(normalize_header(&CellValue::Empty, 0), "Column1");
        assert_eq!(normalize_header(&text("   "), 6), "Column7");
    }

    #[test]
    fn serial_and_date_typed_headers_agree() {
        // Same underlying day through both code paths.
        let from_number = normalize_header(&CellValue::Number(45444.0), 0);
        let from_date = normalize_header(&CellValue::DateTime(45444.0), 0);
        assert_eq!(from_number, "2024-06-01");
        assert_eq!(from_number, from_date);
    }

    #[test]
    fn numbers_outside_the_serial_window_stay_numeric() {
        assert_eq!(normalize_header(&CellValue::Number(250_000.0), 0), "250000");
        assert_eq!(normalize_header(&CellValue::Number(1.0), 0), "1");
    }

    #[test]
    fn standard_columns_are_canonicalized() {
        let header = vec![text("EMPLOYEECODE"), text("employeename"), text("2024-06-01")];
        let data = vec![text("E1"), text("Alice"), text("Present")];
        let sheet = sheet_from(&[&header, &data]);
        let table = resolve(&sheet, 20, 1000).unwrap();

        assert_eq!(table.columns[0].name, "EmployeeCode");
        assert_eq!(
            table.columns[0].role,
            ColumnRole::Standard(StandardColumn::EmployeeCode)
        );
        assert_eq!(table.rows[0].get("EmployeeName"), "Alice");
    }

    #[test]
    fn identity_keys_exist_even_when_columns_are_missing() {
        let header = vec![text("EmployeeCode"), text("2024-06-01")];
        let data = vec![text("E1"), text("P")];
        let sheet = sheet_from(&[&header, &data]);
        let table = resolve(&sheet, 20, 1000).unwrap();
        assert_eq!(table.rows[0].standard(StandardColumn::Shift), "");
    }

    #[test]
    fn unrecognized_columns_are_ignored_not_fatal() {
        let header = vec![
            text("EmployeeCode"),
            text("Remarks"),
            text("2024-06-01"),
            text("2024-06-02"),
        ];
        let data = vec![text("E1"), text("n/a"), text("P"), text("A")];
        let sheet = sheet_from(&[&header, &data]);
        let table = resolve(&sheet, 20, 1000).unwrap();

        assert_eq!(table.date_columns(), vec!["2024-06-01", "2024-06-02"]);
        assert_eq!(table.last_date_column(), Some("2024-06-02"));
        assert_eq!(table.columns[1].role, ColumnRole::Ignored);
    }

    #[test]
    fn zero_date_columns_is_fatal_with_the_column_list() {
        let header = vec![text("EmployeeCode"), text("Remarks")];
        let data = vec![text("E1"), text("ok")];
        let sheet = sheet_from(&[&header, &data]);
        let err = resolve(&sheet, 20, 1000).unwrap_err();
        match err {
            IngestError::NoDateColumns {
                columns,
                sample_row,
            } => {
                assert_eq!(columns, vec!["EmployeeCode", "Remarks"]);
                assert_eq!(sample_row, vec!["E1", "ok"]);
            }
            other => panic!("expected NoDateColumns, got {other:?}"),
        }
    }

    #[test]
    fn zero_data_rows_is_fatal() {
        let sheet = sheet_from(&[&header_row()]);
        let err = resolve(&sheet, 20, 1000).unwrap_err();
        assert!(matches!(err, IngestError::EmptyFile));
    }

    #[test]
    fn fully_blank_rows_are_skipped() {
        let header = header_row();
        let blank = vec![text(""), text("  ")];
        let data = vec![
            text("E1"),
            text("Alice"),
            text("PROD"),
            text("ROLLER"),
            text("BASEMENT"),
            text("DAY"),
            text("Present"),
        ];
        let sheet = sheet_from(&[&header, &blank, &data]);
        let table = resolve(&sheet, 20, 1000).unwrap();
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn missing_cells_become_empty_strings() {
        let header = header_row();
        // Row shorter than the header: trailing cells unpopulated.
        let data = vec![text("E1"), text("Alice")];
        let sheet = sheet_from(&[&header, &data]);
        let table = resolve(&sheet, 20, 1000).unwrap();
        assert_eq!(table.rows[0].get("2024-06-01"), "");
    }
}
