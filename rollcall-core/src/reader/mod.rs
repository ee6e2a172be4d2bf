//! Workbook reader built on calamine
//!
//! Only the first sheet is ever read. Cells are re-keyed into a sparse
//! coordinate map so downstream code can compute the true used range
//! instead of trusting the sheet's declared dimensions.

use crate::error::IngestError;
use calamine::{Data, Reader, Sheets, open_workbook_auto_from_rs};
use std::collections::HashMap;
use std::io::Cursor;
use tracing::debug;

pub mod workbook;

pub use workbook::{CellValue, SheetData};

/// Parse the first sheet of a workbook from raw bytes.
pub fn read_workbook_bytes(bytes: &[u8]) -> Result<SheetData, IngestError> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut excel: Sheets<_> = open_workbook_auto_from_rs(cursor)?;

    let first = excel
        .sheet_names()
        .first()
        .cloned()
        .ok_or(calamine::Error::Msg("workbook has no sheets"))?;

    let range = excel.worksheet_range(&first)?;

    let mut cells = HashMap::new();
    if let Some((start_row, start_col)) = range.start() {
        for (row, col, data) in range.cells() {
            if matches!(data, Data::Empty) {
                continue;
            }
            let abs_row = start_row + row as u32;
            let abs_col = start_col + col as u32;
            cells.insert((abs_row, abs_col), parse_cell_value(data));
        }
    }

    debug!(sheet = %first, cells = cells.len(), "workbook parsed");
    Ok(SheetData { name: first, cells })
}

fn parse_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Error(e) => CellValue::Error(format!("{:?}", e)),
        Data::Empty => CellValue::Empty,
        Data::DateTime(dt) => CellValue::DateTime(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}
