//! Raw sheet data structures

use std::collections::HashMap;

/// One parsed sheet: a sparse map of populated cells keyed by absolute
/// (row, col) coordinates.
///
/// The declared dimension metadata of the source workbook is never stored
/// here; it has been observed to under-report the column count when a sheet
/// carries many trailing date columns. Bounds are always recomputed from the
/// populated coordinates.
#[derive(Debug, Clone, Default)]
pub struct SheetData {
    pub name: String,
    pub cells: HashMap<(u32, u32), CellValue>,
}

impl SheetData {
    /// Get the cell at the given position, if populated.
    pub fn get(&self, row: u32, col: u32) -> Option<&CellValue> {
        self.cells.get(&(row, col))
    }

    /// True used range: maximum row and column index actually holding data.
    pub fn data_bounds(&self) -> Option<(u32, u32)> {
        let populated: Vec<_> = self
            .cells
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(&coord, _)| coord)
            .collect();

        if populated.is_empty() {
            return None;
        }

        let max_row = populated.iter().map(|&(r, _)| r).max()?;
        let max_col = populated.iter().map(|&(_, c)| c).max()?;
        Some((max_row, max_col))
    }

    /// Materialize one row as a dense array of `width` values,
    /// coordinate-addressed, substituting `Empty` for unpopulated cells.
    pub fn row_values(&self, row: u32, width: u32) -> Vec<CellValue> {
        (0..width)
            .map(|col| self.get(row, col).cloned().unwrap_or(CellValue::Empty))
            .collect()
    }
}

/// Cell value tagged by underlying kind.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    /// Date-typed cell, kept as the raw Excel serial (days since
    /// 1899-12-30) until header normalization decides how to render it.
    DateTime(f64),
    Error(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_bounds_ignore_blank_text_cells() {
        let mut cells = HashMap::new();
        cells.insert((0, 0), CellValue::Text("EmployeeCode".to_string()));
        cells.insert((0, 8), CellValue::Text("   ".to_string()));
        cells.insert((3, 2), CellValue::Number(1.0));
        let sheet = SheetData {
            name: "Sheet1".to_string(),
            cells,
        };
        assert_eq!(sheet.data_bounds(), Some((3, 2)));
    }

    #[test]
    fn row_values_fill_gaps_with_empty() {
        let mut cells = HashMap::new();
        cells.insert((1, 0), CellValue::Text("a".to_string()));
        cells.insert((1, 2), CellValue::Text("c".to_string()));
        let sheet = SheetData {
            name: "Sheet1".to_string(),
            cells,
        };
        assert_eq!(
            sheet.row_values(1, 4),
            vec![
                CellValue::Text("a".to_string()),
                CellValue::Empty,
                CellValue::Text("c".to_string()),
                CellValue::Empty,
            ]
        );
    }
}
