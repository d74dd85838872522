//! In-memory grid of cells shared by every store implementation.

use super::error::{StoreError, StoreResult};

/// A sheet's rows, header first. Rows may be ragged; missing cells read as empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<String>>,
}

impl Grid {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, sheet: &str, row: usize) -> StoreResult<Vec<String>> {
        self.rows
            .get(row)
            .cloned()
            .ok_or_else(|| StoreError::RowOutOfRange {
                sheet: sheet.to_string(),
                row,
            })
    }

    /// Set a cell, extending the grid with empty rows and cells as a spreadsheet would
    pub fn set_cell(&mut self, row: usize, col: usize, value: &str) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize(col + 1, String::new());
        }
        cells[col] = value.to_string();
    }

    pub fn append(&mut self, values: &[String]) {
        self.rows.push(values.to_vec());
    }

    pub fn replace(&mut self, rows: &[Vec<String>]) {
        self.rows = rows.to_vec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_cell_grows_grid() {
        let mut grid = Grid::new();
        grid.set_cell(2, 3, "veg");
        assert_eq!(grid.len(), 3);
        assert_eq!(grid.rows()[2], vec!["", "", "", "veg"]);
        assert!(grid.rows()[0].is_empty());
    }

    #[test]
    fn test_row_out_of_range() {
        let grid = Grid::from_rows(vec![vec!["Header".to_string()]]);
        let err = grid.row("Prepaid Sheet", 5).unwrap_err();
        assert!(matches!(err, StoreError::RowOutOfRange { row: 5, .. }));
    }
}
