//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow the local
//! workbook and the remote mirror to be used interchangeably in the domain layer.
//!
//! Both stores are addressed the same way: sheets by name, rows and columns by
//! zero-based index. Row 0 of every sheet is its header row.

use super::error::StoreResult;

/// Capability set shared by the local workbook and the mirror documents.
///
/// Reads pad short rows with empty strings, so a column read always yields one
/// value per row of the sheet.
pub trait TabularStore {
    /// Names of the sheets in this document
    fn sheet_names(&self) -> StoreResult<Vec<String>>;

    /// Add an empty sheet; adding an existing sheet is a no-op
    fn add_sheet(&mut self, sheet: &str) -> StoreResult<()>;

    /// All rows of a sheet, header included
    fn rows(&self, sheet: &str) -> StoreResult<Vec<Vec<String>>>;

    /// Number of rows in a sheet, header included
    fn row_count(&self, sheet: &str) -> StoreResult<usize> {
        Ok(self.rows(sheet)?.len())
    }

    /// One value per row for the given column, header included
    fn column(&self, sheet: &str, col: usize) -> StoreResult<Vec<String>> {
        Ok(self
            .rows(sheet)?
            .into_iter()
            .map(|row| row.get(col).cloned().unwrap_or_default())
            .collect())
    }

    /// A single row; rows past the end of the sheet are an error
    fn row(&self, sheet: &str, row: usize) -> StoreResult<Vec<String>>;

    /// A single cell; empty when the row is shorter than `col`
    fn cell(&self, sheet: &str, row: usize, col: usize) -> StoreResult<String> {
        Ok(self.row(sheet, row)?.get(col).cloned().unwrap_or_default())
    }

    /// Overwrite one cell, growing the row if needed
    fn set_cell(&mut self, sheet: &str, row: usize, col: usize, value: &str) -> StoreResult<()>;

    /// Append a row after the last row of the sheet
    fn append_row(&mut self, sheet: &str, values: &[String]) -> StoreResult<()>;

    /// Replace the whole content of a sheet in one batch
    fn replace_rows(&mut self, sheet: &str, rows: &[Vec<String>]) -> StoreResult<()>;

    /// Persist pending changes. Stores that write through on every call do nothing.
    fn flush(&mut self) -> StoreResult<()> {
        Ok(())
    }
}

/// Remote service hosting mirror documents.
///
/// Documents are addressed by name; the day's mirror uses the same name as the
/// local day file.
pub trait MirrorService {
    /// Document handle produced by this service
    type Document: TabularStore;

    /// Open an existing document
    fn open(&self, name: &str) -> StoreResult<Self::Document>;

    /// Create a new, empty document
    fn create(&self, name: &str) -> StoreResult<Self::Document>;

    /// Grant a recipient write access to a document
    fn share(&self, name: &str, recipient: &str) -> StoreResult<()>;
}
