//! # CSV Workbook
//!
//! The local store: a workbook kept in memory and saved as a directory with
//! one CSV file per sheet.
//!
//! ```text
//! Daily Entry/16 October, 2026 SRM Data/
//! ├── Prepaid Sheet.csv
//! ├── Coupons Breakfast.csv
//! ├── Coupons Lunch.csv
//! ├── Coupons Dinner.csv
//! └── Calculations.csv
//! ```
//!
//! Mutations only touch memory until [`TabularStore::flush`] writes every sheet
//! back. There is no file locking; two processes saving the same day will
//! silently overwrite each other.

use csv::{ReaderBuilder, WriterBuilder};
use log::{debug, info};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::backend::storage::error::{StoreError, StoreResult};
use crate::backend::storage::sheet::Grid;
use crate::backend::storage::traits::TabularStore;

const SHEET_EXTENSION: &str = "csv";

/// Read one sheet file into a grid
pub(crate) fn read_sheet_file(path: &Path) -> StoreResult<Grid> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }
    Ok(Grid::from_rows(rows))
}

/// Write a grid to a sheet file atomically
pub(crate) fn write_sheet_file(path: &Path, grid: &Grid) -> StoreResult<()> {
    let temp_path = path.with_extension("tmp");
    {
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&temp_path)?;
        for row in grid.rows() {
            if row.is_empty() {
                // csv refuses zero-field records; keep the row as a single empty cell
                writer.write_record([""])?;
            } else {
                writer.write_record(row)?;
            }
        }
        writer.flush()?;
    }
    fs::rename(&temp_path, path)?;
    Ok(())
}

pub(crate) fn sheet_file_path(directory: &Path, sheet: &str) -> PathBuf {
    directory.join(format!("{}.{}", sheet, SHEET_EXTENSION))
}

/// Names of the sheet files present in a document directory
pub(crate) fn list_sheet_files(directory: &Path) -> StoreResult<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some(SHEET_EXTENSION) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            names.push(stem.to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// A day's local workbook
#[derive(Debug, Clone)]
pub struct Workbook {
    directory: PathBuf,
    sheets: BTreeMap<String, Grid>,
}

impl Workbook {
    /// Start a new, unsaved workbook at the given directory
    pub fn create<P: AsRef<Path>>(directory: P) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
            sheets: BTreeMap::new(),
        }
    }

    /// Load a saved workbook
    pub fn load<P: AsRef<Path>>(directory: P) -> StoreResult<Self> {
        let directory = directory.as_ref().to_path_buf();
        if !directory.is_dir() {
            return Err(StoreError::DocumentNotFound(directory.display().to_string()));
        }

        let mut sheets = BTreeMap::new();
        for name in list_sheet_files(&directory)? {
            let grid = read_sheet_file(&sheet_file_path(&directory, &name))?;
            sheets.insert(name, grid);
        }

        debug!("Loaded workbook {} with {} sheets", directory.display(), sheets.len());
        Ok(Self { directory, sheets })
    }

    /// Whether a workbook has been saved at the given directory
    pub fn exists<P: AsRef<Path>>(directory: P) -> bool {
        directory.as_ref().is_dir()
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn grid(&self, sheet: &str) -> StoreResult<&Grid> {
        self.sheets
            .get(sheet)
            .ok_or_else(|| StoreError::SheetNotFound(sheet.to_string()))
    }

    fn grid_mut(&mut self, sheet: &str) -> StoreResult<&mut Grid> {
        self.sheets
            .get_mut(sheet)
            .ok_or_else(|| StoreError::SheetNotFound(sheet.to_string()))
    }
}

impl TabularStore for Workbook {
    fn sheet_names(&self) -> StoreResult<Vec<String>> {
        Ok(self.sheets.keys().cloned().collect())
    }

    fn add_sheet(&mut self, sheet: &str) -> StoreResult<()> {
        self.sheets.entry(sheet.to_string()).or_default();
        Ok(())
    }

    fn rows(&self, sheet: &str) -> StoreResult<Vec<Vec<String>>> {
        Ok(self.grid(sheet)?.rows().to_vec())
    }

    fn row_count(&self, sheet: &str) -> StoreResult<usize> {
        Ok(self.grid(sheet)?.len())
    }

    fn row(&self, sheet: &str, row: usize) -> StoreResult<Vec<String>> {
        self.grid(sheet)?.row(sheet, row)
    }

    fn set_cell(&mut self, sheet: &str, row: usize, col: usize, value: &str) -> StoreResult<()> {
        self.grid_mut(sheet)?.set_cell(row, col, value);
        Ok(())
    }

    fn append_row(&mut self, sheet: &str, values: &[String]) -> StoreResult<()> {
        self.grid_mut(sheet)?.append(values);
        Ok(())
    }

    fn replace_rows(&mut self, sheet: &str, rows: &[Vec<String>]) -> StoreResult<()> {
        self.grid_mut(sheet)?.replace(rows);
        Ok(())
    }

    fn flush(&mut self) -> StoreResult<()> {
        if !self.directory.exists() {
            fs::create_dir_all(&self.directory)?;
            info!("Created workbook directory: {}", self.directory.display());
        }
        for (name, grid) in &self.sheets {
            write_sheet_file(&sheet_file_path(&self.directory, name), grid)?;
        }
        debug!("Saved workbook {}", self.directory.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::TempDir;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_load_missing_workbook_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let err = Workbook::load(temp_dir.path().join("missing")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_save_and_reload_preserves_cells() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("16 October, 2026 SRM Data");

        let mut workbook = Workbook::create(&path);
        workbook.add_sheet("Prepaid Sheet")?;
        workbook.append_row("Prepaid Sheet", &strings(&["Student Name", "Registration Number"]))?;
        workbook.append_row("Prepaid Sheet", &strings(&["Asha, R.", "MS25001", "NOT"]))?;
        workbook.set_cell("Prepaid Sheet", 1, 5, "12:30:00")?;
        workbook.flush()?;

        let reloaded = Workbook::load(&path)?;
        assert_eq!(reloaded.sheet_names()?, vec!["Prepaid Sheet".to_string()]);
        assert_eq!(reloaded.cell("Prepaid Sheet", 1, 0)?, "Asha, R.");
        assert_eq!(reloaded.cell("Prepaid Sheet", 1, 2)?, "NOT");
        assert_eq!(reloaded.cell("Prepaid Sheet", 1, 5)?, "12:30:00");
        // Past the end of a short row reads as empty
        assert_eq!(reloaded.cell("Prepaid Sheet", 0, 7)?, "");
        Ok(())
    }

    #[test]
    fn test_empty_rows_survive_round_trip() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut workbook = Workbook::create(temp_dir.path().join("day"));
        workbook.add_sheet("Calculations")?;
        workbook.replace_rows("Calculations", &[strings(&["Breakfast:"]), vec![], strings(&["Lunch:"])])?;
        workbook.flush()?;

        let reloaded = Workbook::load(temp_dir.path().join("day"))?;
        assert_eq!(reloaded.row_count("Calculations")?, 3);
        assert_eq!(reloaded.cell("Calculations", 2, 0)?, "Lunch:");
        Ok(())
    }

    #[test]
    fn test_unknown_sheet_is_error() {
        let workbook = Workbook::create("unused");
        let err = workbook.column("Coupons Lunch", 1).unwrap_err();
        assert!(matches!(err, StoreError::SheetNotFound(_)));
    }
}
