//! # Folder Mirror
//!
//! Mirror service backed by a shared directory (a synced cloud drive or a
//! network mount). Each document is a subdirectory holding one CSV file per
//! sheet, laid out exactly like a local workbook:
//!
//! ```text
//! <mirror root>/
//! ├── Repository Details for SRM/Sheet1.csv
//! ├── Leave Details for SRM/Form Responses 1.csv
//! └── 16 October, 2026 SRM Data/
//!     ├── Prepaid Sheet.csv
//!     ├── ...
//!     ├── Log.csv
//!     └── shares.yaml
//! ```
//!
//! Unlike the local workbook every write goes straight to disk, so another
//! station reading the same cell sees it immediately. A missing root means the
//! drive is not mounted and is reported as [`StoreError::Unreachable`].

use log::{debug, info};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::backend::storage::csv::workbook::{
    list_sheet_files, read_sheet_file, sheet_file_path, write_sheet_file,
};
use crate::backend::storage::error::{StoreError, StoreResult};
use crate::backend::storage::sheet::Grid;
use crate::backend::storage::traits::{MirrorService, TabularStore};

const SHARES_FILE: &str = "shares.yaml";

fn ensure_reachable(root: &Path) -> StoreResult<()> {
    if root.is_dir() {
        Ok(())
    } else {
        Err(StoreError::Unreachable(root.display().to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct FolderMirror {
    root: PathBuf,
}

impl FolderMirror {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Recipients a document has been shared with
    pub fn shares(&self, name: &str) -> StoreResult<BTreeSet<String>> {
        ensure_reachable(&self.root)?;
        let path = self.root.join(name).join(SHARES_FILE);
        if !path.exists() {
            return Ok(BTreeSet::new());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    fn document(&self, name: &str) -> FolderDocument {
        FolderDocument {
            root: self.root.clone(),
            directory: self.root.join(name),
        }
    }
}

impl MirrorService for FolderMirror {
    type Document = FolderDocument;

    fn open(&self, name: &str) -> StoreResult<FolderDocument> {
        ensure_reachable(&self.root)?;
        let document = self.document(name);
        if !document.directory.is_dir() {
            return Err(StoreError::DocumentNotFound(name.to_string()));
        }
        debug!("Opened mirror document {}", name);
        Ok(document)
    }

    fn create(&self, name: &str) -> StoreResult<FolderDocument> {
        ensure_reachable(&self.root)?;
        let document = self.document(name);
        if document.directory.exists() {
            return Err(StoreError::AlreadyExists(name.to_string()));
        }
        fs::create_dir_all(&document.directory)?;
        info!("Created mirror document {}", name);
        Ok(document)
    }

    fn share(&self, name: &str, recipient: &str) -> StoreResult<()> {
        let mut recipients = self.shares(name)?;
        if !self.root.join(name).is_dir() {
            return Err(StoreError::DocumentNotFound(name.to_string()));
        }
        if recipients.insert(recipient.trim().to_string()) {
            let path = self.root.join(name).join(SHARES_FILE);
            let temp_path = path.with_extension("tmp");
            fs::write(&temp_path, serde_yaml::to_string(&recipients)?)?;
            fs::rename(&temp_path, &path)?;
            debug!("Shared {} with {}", name, recipient);
        }
        Ok(())
    }
}

/// A write-through mirror document
#[derive(Debug, Clone)]
pub struct FolderDocument {
    root: PathBuf,
    directory: PathBuf,
}

impl FolderDocument {
    fn check(&self) -> StoreResult<()> {
        ensure_reachable(&self.root)?;
        if !self.directory.is_dir() {
            return Err(StoreError::DocumentNotFound(self.directory.display().to_string()));
        }
        Ok(())
    }

    fn load(&self, sheet: &str) -> StoreResult<Grid> {
        self.check()?;
        let path = sheet_file_path(&self.directory, sheet);
        if !path.exists() {
            return Err(StoreError::SheetNotFound(sheet.to_string()));
        }
        read_sheet_file(&path)
    }

    fn update<F>(&mut self, sheet: &str, change: F) -> StoreResult<()>
    where
        F: FnOnce(&mut Grid),
    {
        let mut grid = self.load(sheet)?;
        change(&mut grid);
        write_sheet_file(&sheet_file_path(&self.directory, sheet), &grid)
    }
}

impl TabularStore for FolderDocument {
    fn sheet_names(&self) -> StoreResult<Vec<String>> {
        self.check()?;
        list_sheet_files(&self.directory)
    }

    fn add_sheet(&mut self, sheet: &str) -> StoreResult<()> {
        self.check()?;
        let path = sheet_file_path(&self.directory, sheet);
        if !path.exists() {
            write_sheet_file(&path, &Grid::new())?;
        }
        Ok(())
    }

    fn rows(&self, sheet: &str) -> StoreResult<Vec<Vec<String>>> {
        Ok(self.load(sheet)?.rows().to_vec())
    }

    fn row(&self, sheet: &str, row: usize) -> StoreResult<Vec<String>> {
        self.load(sheet)?.row(sheet, row)
    }

    fn set_cell(&mut self, sheet: &str, row: usize, col: usize, value: &str) -> StoreResult<()> {
        self.update(sheet, |grid| grid.set_cell(row, col, value))
    }

    fn append_row(&mut self, sheet: &str, values: &[String]) -> StoreResult<()> {
        self.update(sheet, |grid| grid.append(values))
    }

    fn replace_rows(&mut self, sheet: &str, rows: &[Vec<String>]) -> StoreResult<()> {
        self.update(sheet, |grid| grid.replace(rows))
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
    fn test_missing_root_is_unreachable() {
        let temp_dir = TempDir::new().unwrap();
        let mirror = FolderMirror::new(temp_dir.path().join("not-mounted"));
        assert!(mirror.open("day").unwrap_err().is_connectivity());
        assert!(mirror.create("day").unwrap_err().is_connectivity());
    }

    #[test]
    fn test_create_open_and_write_through() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mirror = FolderMirror::new(temp_dir.path());

        assert!(mirror.open("day").unwrap_err().is_not_found());
        let mut document = mirror.create("day")?;
        assert!(matches!(mirror.create("day"), Err(StoreError::AlreadyExists(_))));

        document.add_sheet("Coupons Lunch")?;
        document.append_row("Coupons Lunch", &strings(&["Registration Number", "Amount", "Time"]))?;
        document.append_row("Coupons Lunch", &strings(&["MS25001", "30", "12:00:00"]))?;

        // A second handle sees the writes without any flush
        let other = mirror.open("day")?;
        assert_eq!(other.row_count("Coupons Lunch")?, 2);
        assert_eq!(other.cell("Coupons Lunch", 1, 1)?, "30");
        Ok(())
    }

    #[test]
    fn test_document_becomes_unreachable_when_root_disappears() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().join("drive");
        fs::create_dir_all(&root)?;
        let mirror = FolderMirror::new(&root);
        let mut document = mirror.create("day")?;
        document.add_sheet("Prepaid Sheet")?;

        fs::remove_dir_all(&root)?;
        let err = document.set_cell("Prepaid Sheet", 1, 4, "veg").unwrap_err();
        assert!(err.is_connectivity());
        Ok(())
    }

    #[test]
    fn test_share_is_idempotent() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mirror = FolderMirror::new(temp_dir.path());
        mirror.create("day")?;

        mirror.share("day", "studentmess@iisermohali.ac.in")?;
        mirror.share("day", "studentmess@iisermohali.ac.in")?;
        mirror.share("day", "warden@iisermohali.ac.in")?;

        assert_eq!(mirror.shares("day")?.len(), 2);
        assert!(mirror.share("missing", "a@b.c").unwrap_err().is_not_found());
        Ok(())
    }
}
