/// In-memory mirror service for tests
///
/// Documents write through to shared state, so a handle opened earlier sees
/// later writes. `set_online(false)` makes every call fail with
/// `StoreError::Unreachable`, including calls on documents already open.
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use crate::backend::storage::error::{StoreError, StoreResult};
use crate::backend::storage::sheet::Grid;
use crate::backend::storage::traits::{MirrorService, TabularStore};

#[derive(Debug)]
struct MirrorState {
    online: bool,
    documents: BTreeMap<String, BTreeMap<String, Grid>>,
    shares: BTreeMap<String, BTreeSet<String>>,
}

#[derive(Debug, Clone)]
pub struct MemoryMirror {
    state: Rc<RefCell<MirrorState>>,
}

impl Default for MemoryMirror {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMirror {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(MirrorState {
                online: true,
                documents: BTreeMap::new(),
                shares: BTreeMap::new(),
            })),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.state.borrow_mut().online = online;
    }

    /// Seed a sheet, creating the document if needed
    pub fn insert_sheet(&self, document: &str, sheet: &str, rows: Vec<Vec<String>>) {
        self.state
            .borrow_mut()
            .documents
            .entry(document.to_string())
            .or_default()
            .insert(sheet.to_string(), Grid::from_rows(rows));
    }

    pub fn sheet(&self, document: &str, sheet: &str) -> Option<Vec<Vec<String>>> {
        self.state
            .borrow()
            .documents
            .get(document)
            .and_then(|sheets| sheets.get(sheet))
            .map(|grid| grid.rows().to_vec())
    }

    pub fn has_document(&self, name: &str) -> bool {
        self.state.borrow().documents.contains_key(name)
    }

    pub fn shares(&self, name: &str) -> BTreeSet<String> {
        self.state.borrow().shares.get(name).cloned().unwrap_or_default()
    }

    fn ensure_online(&self) -> StoreResult<()> {
        if self.state.borrow().online {
            Ok(())
        } else {
            Err(StoreError::Unreachable("memory mirror is offline".to_string()))
        }
    }
}

impl MirrorService for MemoryMirror {
    type Document = MemoryDocument;

    fn open(&self, name: &str) -> StoreResult<MemoryDocument> {
        self.ensure_online()?;
        if !self.has_document(name) {
            return Err(StoreError::DocumentNotFound(name.to_string()));
        }
        Ok(MemoryDocument {
            name: name.to_string(),
            mirror: self.clone(),
        })
    }

    fn create(&self, name: &str) -> StoreResult<MemoryDocument> {
        self.ensure_online()?;
        if self.has_document(name) {
            return Err(StoreError::AlreadyExists(name.to_string()));
        }
        self.state
            .borrow_mut()
            .documents
            .insert(name.to_string(), BTreeMap::new());
        Ok(MemoryDocument {
            name: name.to_string(),
            mirror: self.clone(),
        })
    }

    fn share(&self, name: &str, recipient: &str) -> StoreResult<()> {
        self.ensure_online()?;
        if !self.has_document(name) {
            return Err(StoreError::DocumentNotFound(name.to_string()));
        }
        self.state
            .borrow_mut()
            .shares
            .entry(name.to_string())
            .or_default()
            .insert(recipient.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct MemoryDocument {
    name: String,
    mirror: MemoryMirror,
}

impl MemoryDocument {
    fn with_grid<T>(&self, sheet: &str, read: impl FnOnce(&Grid) -> StoreResult<T>) -> StoreResult<T> {
        self.mirror.ensure_online()?;
        let state = self.mirror.state.borrow();
        let sheets = state
            .documents
            .get(&self.name)
            .ok_or_else(|| StoreError::DocumentNotFound(self.name.clone()))?;
        let grid = sheets
            .get(sheet)
            .ok_or_else(|| StoreError::SheetNotFound(sheet.to_string()))?;
        read(grid)
    }

    fn with_grid_mut(&mut self, sheet: &str, change: impl FnOnce(&mut Grid)) -> StoreResult<()> {
        self.mirror.ensure_online()?;
        let mut state = self.mirror.state.borrow_mut();
        let sheets = state
            .documents
            .get_mut(&self.name)
            .ok_or_else(|| StoreError::DocumentNotFound(self.name.clone()))?;
        let grid = sheets
            .get_mut(sheet)
            .ok_or_else(|| StoreError::SheetNotFound(sheet.to_string()))?;
        change(grid);
        Ok(())
    }
}

impl TabularStore for MemoryDocument {
    fn sheet_names(&self) -> StoreResult<Vec<String>> {
        self.mirror.ensure_online()?;
        let state = self.mirror.state.borrow();
        Ok(state
            .documents
            .get(&self.name)
            .map(|sheets| sheets.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn add_sheet(&mut self, sheet: &str) -> StoreResult<()> {
        self.mirror.ensure_online()?;
        self.mirror
            .state
            .borrow_mut()
            .documents
            .entry(self.name.clone())
            .or_default()
            .entry(sheet.to_string())
            .or_default();
        Ok(())
    }

    fn rows(&self, sheet: &str) -> StoreResult<Vec<Vec<String>>> {
        self.with_grid(sheet, |grid| Ok(grid.rows().to_vec()))
    }

    fn row(&self, sheet: &str, row: usize) -> StoreResult<Vec<String>> {
        self.with_grid(sheet, |grid| grid.row(sheet, row))
    }

    fn set_cell(&mut self, sheet: &str, row: usize, col: usize, value: &str) -> StoreResult<()> {
        self.with_grid_mut(sheet, |grid| grid.set_cell(row, col, value))
    }

    fn append_row(&mut self, sheet: &str, values: &[String]) -> StoreResult<()> {
        self.with_grid_mut(sheet, |grid| grid.append(values))
    }

    fn replace_rows(&mut self, sheet: &str, rows: &[Vec<String>]) -> StoreResult<()> {
        self.with_grid_mut(sheet, |grid| grid.replace(rows))
    }
}
