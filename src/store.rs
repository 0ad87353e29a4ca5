//! Row stores: the tabular backing store submissions are appended to.
//!
//! [`RowStore`] is the narrow capability the rest of the crate depends on.
//! Two implementations ship with the crate: [`MemoryRowStore`], which keeps
//! workbooks in process memory, and [`FileRowStore`], which persists each
//! workbook as a gzip-compressed file under a data directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::debug;

use crate::saving::{load_workbook, save_workbook};
use crate::workbook::{CellValue, HeaderStyle, Workbook};

/// External tabular store, addressed by store id and table name
///
/// Every operation reports failures as a plain cause message; callers wrap
/// them into their own error types.
pub trait RowStore: Send + Sync {
    /// Check that the store `store_id` can be opened
    fn open(&self, store_id: &str) -> Result<(), String>;

    /// Create `table` if absent; returns true when it was created
    fn create_if_absent(&self, store_id: &str, table: &str) -> Result<bool, String>;

    /// 1-based index of the last row holding data, 0 for an empty table
    fn last_row_index(&self, store_id: &str, table: &str) -> Result<usize, String>;

    /// Write `values` into 1-based `row`, starting at the first column
    fn write_row(
        &self,
        store_id: &str,
        table: &str,
        row: usize,
        values: &[CellValue],
    ) -> Result<(), String>;

    /// Apply cosmetic styling to the first row; stores without styling ignore it
    fn style_header(&self, _store_id: &str, _table: &str, _style: &HeaderStyle) -> Result<(), String> {
        Ok(())
    }

    /// Whether `table` exists in the store
    fn table_exists(&self, store_id: &str, table: &str) -> Result<bool, String>;

    /// All rows of `table`, header included
    fn rows(&self, store_id: &str, table: &str) -> Result<Vec<Vec<CellValue>>, String>;
}

/// Row store holding workbooks in memory
///
/// Only workbooks registered up front can be opened, mirroring a hosted
/// service where the spreadsheet must already exist.
#[derive(Default)]
pub struct MemoryRowStore {
    books: Mutex<HashMap<String, Workbook>>,
}

impl MemoryRowStore {
    pub fn new() -> Self {
        MemoryRowStore::default()
    }

    /// Register an empty workbook under `store_id`
    pub fn with_workbook(mut self, store_id: &str) -> Self {
        if let Ok(books) = self.books.get_mut() {
            books.entry(store_id.to_string()).or_default();
        }
        self
    }

    /// Copy of the workbook registered under `store_id`
    pub fn snapshot(&self, store_id: &str) -> Option<Workbook> {
        self.books.lock().ok()?.get(store_id).cloned()
    }

    fn with_book<T>(
        &self,
        store_id: &str,
        f: impl FnOnce(&mut Workbook) -> Result<T, String>,
    ) -> Result<T, String> {
        let mut books = self
            .books
            .lock()
            .map_err(|_| "Row store lock poisoned".to_string())?;
        let book = books
            .get_mut(store_id)
            .ok_or_else(|| format!("No workbook with id '{}'", store_id))?;
        f(book)
    }
}

impl RowStore for MemoryRowStore {
    fn open(&self, store_id: &str) -> Result<(), String> {
        self.with_book(store_id, |_| Ok(()))
    }

    fn create_if_absent(&self, store_id: &str, table: &str) -> Result<bool, String> {
        self.with_book(store_id, |book| Ok(book.insert_table(table)))
    }

    fn last_row_index(&self, store_id: &str, table: &str) -> Result<usize, String> {
        self.with_book(store_id, |book| book.last_row_index(table))
    }

    fn write_row(
        &self,
        store_id: &str,
        table: &str,
        row: usize,
        values: &[CellValue],
    ) -> Result<(), String> {
        self.with_book(store_id, |book| book.write_row(table, row, values))
    }

    fn style_header(&self, store_id: &str, table: &str, style: &HeaderStyle) -> Result<(), String> {
        self.with_book(store_id, |book| book.style_header(table, style))
    }

    fn table_exists(&self, store_id: &str, table: &str) -> Result<bool, String> {
        self.with_book(store_id, |book| Ok(book.table(table).is_some()))
    }

    fn rows(&self, store_id: &str, table: &str) -> Result<Vec<Vec<CellValue>>, String> {
        self.with_book(store_id, |book| book.rows(table))
    }
}

/// Row store persisting one `<store_id>.bin.gz` file per workbook
///
/// The data directory must exist. A workbook file that does not exist yet
/// is treated as empty and written on the first change.
pub struct FileRowStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl FileRowStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileRowStore {
            dir: dir.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn book_path(&self, store_id: &str) -> Result<PathBuf, String> {
        let valid = !store_id.is_empty()
            && store_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(format!("Invalid store id '{}'", store_id));
        }
        if !self.dir.is_dir() {
            return Err(format!("Data directory {} does not exist", self.dir.display()));
        }
        Ok(self.dir.join(format!("{}.bin.gz", store_id)))
    }

    fn load(&self, path: &Path) -> Result<Workbook, String> {
        if !path.exists() {
            return Ok(Workbook::new());
        }
        load_workbook(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))
    }

    /// Run `f` against the workbook; when `persist` is set the result is saved
    fn with_book<T>(
        &self,
        store_id: &str,
        persist: bool,
        f: impl FnOnce(&mut Workbook) -> Result<T, String>,
    ) -> Result<T, String> {
        let path = self.book_path(store_id)?;
        let _guard = self
            .lock
            .lock()
            .map_err(|_| "Row store lock poisoned".to_string())?;

        let mut book = self.load(&path)?;
        let out = f(&mut book)?;
        if persist {
            save_workbook(&book, &path)
                .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
            debug!("saved workbook {}", path.display());
        }
        Ok(out)
    }
}

impl RowStore for FileRowStore {
    fn open(&self, store_id: &str) -> Result<(), String> {
        self.with_book(store_id, false, |_| Ok(()))
    }

    fn create_if_absent(&self, store_id: &str, table: &str) -> Result<bool, String> {
        self.with_book(store_id, true, |book| Ok(book.insert_table(table)))
    }

    fn last_row_index(&self, store_id: &str, table: &str) -> Result<usize, String> {
        self.with_book(store_id, false, |book| book.last_row_index(table))
    }

    fn write_row(
        &self,
        store_id: &str,
        table: &str,
        row: usize,
        values: &[CellValue],
    ) -> Result<(), String> {
        self.with_book(store_id, true, |book| book.write_row(table, row, values))
    }

    fn style_header(&self, store_id: &str, table: &str, style: &HeaderStyle) -> Result<(), String> {
        self.with_book(store_id, true, |book| book.style_header(table, style))
    }

    fn table_exists(&self, store_id: &str, table: &str) -> Result<bool, String> {
        self.with_book(store_id, false, |book| Ok(book.table(table).is_some()))
    }

    fn rows(&self, store_id: &str, table: &str) -> Result<Vec<Vec<CellValue>>, String> {
        self.with_book(store_id, false, |book| book.rows(table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_only_opens_registered_workbooks() {
        let store = MemoryRowStore::new().with_workbook("book");
        assert!(store.open("book").is_ok());
        assert!(store.open("other").is_err());
    }

    #[test]
    fn memory_store_creates_tables_once() {
        let store = MemoryRowStore::new().with_workbook("book");
        assert_eq!(store.create_if_absent("book", "Sheet1"), Ok(true));
        assert_eq!(store.create_if_absent("book", "Sheet1"), Ok(false));
        assert_eq!(store.last_row_index("book", "Sheet1"), Ok(0));
    }

    #[test]
    fn file_store_persists_between_instances() {
        let dir = tempfile::tempdir().unwrap();

        let store = FileRowStore::new(dir.path());
        assert_eq!(store.create_if_absent("book", "Sheet1"), Ok(true));
        store
            .write_row("book", "Sheet1", 1, &[CellValue::text("Timestamp")])
            .unwrap();

        let reopened = FileRowStore::new(dir.path());
        assert_eq!(reopened.create_if_absent("book", "Sheet1"), Ok(false));
        assert_eq!(reopened.last_row_index("book", "Sheet1"), Ok(1));
        assert_eq!(
            reopened.rows("book", "Sheet1").unwrap(),
            vec![vec![CellValue::text("Timestamp")]]
        );
    }

    #[test]
    fn file_store_rejects_unsafe_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRowStore::new(dir.path());
        assert!(store.open("../escape").is_err());
        assert!(store.open("").is_err());
    }

    #[test]
    fn table_lookup_does_not_write_a_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRowStore::new(dir.path());

        assert_eq!(store.table_exists("book", "Sheet1"), Ok(false));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

        store.create_if_absent("book", "Sheet1").unwrap();
        assert_eq!(store.table_exists("book", "Sheet1"), Ok(true));
        assert_eq!(store.table_exists("book", "Other"), Ok(false));
    }

    #[test]
    fn file_store_needs_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRowStore::new(dir.path().join("missing"));
        assert!(store.open("book").is_err());
    }
}
