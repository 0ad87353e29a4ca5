use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::PLACEHOLDER_STORE_ID;
use crate::error::FormError;
use crate::store::RowStore;
use crate::workbook::{CellValue, HeaderStyle};

/// Column headers of a submissions table; data columns are positional
pub const HEADERS: [&str; 8] = [
    "Timestamp",
    "First Name",
    "Last Name",
    "Email",
    "Phone",
    "Company",
    "Subject",
    "Message",
];

/// A table that has been opened and carries its header row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub store_id: String,
    pub name: String,
}

/// Where a row landed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendResult {
    /// 1-based row the values were written to
    pub row_number: usize,
    pub field_count: usize,
}

/// Bridges submissions to a [`RowStore`]
pub struct RowStoreAdapter {
    store: Arc<dyn RowStore>,
}

impl RowStoreAdapter {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        RowStoreAdapter { store }
    }

    /// Open `store_id`, refusing the unconfigured placeholder id outright
    ///
    /// # Errors
    /// * `FormError::StoreUnavailable` for the placeholder id or when the
    ///   store cannot be opened
    pub fn open(&self, store_id: &str) -> Result<(), FormError> {
        if store_id.trim().is_empty() || store_id == PLACEHOLDER_STORE_ID {
            return Err(FormError::StoreUnavailable(
                "Please set FORMSHEET_STORE_ID to your actual workbook id".to_string(),
            ));
        }
        self.store.open(store_id).map_err(FormError::StoreUnavailable)
    }

    /// Open `store_id` and make sure `table_name` exists with its header row
    ///
    /// The header row is written, and styled, only when the table has no rows
    /// at all; calling this on a table that already has a header changes
    /// nothing.
    ///
    /// # Errors
    /// * `FormError::StoreUnavailable` if the store cannot be opened or the
    ///   table cannot be created or given its header
    pub fn ensure_table(&self, store_id: &str, table_name: &str) -> Result<TableRef, FormError> {
        self.open(store_id)?;

        if self
            .store
            .create_if_absent(store_id, table_name)
            .map_err(FormError::StoreUnavailable)?
        {
            info!("created table {} in {}", table_name, store_id);
        }

        let last_row = self
            .store
            .last_row_index(store_id, table_name)
            .map_err(FormError::StoreUnavailable)?;

        if last_row == 0 {
            let header: Vec<CellValue> = HEADERS.iter().map(|h| CellValue::text(*h)).collect();
            self.store
                .write_row(store_id, table_name, 1, &header)
                .map_err(FormError::StoreUnavailable)?;

            if let Err(e) = self
                .store
                .style_header(store_id, table_name, &HeaderStyle::default())
            {
                warn!("could not style header of {}: {}", table_name, e);
            }
            info!("wrote header row to {}", table_name);
        }

        Ok(TableRef {
            store_id: store_id.to_string(),
            name: table_name.to_string(),
        })
    }

    /// Append one row after the current last row
    ///
    /// The next index is read and then written in two store calls, so two
    /// concurrent appends may target the same row.
    ///
    /// # Errors
    /// * `FormError::AppendFailed` if the last row cannot be read or the
    ///   write fails
    pub fn append_row(
        &self,
        table: &TableRef,
        values: &[CellValue; 8],
    ) -> Result<AppendResult, FormError> {
        let next_row = self
            .store
            .last_row_index(&table.store_id, &table.name)
            .map_err(FormError::AppendFailed)?
            + 1;

        self.store
            .write_row(&table.store_id, &table.name, next_row, values)
            .map_err(FormError::AppendFailed)?;

        info!("data added to row {}", next_row);

        Ok(AppendResult {
            row_number: next_row,
            field_count: values.len(),
        })
    }

    /// Rows of an opened table, header first
    pub fn rows(&self, table: &TableRef) -> Result<Vec<Vec<CellValue>>, FormError> {
        self.store
            .rows(&table.store_id, &table.name)
            .map_err(FormError::StoreUnavailable)
    }

    /// Rows of `table_name` without creating it or its header
    ///
    /// A table that does not exist yet reads as empty.
    pub fn read_rows(&self, store_id: &str, table_name: &str) -> Result<Vec<Vec<CellValue>>, FormError> {
        self.open(store_id)?;
        if !self
            .store
            .table_exists(store_id, table_name)
            .map_err(FormError::StoreUnavailable)?
        {
            return Ok(Vec::new());
        }
        self.store
            .rows(store_id, table_name)
            .map_err(FormError::StoreUnavailable)
    }

    /// Last row of `table_name` without creating it, 0 when absent
    pub fn last_row(&self, store_id: &str, table_name: &str) -> Result<usize, FormError> {
        self.open(store_id)?;
        if !self
            .store
            .table_exists(store_id, table_name)
            .map_err(FormError::StoreUnavailable)?
        {
            return Ok(0);
        }
        self.store
            .last_row_index(store_id, table_name)
            .map_err(FormError::StoreUnavailable)
    }
}
