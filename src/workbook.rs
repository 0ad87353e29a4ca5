use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell in a table row
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub enum CellValue {
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            CellValue::Timestamp(_) => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Timestamp(ts) => {
                f.write_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
        }
    }
}

/// Cosmetic styling applied to a header row
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct HeaderStyle {
    pub bold: bool,
    /// Background as 0xRRGGBB
    pub background: u32,
    /// Font color as 0xRRGGBB
    pub font_color: u32,
    pub auto_resize: bool,
}

impl Default for HeaderStyle {
    fn default() -> Self {
        HeaderStyle {
            bold: true,
            background: 0x4285F4,
            font_color: 0xFFFFFF,
            auto_resize: true,
        }
    }
}

/// A named table: rows addressed from 1, the first of which is usually a header
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Table {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
    pub header_style: Option<HeaderStyle>,
}

impl Table {
    pub fn create(name: &str) -> Self {
        Table {
            name: name.to_string(),
            rows: Vec::new(),
            header_style: None,
        }
    }

    /// Index of the last non-empty row, 0 for an empty table
    pub fn last_row(&self) -> usize {
        self.rows
            .iter()
            .rposition(|row| !row.is_empty())
            .map_or(0, |i| i + 1)
    }

    /// Write `values` at 1-based `row`, replacing whatever was there
    ///
    /// Rows between the current end and `row` are filled with empty rows.
    pub fn write_row(&mut self, row: usize, values: &[CellValue]) -> Result<(), String> {
        if row == 0 {
            return Err("Row indices start at 1".to_string());
        }
        if values.is_empty() {
            return Err("Cannot write an empty row".to_string());
        }
        while self.rows.len() < row {
            self.rows.push(Vec::new());
        }
        self.rows[row - 1] = values.to_vec();
        Ok(())
    }

    /// Row at 1-based `row`
    pub fn row(&self, row: usize) -> Option<&[CellValue]> {
        row.checked_sub(1)
            .and_then(|i| self.rows.get(i))
            .map(|r| r.as_slice())
    }
}

/// A collection of named tables, the unit a row store opens by id
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct Workbook {
    pub tables: Vec<Table>,
}

impl Workbook {
    pub fn new() -> Self {
        Workbook::default()
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.iter_mut().find(|t| t.name == name)
    }

    /// Add an empty table named `name` unless one exists; true when added
    pub fn insert_table(&mut self, name: &str) -> bool {
        if self.table(name).is_some() {
            return false;
        }
        self.tables.push(Table::create(name));
        true
    }

    pub fn last_row_index(&self, table: &str) -> Result<usize, String> {
        self.table(table)
            .map(Table::last_row)
            .ok_or_else(|| missing_table(table))
    }

    pub fn write_row(&mut self, table: &str, row: usize, values: &[CellValue]) -> Result<(), String> {
        self.table_mut(table)
            .ok_or_else(|| missing_table(table))?
            .write_row(row, values)
    }

    pub fn style_header(&mut self, table: &str, style: &HeaderStyle) -> Result<(), String> {
        let table = self.table_mut(table).ok_or_else(|| missing_table(table))?;
        table.header_style = Some(style.clone());
        Ok(())
    }

    pub fn rows(&self, table: &str) -> Result<Vec<Vec<CellValue>>, String> {
        self.table(table)
            .map(|t| t.rows.clone())
            .ok_or_else(|| missing_table(table))
    }
}

fn missing_table(name: &str) -> String {
    format!("Table '{}' does not exist", name)
}
