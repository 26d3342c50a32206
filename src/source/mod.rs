//! Tabular sources: anything that can materialize a window of sheet rows on demand.
//!
//! A [`TabularSource`] is asked for one [`RowWindow`] at a time and returns a [`SheetWindow`]
//! holding only the cells of that window plus the bounds of populated data in the *whole* sheet.
//! Rows are 1-based (row 1 is the header row); columns are 0-based.
//!
//! Implementations:
//! - [`memory::MemorySource`]: rows already held in memory
//! - [`csv::CsvSource`]: CSV files or buffers, streamed on every load
//! - [`excel::ExcelSource`]: workbooks via `calamine` (feature `excel`)

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
pub mod memory;

use std::collections::HashMap;

use crate::error::ReaderResult;
use crate::types::CellValue;
use crate::validation::RowWindow;

pub use self::csv::CsvSource;
#[cfg(feature = "excel")]
pub use self::excel::ExcelSource;
pub use self::memory::MemorySource;

static NULL_CELL: CellValue = CellValue::Null;

/// Supported source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Comma-separated values.
    Csv,
    /// Spreadsheet/workbook formats (feature-gated behind `excel`).
    Excel,
    /// Rows supplied in memory.
    Memory,
}

impl SourceFormat {
    /// Parse a source format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Some(Self::Excel),
            _ => None,
        }
    }
}

/// Which worksheet of a workbook to read.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SheetSelection {
    /// The first sheet in workbook order (default).
    #[default]
    First,
    /// A single named sheet.
    Named(String),
}

/// A source of spreadsheet rows that can load a bounded window at a time.
pub trait TabularSource {
    /// Load the cells of rows inside `window` and report the whole sheet's populated bounds.
    fn load_window(&mut self, window: RowWindow) -> ReaderResult<SheetWindow>;
}

impl std::fmt::Debug for dyn TabularSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn TabularSource")
    }
}

impl<T: TabularSource + ?Sized> TabularSource for Box<T> {
    fn load_window(&mut self, window: RowWindow) -> ReaderResult<SheetWindow> {
        (**self).load_window(window)
    }
}

/// The cells of one loaded window.
///
/// Sources build it by feeding every populated cell of the sheet to [`SheetWindow::observe`]; only
/// cells inside the window are retained, all of them extend the sheet bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetWindow {
    window: RowWindow,
    highest_row: usize,
    highest_column: usize,
    rows: HashMap<usize, Vec<CellValue>>,
}

impl SheetWindow {
    /// An empty view over `window`.
    pub fn new(window: RowWindow) -> Self {
        Self {
            window,
            highest_row: 0,
            highest_column: 0,
            rows: HashMap::new(),
        }
    }

    /// Record one cell of the sheet. Null cells are ignored.
    pub fn observe(&mut self, row: usize, column: usize, value: CellValue) {
        if value.is_native_null() {
            return;
        }
        self.highest_row = self.highest_row.max(row);
        self.highest_column = self.highest_column.max(column + 1);
        if !self.window.includes(row) {
            return;
        }
        let cells = self.rows.entry(row).or_default();
        if cells.len() <= column {
            cells.resize(column + 1, CellValue::Null);
        }
        cells[column] = value;
    }

    /// The window this view was loaded for.
    pub fn window(&self) -> RowWindow {
        self.window
    }

    /// Last populated row of the whole sheet (1-based), 0 for an empty sheet.
    pub fn highest_row(&self) -> usize {
        self.highest_row
    }

    /// Number of populated columns in the whole sheet.
    pub fn highest_column(&self) -> usize {
        self.highest_column
    }

    /// Cell at `column` (0-based) and `row` (1-based); [`CellValue::Null`] outside the window or
    /// when the cell is empty.
    pub fn cell_at(&self, column: usize, row: usize) -> &CellValue {
        self.rows
            .get(&row)
            .and_then(|cells| cells.get(column))
            .unwrap_or(&NULL_CELL)
    }

    /// Populated width of a retained `row`: one past its last non-null cell, 0 outside the window.
    pub fn row_width(&self, row: usize) -> usize {
        self.rows.get(&row).map_or(0, Vec::len)
    }

    /// Number of non-empty rows retained from the window.
    pub fn loaded_rows(&self) -> usize {
        self.rows.len()
    }

    /// Drop the window's cells.
    pub fn release(self) {
        drop(self);
    }
}

#[cfg(test)]
mod tests {
    use super::{SheetWindow, SourceFormat};
    use crate::types::CellValue;
    use crate::validation::RowWindow;

    #[test]
    fn bounds_cover_whole_sheet_but_cells_only_window() {
        let mut view = SheetWindow::new(RowWindow::new(2, 3));
        view.observe(1, 0, CellValue::text("id"));
        view.observe(2, 0, CellValue::text("7"));
        view.observe(2, 2, CellValue::number(1.5));
        view.observe(9, 1, CellValue::text("late"));
        view.observe(12, 4, CellValue::Null);

        assert_eq!(view.highest_row(), 9);
        assert_eq!(view.highest_column(), 3);
        assert_eq!(view.loaded_rows(), 1);
        assert_eq!(view.cell_at(0, 2), &CellValue::text("7"));
        assert_eq!(view.cell_at(1, 2), &CellValue::Null);
        assert_eq!(view.cell_at(2, 2), &CellValue::number(1.5));
        assert_eq!(view.cell_at(0, 1), &CellValue::Null);
        assert_eq!(view.cell_at(1, 9), &CellValue::Null);
        assert_eq!(view.row_width(2), 3);
        assert_eq!(view.row_width(9), 0);
    }

    #[test]
    fn row_width_stops_at_last_populated_cell() {
        let mut view = SheetWindow::new(RowWindow::with_len(1, 1));
        view.observe(1, 0, CellValue::text("id"));
        view.observe(1, 1, CellValue::Null);
        view.observe(2, 4, CellValue::text("wide"));
        assert_eq!(view.row_width(1), 1);
        assert_eq!(view.highest_column(), 5);
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(SourceFormat::from_extension("CSV"), Some(SourceFormat::Csv));
        assert_eq!(SourceFormat::from_extension("xlsb"), Some(SourceFormat::Excel));
        assert_eq!(SourceFormat::from_extension("parquet"), None);
    }
}
