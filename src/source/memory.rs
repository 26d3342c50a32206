//! In-memory source.

use crate::error::ReaderResult;
use crate::types::CellValue;
use crate::validation::RowWindow;

use super::{SheetWindow, TabularSource};

/// Rows held in memory; `rows[0]` is sheet row 1 (the header row).
///
/// Counts how many windows were loaded, which makes it convenient for checking load behavior.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    rows: Vec<Vec<CellValue>>,
    loads: usize,
}

impl MemorySource {
    /// Create a source from raw cell rows.
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows, loads: 0 }
    }

    /// Create a source from text rows; empty strings become [`CellValue::Null`].
    pub fn from_text_rows<R, S>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|s| match s.as_ref() {
                        "" => CellValue::Null,
                        text => CellValue::text(text),
                    })
                    .collect()
            })
            .collect();
        Self::new(rows)
    }

    /// Number of `load_window` calls served so far.
    pub fn load_count(&self) -> usize {
        self.loads
    }

    /// Number of rows including the header row.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

impl TabularSource for MemorySource {
    fn load_window(&mut self, window: RowWindow) -> ReaderResult<SheetWindow> {
        self.loads += 1;
        let mut view = SheetWindow::new(window);
        for (idx0, row) in self.rows.iter().enumerate() {
            for (column, value) in row.iter().enumerate() {
                view.observe(idx0 + 1, column, value.clone());
            }
        }
        Ok(view)
    }
}
