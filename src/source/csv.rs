//! Windowed CSV source.

use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::ReaderResult;
use crate::types::CellValue;
use crate::validation::RowWindow;

use super::{SheetWindow, TabularSource};

#[derive(Debug, Clone)]
enum CsvInput {
    Path(PathBuf),
    Bytes(Arc<[u8]>),
}

/// A CSV file (or buffer) read as a sheet: record 1 is the header row.
///
/// Each load re-streams the input from the start and keeps only the records inside the window,
/// so memory stays bounded by the window size. Every field is text; empty fields are null.
#[derive(Debug, Clone)]
pub struct CsvSource {
    input: CsvInput,
    delimiter: u8,
}

impl CsvSource {
    /// Read CSV from a file path.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self {
            input: CsvInput::Path(path.as_ref().to_path_buf()),
            delimiter: b',',
        }
    }

    /// Read CSV from an in-memory buffer.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            input: CsvInput::Bytes(Arc::from(bytes.into())),
            delimiter: b',',
        }
    }

    /// Use a field delimiter other than `,`.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    fn open(&self) -> io::Result<Box<dyn Read>> {
        Ok(match &self.input {
            CsvInput::Path(path) => Box::new(File::open(path)?),
            CsvInput::Bytes(bytes) => Box::new(Cursor::new(Arc::clone(bytes))),
        })
    }
}

impl TabularSource for CsvSource {
    fn load_window(&mut self, window: RowWindow) -> ReaderResult<SheetWindow> {
        let mut rdr = ::csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_reader(self.open()?);

        let mut view = SheetWindow::new(window);
        let mut record = ::csv::StringRecord::new();
        let mut row = 0usize;
        while rdr.read_record(&mut record)? {
            row += 1;
            for (column, field) in record.iter().enumerate() {
                if !field.is_empty() {
                    view.observe(row, column, CellValue::text(field));
                }
            }
        }
        Ok(view)
    }
}
