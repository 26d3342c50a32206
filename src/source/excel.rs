#![cfg(feature = "excel")]

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, DataRef, Reader, Sheets};

use crate::error::{ReaderError, ReaderResult};
use crate::types::CellValue;
use crate::validation::RowWindow;

use super::{SheetSelection, SheetWindow, TabularSource};

/// One worksheet of a workbook (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`).
///
/// Behavior:
/// - `.xlsx`/`.xlsb` windows stream cells through calamine's cell reader, keeping only the rows
///   inside the window
/// - `.xls`/`.ods` have no streaming reader; the sheet range is loaded and only the window's rows
///   are copied out before it is dropped
/// - Date cells are reported as their numeric serial value
pub struct ExcelSource {
    path: PathBuf,
    workbook: Sheets<BufReader<File>>,
    sheet: String,
}

impl ExcelSource {
    /// Open a workbook and select the sheet to read.
    pub fn open(path: impl AsRef<Path>, selection: &SheetSelection) -> ReaderResult<Self> {
        let path = path.as_ref();
        let workbook = open_workbook_auto(path)?;
        let names = workbook.sheet_names();
        let sheet = match selection {
            SheetSelection::First => names.first().cloned().ok_or_else(|| {
                ReaderError::SheetNotFound {
                    name: "<first>".to_string(),
                }
            })?,
            SheetSelection::Named(name) => names
                .iter()
                .find(|n| *n == name)
                .cloned()
                .ok_or_else(|| ReaderError::SheetNotFound { name: name.clone() })?,
        };
        Ok(Self {
            path: path.to_path_buf(),
            workbook,
            sheet,
        })
    }

    /// Name of the selected sheet.
    pub fn sheet_name(&self) -> &str {
        &self.sheet
    }

    /// Path of the workbook.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for ExcelSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExcelSource")
            .field("path", &self.path)
            .field("sheet", &self.sheet)
            .finish()
    }
}

impl TabularSource for ExcelSource {
    fn load_window(&mut self, window: RowWindow) -> ReaderResult<SheetWindow> {
        let mut view = SheetWindow::new(window);
        match &mut self.workbook {
            Sheets::Xlsx(xlsx) => {
                let mut cells = xlsx
                    .worksheet_cells_reader(&self.sheet)
                    .map_err(calamine::Error::from)?;
                while let Some(cell) = cells.next_cell().map_err(calamine::Error::from)? {
                    let (row, column) = cell.get_position();
                    view.observe(row as usize + 1, column as usize, from_data_ref(cell.get_value()));
                }
            }
            Sheets::Xlsb(xlsb) => {
                let mut cells = xlsb
                    .worksheet_cells_reader(&self.sheet)
                    .map_err(calamine::Error::from)?;
                while let Some(cell) = cells.next_cell().map_err(calamine::Error::from)? {
                    let (row, column) = cell.get_position();
                    view.observe(row as usize + 1, column as usize, from_data_ref(cell.get_value()));
                }
            }
            other => {
                let range = other.worksheet_range(&self.sheet)?;
                if let Some((row0, column0)) = range.start() {
                    for (r, c, data) in range.used_cells() {
                        let row = row0 as usize + r + 1;
                        let column = column0 as usize + c;
                        view.observe(row, column, from_data(data));
                    }
                }
            }
        }
        Ok(view)
    }
}

fn from_data(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(i.to_string()),
        Data::Float(f) => CellValue::number(*f),
        Data::String(s) => CellValue::text(s.as_str()),
        Data::Bool(b) => CellValue::text(if *b { "TRUE" } else { "FALSE" }),
        Data::DateTime(dt) => CellValue::number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::text(s.as_str()),
        Data::Error(e) => CellValue::text(e.to_string()),
        Data::Empty => CellValue::Null,
    }
}

fn from_data_ref(data: &DataRef<'_>) -> CellValue {
    match data {
        DataRef::Int(i) => CellValue::Number(i.to_string()),
        DataRef::Float(f) => CellValue::number(*f),
        DataRef::String(s) => CellValue::text(s.to_string()),
        DataRef::SharedString(s) => CellValue::text(*s),
        DataRef::Bool(b) => CellValue::text(if *b { "TRUE" } else { "FALSE" }),
        DataRef::DateTime(dt) => CellValue::number(dt.as_f64()),
        DataRef::DateTimeIso(s) | DataRef::DurationIso(s) => CellValue::text(s.to_string()),
        DataRef::Error(e) => CellValue::text(e.to_string()),
        DataRef::Empty => CellValue::Null,
    }
}
