//! `chunked-sheet-reader` reads large spreadsheets (CSV and, with the `excel` feature, workbooks)
//! in bounded row windows, validating every row against a user-provided [`types::Schema`].
//!
//! The primary entrypoint is [`open::open_from_path`], which detects the source format from the
//! file extension (or you can force a format via [`open::ReaderOptions`]) and returns a
//! [`reader::ChunkedReader`].
//!
//! ## What a read produces
//!
//! Each call to [`reader::ChunkedReader::read`] returns a [`types::ReadBatch`]:
//!
//! - `list`: records of rows whose required cells passed their checks, keyed by column key
//! - `warn`: one message per failed cell; a warned row is dropped from `list`, reading continues
//! - `error`: schema errors found when the header row was reconciled; non-empty means the
//!   session is finished and no data will be produced
//!
//! **Column types:** `string`, `int`, `float`, `date` and `time`. Only required columns are
//! checked; empty cells and the text `NULL` are null.
//!
//! **File formats (auto-detected by extension):**
//!
//! - **CSV**: `.csv`
//! - **Excel/workbooks** (requires the Cargo feature `excel`): `.xlsx`, `.xls`, `.xlsm`, `.xlsb`, `.ods`
//!
//! ## Quick example
//!
//! ```no_run
//! use chunked_sheet_reader::open::{open_from_path, ReaderOptions};
//! use chunked_sheet_reader::types::Schema;
//!
//! # fn main() -> Result<(), chunked_sheet_reader::ReaderError> {
//! let schema = Schema::from_json_str(
//!     r#"[
//!         {"required": true, "type": "int", "name": "id"},
//!         {"required": true, "type": "date", "name": "Listed On", "key": "listed_on"},
//!         {"required": false, "type": "float", "name": "price"}
//!     ]"#,
//! )?;
//! let mut reader = open_from_path("listings.csv", &schema, &ReaderOptions::default())?;
//! while let Some(batch) = reader.read(1000)? {
//!     if batch.has_errors() {
//!         eprintln!("schema errors: {:?}", batch.error);
//!         break;
//!     }
//!     println!("{}", batch.to_json());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`open`]: path-based entrypoint and options
//! - [`reader`]: the chunked reader and header inspection
//! - [`source`]: the tabular source abstraction and CSV / workbook / in-memory sources
//! - [`validation`]: type classification, row windows and schema reconciliation
//! - [`types`]: schema, cell and batch types
//! - [`observability`]: observer hooks for logging and alerting
//! - [`error`]: error types used across the crate

pub mod error;
pub mod observability;
pub mod open;
pub mod reader;
pub mod source;
pub mod types;
pub mod validation;

pub use error::{ReaderError, ReaderResult};
pub use open::{open_from_path, read_all_from_path, ReaderOptions};
pub use reader::ChunkedReader;
pub use types::{CellValue, ColumnDefinition, ColumnType, ReadBatch, Record, Schema};
