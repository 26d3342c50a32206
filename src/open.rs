//! Path-based entry point.
//!
//! Most callers should use [`open_from_path`], which picks a [`TabularSource`] for a file and
//! wraps it in a [`ChunkedReader`] configured from [`ReaderOptions`].
//!
//! - If [`ReaderOptions::format`] is `None`, the format is inferred from the file extension.
//! - If a [`ReadObserver`] is provided, it is attached to the reader and also told about failures
//!   to open the source.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{ReaderError, ReaderResult};
use crate::observability::{ReadContext, ReadObserver, ReadSeverity};
use crate::reader::{ChunkedReader, DEFAULT_STEP};
use crate::source::{CsvSource, SheetSelection, SourceFormat, TabularSource};
use crate::types::{ReadBatch, Schema};

/// A reader over whichever source [`open_from_path`] picked.
pub type DynReader = ChunkedReader<Box<dyn TabularSource>>;

/// Options controlling how a path is opened and read.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct ReaderOptions {
    /// If `None`, infer the format from the file extension.
    pub format: Option<SourceFormat>,
    /// Worksheet to read from a workbook.
    pub sheet: SheetSelection,
    /// Field delimiter for CSV sources.
    pub csv_delimiter: u8,
    /// Rows per window for [`read_all_from_path`].
    pub step_size: usize,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn ReadObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: ReadSeverity,
}

impl fmt::Debug for ReaderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderOptions")
            .field("format", &self.format)
            .field("sheet", &self.sheet)
            .field("csv_delimiter", &(self.csv_delimiter as char))
            .field("step_size", &self.step_size)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            format: None,
            sheet: SheetSelection::default(),
            csv_delimiter: b',',
            step_size: DEFAULT_STEP,
            observer: None,
            alert_at_or_above: ReadSeverity::Critical,
        }
    }
}

/// Open `path` as a chunked reader validating against `schema`.
///
/// # Examples
///
/// ## CSV (auto-detect by extension)
///
/// ```no_run
/// use chunked_sheet_reader::open::{open_from_path, ReaderOptions};
/// use chunked_sheet_reader::types::{ColumnDefinition, ColumnType, Schema};
///
/// # fn main() -> Result<(), chunked_sheet_reader::ReaderError> {
/// let schema = Schema::new(vec![
///     ColumnDefinition::required("id", ColumnType::Int),
///     ColumnDefinition::required("name", ColumnType::String),
/// ]);
/// let mut reader = open_from_path("people.csv", &schema, &ReaderOptions::default())?;
/// println!("headers={:?}", reader.headers()?);
/// while let Some(batch) = reader.read(500)? {
///     for error in &batch.error {
///         eprintln!("error: {error}");
///     }
///     for warn in &batch.warn {
///         eprintln!("warn: {warn}");
///     }
///     println!("rows={}", batch.list.len());
/// }
/// # Ok(())
/// # }
/// ```
///
/// ## Excel (feature-gated), named sheet and stderr observer
///
/// ```no_run
/// use std::sync::Arc;
///
/// use chunked_sheet_reader::observability::StdErrObserver;
/// use chunked_sheet_reader::open::{open_from_path, ReaderOptions};
/// use chunked_sheet_reader::source::SheetSelection;
/// use chunked_sheet_reader::types::Schema;
///
/// # fn main() -> Result<(), chunked_sheet_reader::ReaderError> {
/// let schema = Schema::load("schema.json")?;
/// let opts = ReaderOptions {
///     sheet: SheetSelection::Named("Orders".to_string()),
///     observer: Some(Arc::new(StdErrObserver)),
///     ..Default::default()
/// };
/// let mut reader = open_from_path("orders.xlsx", &schema, &opts)?;
/// let batches = reader.drain(opts.step_size)?;
/// println!("batches={}", batches.len());
/// # Ok(())
/// # }
/// ```
pub fn open_from_path(
    path: impl AsRef<Path>,
    schema: &Schema,
    options: &ReaderOptions,
) -> ReaderResult<DynReader> {
    let path = path.as_ref();
    let format = match options.format {
        Some(format) => format,
        None => infer_format_from_path(path).inspect_err(|e| {
            report_open_failure(options, ReadContext::for_path(path, SourceFormat::Memory), e)
        })?,
    };
    let ctx = ReadContext::for_path(path, format);
    let source = open_source(path, format, options)
        .inspect_err(|e| report_open_failure(options, ctx.clone(), e))?;

    let mut reader = ChunkedReader::new(source, schema.clone())
        .with_context(ctx)
        .with_alert_threshold(options.alert_at_or_above);
    if let Some(obs) = options.observer.as_ref() {
        reader = reader.with_observer(Arc::clone(obs));
    }
    Ok(reader)
}

/// Open `path` and read it to the end in windows of `options.step_size` rows.
pub fn read_all_from_path(
    path: impl AsRef<Path>,
    schema: &Schema,
    options: &ReaderOptions,
) -> ReaderResult<Vec<ReadBatch>> {
    open_from_path(path, schema, options)?.drain(options.step_size)
}

fn report_open_failure(options: &ReaderOptions, ctx: ReadContext, error: &ReaderError) {
    let Some(obs) = options.observer.as_ref() else {
        return;
    };
    let severity = ReadSeverity::for_error(error);
    obs.on_failure(&ctx, severity, error);
    if severity >= options.alert_at_or_above {
        obs.on_alert(&ctx, severity, error);
    }
}

fn open_source(
    path: &Path,
    format: SourceFormat,
    options: &ReaderOptions,
) -> ReaderResult<Box<dyn TabularSource>> {
    match format {
        SourceFormat::Csv => Ok(Box::new(
            CsvSource::from_path(path).with_delimiter(options.csv_delimiter),
        )),
        SourceFormat::Excel => open_excel(path, &options.sheet),
        SourceFormat::Memory => Err(ReaderError::UnsupportedFormat {
            message: format!("memory sources cannot be opened from a path ({})", path.display()),
        }),
    }
}

fn open_excel(path: &Path, sheet: &SheetSelection) -> ReaderResult<Box<dyn TabularSource>> {
    #[cfg(feature = "excel")]
    {
        Ok(Box::new(crate::source::ExcelSource::open(path, sheet)?))
    }

    #[cfg(not(feature = "excel"))]
    {
        let _ = sheet;
        Err(ReaderError::UnsupportedFormat {
            message: format!(
                "excel sources not enabled (enable cargo feature 'excel') for path ({})",
                path.display()
            ),
        })
    }
}

fn infer_format_from_path(path: &Path) -> ReaderResult<SourceFormat> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ReaderError::UnsupportedFormat {
            message: format!(
                "cannot infer format: path has no extension ({})",
                path.display()
            ),
        })?;

    SourceFormat::from_extension(ext).ok_or_else(|| ReaderError::UnsupportedFormat {
        message: format!(
            "cannot infer format from extension '{ext}' for path ({})",
            path.display()
        ),
    })
}

/// Owned description of a read, e.g. for enqueueing in a job system.
#[derive(Clone, Debug)]
pub struct ReadRequest {
    /// Path to the input file.
    pub path: PathBuf,
    /// Schema rows are validated against.
    pub schema: Schema,
    /// Options controlling the read.
    pub options: ReaderOptions,
}

impl ReadRequest {
    /// Open the reader described by this request.
    pub fn open(&self) -> ReaderResult<DynReader> {
        open_from_path(&self.path, &self.schema, &self.options)
    }

    /// Read the whole source, see [`read_all_from_path`].
    pub fn run(&self) -> ReaderResult<Vec<ReadBatch>> {
        read_all_from_path(&self.path, &self.schema, &self.options)
    }
}
