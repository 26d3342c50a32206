//! The chunked reader.
//!
//! [`ChunkedReader`] walks a [`TabularSource`] one bounded window at a time. The first call reads
//! the header row, reconciles it against the [`Schema`] and skips it; every call then loads the
//! next window, validates each required cell and returns the rows as a [`ReadBatch`]. Only the
//! cursor, the finished flag, the header row and the reconciliation survive between calls.
//!
//! ```rust
//! use chunked_sheet_reader::reader::ChunkedReader;
//! use chunked_sheet_reader::source::MemorySource;
//! use chunked_sheet_reader::types::{ColumnDefinition, ColumnType, Schema};
//!
//! # fn main() -> Result<(), chunked_sheet_reader::ReaderError> {
//! let schema = Schema::new(vec![
//!     ColumnDefinition::required("id", ColumnType::Int),
//!     ColumnDefinition::optional("amt", ColumnType::Float),
//! ]);
//! let source = MemorySource::from_text_rows([["id", "amt"], ["7", "3.5"], ["x", "2"]]);
//! let mut reader = ChunkedReader::new(source, schema);
//!
//! while let Some(batch) = reader.read(10)? {
//!     assert!(batch.error.is_empty());
//!     assert_eq!(batch.list.len(), 1);
//!     assert_eq!(batch.warn, vec!["[3, id] must be INT (which is 'x')".to_string()]);
//! }
//! assert!(reader.finished());
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use log::{debug, trace};

use crate::error::{ReaderError, ReaderResult};
use crate::observability::{BatchStats, ReadContext, ReadObserver, ReadSeverity};
use crate::source::{SheetWindow, TabularSource};
use crate::types::{ReadBatch, Record, Schema};
use crate::validation::{check_cell, Reconciliation, RowWindow};

/// Row index of the header row.
pub const FIRST_ROW: usize = 1;

/// Step used by [`ChunkedReader::read_default`].
pub const DEFAULT_STEP: usize = 1024;

/// Stateful, windowed reader validating rows against a schema.
///
/// Not meant to be shared between threads: the cursor belongs to one caller's sequence of
/// `read` calls. Use one reader per consumer.
pub struct ChunkedReader<S> {
    source: S,
    schema: Schema,
    cursor: usize,
    finished: bool,
    headers: Option<Vec<String>>,
    reconciliation: Option<Reconciliation>,
    context: ReadContext,
    observer: Option<Arc<dyn ReadObserver>>,
    alert_at_or_above: ReadSeverity,
}

impl<S: fmt::Debug> fmt::Debug for ChunkedReader<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkedReader")
            .field("source", &self.source)
            .field("schema_columns", &self.schema.len())
            .field("cursor", &self.cursor)
            .field("finished", &self.finished)
            .field("headers", &self.headers)
            .field("observer_set", &self.observer.is_some())
            .finish()
    }
}

impl<S: TabularSource> ChunkedReader<S> {
    /// Create a reader positioned at the header row.
    pub fn new(source: S, schema: Schema) -> Self {
        Self {
            source,
            schema,
            cursor: FIRST_ROW,
            finished: false,
            headers: None,
            reconciliation: None,
            context: ReadContext::default(),
            observer: None,
            alert_at_or_above: ReadSeverity::Critical,
        }
    }

    /// Describe the source in observer callbacks and log records.
    pub fn with_context(mut self, context: ReadContext) -> Self {
        self.context = context;
        self
    }

    /// Attach an observer for reader events.
    pub fn with_observer(mut self, observer: Arc<dyn ReadObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Severity at or above which source failures are passed to `on_alert` (default `Critical`).
    pub fn with_alert_threshold(mut self, severity: ReadSeverity) -> Self {
        self.alert_at_or_above = severity;
        self
    }

    /// The declared schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Consume the reader, returning the source.
    pub fn into_source(self) -> S {
        self.source
    }

    /// First row not yet emitted (the header row before the first read).
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether the whole sheet has been read or a schema error ended the session.
    pub fn finished(&self) -> bool {
        self.finished
    }

    /// Rewind to the header row so the sheet can be read again.
    ///
    /// The cached header row and reconciliation are kept; they describe the file, not the position.
    pub fn reset(&mut self) {
        debug!("resetting reader for {}", self.context.source);
        self.cursor = FIRST_ROW;
        self.finished = false;
    }

    /// The sheet's header row, loaded on first use with a one-row window.
    ///
    /// Does not move the cursor, so it is safe to call before the first [`Self::read`].
    pub fn headers(&mut self) -> ReaderResult<&[String]> {
        if self.headers.is_none() {
            let headers = self.load_headers()?;
            self.notify(|o, ctx| o.on_headers(ctx, &headers));
            self.headers = Some(headers);
        }
        Ok(self.headers.as_deref().unwrap_or_default())
    }

    /// Reconcile the schema against the header row, once per reader.
    pub fn reconciliation(&mut self) -> ReaderResult<&Reconciliation> {
        let reconciliation = match self.reconciliation.take() {
            Some(reconciliation) => reconciliation,
            None => {
                self.headers()?;
                let headers = self.headers.as_deref().unwrap_or_default();
                let reconciliation = Reconciliation::reconcile(&self.schema, headers);
                debug!(
                    "reconciled {} column(s) of {}: {} existing, {} error(s)",
                    self.schema.len(),
                    self.context.source,
                    reconciliation.existing().count(),
                    reconciliation.errors().len()
                );
                reconciliation
            }
        };
        Ok(&*self.reconciliation.insert(reconciliation))
    }

    /// Read the next `step` rows.
    ///
    /// Returns `Ok(None)` once the reader is finished. A batch with a non-empty `error` ends the
    /// session; rows with warnings are left out of `list` but reading continues.
    ///
    /// # Errors
    ///
    /// Fails with [`ReaderError::InvalidStepSize`] for a zero step, or with the source's error if
    /// a window cannot be loaded. No data row is skipped on failure: the next call asks for the
    /// same window again.
    pub fn read(&mut self, step: usize) -> ReaderResult<Option<ReadBatch>> {
        if self.finished {
            return Ok(None);
        }
        if step == 0 {
            return Err(ReaderError::InvalidStepSize { step });
        }

        if self.cursor == FIRST_ROW {
            let errors = self.reconciliation()?.errors().to_vec();
            self.cursor += 1;
            if !errors.is_empty() {
                self.finished = true;
                self.notify(|o, ctx| o.on_schema_error(ctx, &errors));
                return Ok(Some(ReadBatch {
                    error: errors,
                    ..ReadBatch::default()
                }));
            }
        }

        let start = self.cursor;
        let end = start.saturating_add(step);
        let window = RowWindow::new(start, end);
        let view = self.load(window)?;
        let finished = view.highest_row() < end;

        let (batch, warned_rows) = validate_window(self.reconciliation()?, &view, start, end);
        trace!(
            "window {window}: highest row {}, {} row(s), {} warned",
            view.highest_row(),
            batch.list.len(),
            warned_rows
        );
        view.release();

        self.cursor = end;
        self.finished = finished;
        let stats = BatchStats {
            window,
            rows: batch.list.len(),
            warned_rows,
            warnings: batch.warn.len(),
            finished,
        };
        self.notify(|o, ctx| o.on_batch(ctx, stats));
        Ok(Some(batch))
    }

    /// Read the next [`DEFAULT_STEP`] rows.
    pub fn read_default(&mut self) -> ReaderResult<Option<ReadBatch>> {
        self.read(DEFAULT_STEP)
    }

    /// Read until finished, collecting every batch.
    pub fn drain(&mut self, step: usize) -> ReaderResult<Vec<ReadBatch>> {
        let mut batches = Vec::new();
        while let Some(batch) = self.read(step)? {
            batches.push(batch);
        }
        Ok(batches)
    }

    fn load_headers(&mut self) -> ReaderResult<Vec<String>> {
        let view = self.load(RowWindow::with_len(FIRST_ROW, 1))?;
        let headers = (0..view.row_width(FIRST_ROW))
            .map(|column| view.cell_at(column, FIRST_ROW).as_text().to_string())
            .collect();
        view.release();
        Ok(headers)
    }

    fn load(&mut self, window: RowWindow) -> ReaderResult<SheetWindow> {
        debug!("loading window {window} of {}", self.context.source);
        self.source
            .load_window(window)
            .inspect_err(|e| self.report_failure(e))
    }

    fn report_failure(&self, error: &ReaderError) {
        if let Some(obs) = &self.observer {
            let severity = ReadSeverity::for_error(error);
            obs.on_failure(&self.context, severity, error);
            if severity >= self.alert_at_or_above {
                obs.on_alert(&self.context, severity, error);
            }
        }
    }

    fn notify(&self, f: impl FnOnce(&dyn ReadObserver, &ReadContext)) {
        if let Some(obs) = &self.observer {
            f(obs.as_ref(), &self.context);
        }
    }
}

/// Validate rows `[start, min(highest_row + 1, end))` of a loaded window.
///
/// Every existing column of a row is checked before the row is kept or dropped, so all of its
/// warnings are reported. Returns the batch and the number of dropped rows.
fn validate_window(
    reconciliation: &Reconciliation,
    view: &SheetWindow,
    start: usize,
    end: usize,
) -> (ReadBatch, usize) {
    let highest_column = view.highest_column();
    let last = view.highest_row().min(end - 1);

    let mut batch = ReadBatch::default();
    let mut warned_rows = 0;
    for row in start..=last {
        let mut record = Record::new();
        let mut warnings = Vec::new();
        for column in reconciliation
            .existing()
            .filter(|c| c.index < highest_column)
        {
            let value = view.cell_at(column.index, row);
            if let Some(warning) = check_cell(&column.definition, row, value) {
                warnings.push(warning);
            }
            record.insert(column.key.as_str(), value.clone());
        }
        if warnings.is_empty() {
            batch.list.push(record);
        } else {
            warned_rows += 1;
            batch.warn.append(&mut warnings);
        }
    }
    (batch, warned_rows)
}

#[cfg(test)]
mod tests {
    use super::{ChunkedReader, FIRST_ROW};
    use crate::error::ReaderError;
    use crate::source::MemorySource;
    use crate::types::{ColumnDefinition, ColumnType, Schema};

    fn reader(rows: &[&[&str]]) -> ChunkedReader<MemorySource> {
        let schema = Schema::new(vec![
            ColumnDefinition::required("id", ColumnType::Int),
            ColumnDefinition::optional("amt", ColumnType::Float),
        ]);
        ChunkedReader::new(MemorySource::from_text_rows(rows.iter().map(|r| r.iter())), schema)
    }

    #[test]
    fn zero_step_is_rejected_without_moving() {
        let mut r = reader(&[&["id", "amt"], &["1", "2"]]);
        let err = r.read(0).unwrap_err();
        assert!(matches!(err, ReaderError::InvalidStepSize { step: 0 }));
        assert_eq!(r.cursor(), FIRST_ROW);
        assert!(!r.finished());
    }

    #[test]
    fn cursor_advances_by_step() {
        let mut r = reader(&[&["id", "amt"], &["1", "2"], &["2", "3"], &["3", "4"]]);
        r.read(2).unwrap();
        assert_eq!(r.cursor(), 4);
        assert!(!r.finished());
        r.read(2).unwrap();
        assert_eq!(r.cursor(), 6);
        assert!(r.finished());
        assert_eq!(r.read(2).unwrap(), None);
    }

    #[test]
    fn reset_keeps_cached_header_and_reconciliation() {
        let mut r = reader(&[&["id", "amt"], &["1", "2"]]);
        r.drain(10).unwrap();
        let loads = r.source().load_count();
        r.reset();
        assert_eq!(r.cursor(), FIRST_ROW);
        assert!(!r.finished());
        r.drain(10).unwrap();
        // Only the data window is reloaded.
        assert_eq!(r.source().load_count(), loads + 1);
    }
}
