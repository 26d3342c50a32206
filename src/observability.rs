//! Observer hooks for reader activity.
//!
//! A [`ReadObserver`] attached to a [`crate::reader::ChunkedReader`] is told about header loads,
//! every batch produced, fatal schema errors and source failures. Failures at or above the
//! reader's alert threshold are additionally passed to [`ReadObserver::on_alert`].

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::ReaderError;
use crate::source::SourceFormat;
use crate::validation::RowWindow;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (operation failed).
    Error,
    /// Critical error (typically I/O or other infrastructure failures).
    Critical,
}

impl ReadSeverity {
    /// Severity of a source/configuration failure: I/O problems are critical, the rest are errors.
    pub fn for_error(error: &ReaderError) -> Self {
        match error {
            ReaderError::Io(_) => Self::Critical,
            ReaderError::Csv(err) => match err.kind() {
                csv::ErrorKind::Io(_) => Self::Critical,
                _ => Self::Error,
            },
            #[cfg(feature = "excel")]
            ReaderError::Excel(calamine::Error::Io(_)) => Self::Critical,
            _ => Self::Error,
        }
    }
}

/// Identifies the reader an event came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadContext {
    /// Path or label of the source.
    pub source: String,
    /// Format of the source.
    pub format: SourceFormat,
}

impl ReadContext {
    /// Context for a file-backed source.
    pub fn for_path(path: impl AsRef<Path>, format: SourceFormat) -> Self {
        Self {
            source: path.as_ref().display().to_string(),
            format,
        }
    }
}

impl Default for ReadContext {
    fn default() -> Self {
        Self {
            source: "<memory>".to_string(),
            format: SourceFormat::Memory,
        }
    }
}

/// Per-batch stats reported after each successful `read`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    /// Window requested from the source.
    pub window: RowWindow,
    /// Rows emitted in `list`.
    pub rows: usize,
    /// Rows dropped because of warnings.
    pub warned_rows: usize,
    /// Warning messages produced.
    pub warnings: usize,
    /// Whether this batch finished the session.
    pub finished: bool,
}

/// Observer interface for reader activity.
///
/// Implementors can record metrics, logs, or trigger alerts. All hooks default to no-ops.
pub trait ReadObserver: Send + Sync {
    /// Called once when the header row is loaded.
    fn on_headers(&self, _ctx: &ReadContext, _headers: &[String]) {}

    /// Called after every batch of data rows.
    fn on_batch(&self, _ctx: &ReadContext, _stats: BatchStats) {}

    /// Called when the header row does not satisfy the schema.
    fn on_schema_error(&self, _ctx: &ReadContext, _errors: &[String]) {}

    /// Called when the source fails.
    fn on_failure(&self, _ctx: &ReadContext, _severity: ReadSeverity, _error: &ReaderError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &ReadContext, severity: ReadSeverity, error: &ReaderError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Fans every callback out to a list of observers, in order.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ReadObserver>>,
}

impl CompositeObserver {
    /// Combine `observers`.
    pub fn new(observers: Vec<Arc<dyn ReadObserver>>) -> Self {
        Self { observers }
    }

    /// Add another observer after the existing ones.
    pub fn push(&mut self, observer: Arc<dyn ReadObserver>) {
        self.observers.push(observer);
    }

    fn each(&self, f: impl Fn(&dyn ReadObserver)) {
        self.observers.iter().for_each(|o| f(o.as_ref()));
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompositeObserver({} observers)", self.observers.len())
    }
}

impl ReadObserver for CompositeObserver {
    fn on_headers(&self, ctx: &ReadContext, headers: &[String]) {
        self.each(|o| o.on_headers(ctx, headers));
    }

    fn on_batch(&self, ctx: &ReadContext, stats: BatchStats) {
        self.each(|o| o.on_batch(ctx, stats));
    }

    fn on_schema_error(&self, ctx: &ReadContext, errors: &[String]) {
        self.each(|o| o.on_schema_error(ctx, errors));
    }

    fn on_failure(&self, ctx: &ReadContext, severity: ReadSeverity, error: &ReaderError) {
        self.each(|o| o.on_failure(ctx, severity, error));
    }

    fn on_alert(&self, ctx: &ReadContext, severity: ReadSeverity, error: &ReaderError) {
        self.each(|o| o.on_alert(ctx, severity, error));
    }
}

/// Logs reader events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl ReadObserver for StdErrObserver {
    fn on_batch(&self, ctx: &ReadContext, stats: BatchStats) {
        eprintln!(
            "[read][ok] format={:?} source={} window={} rows={} warned={} finished={}",
            ctx.format, ctx.source, stats.window, stats.rows, stats.warned_rows, stats.finished
        );
    }

    fn on_schema_error(&self, ctx: &ReadContext, errors: &[String]) {
        eprintln!(
            "[read][schema] format={:?} source={} errors={:?}",
            ctx.format, ctx.source, errors
        );
    }

    fn on_failure(&self, ctx: &ReadContext, severity: ReadSeverity, error: &ReaderError) {
        eprintln!(
            "[read][{:?}] format={:?} source={} err={}",
            severity, ctx.format, ctx.source, error
        );
    }

    fn on_alert(&self, ctx: &ReadContext, severity: ReadSeverity, error: &ReaderError) {
        eprintln!(
            "[ALERT][read][{:?}] format={:?} source={} err={}",
            severity, ctx.format, ctx.source, error
        );
    }
}

/// Forwards reader events to the `log` facade.
#[derive(Debug, Default)]
pub struct LogObserver;

impl ReadObserver for LogObserver {
    fn on_headers(&self, ctx: &ReadContext, headers: &[String]) {
        log::debug!("headers of {}: {:?}", ctx.source, headers);
    }

    fn on_batch(&self, ctx: &ReadContext, stats: BatchStats) {
        log::info!(
            "read {} from {}: {} row(s), {} warned, finished={}",
            stats.window,
            ctx.source,
            stats.rows,
            stats.warned_rows,
            stats.finished
        );
    }

    fn on_schema_error(&self, ctx: &ReadContext, errors: &[String]) {
        for e in errors {
            log::warn!("{}: {}", ctx.source, e);
        }
    }

    fn on_failure(&self, ctx: &ReadContext, severity: ReadSeverity, error: &ReaderError) {
        log::error!("{} ({:?}): {}", ctx.source, severity, error);
    }
}

/// Appends one line per reader event to a local file.
///
/// Lines read `<unix secs> [<event>] <source> (<format>) <details>`. Writing is best-effort: a
/// file that cannot be opened or written is skipped silently.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Append events to `path`, creating it on first write.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    /// The log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_event(&self, event: &str, ctx: &ReadContext, details: fmt::Arguments<'_>) {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
        let _guard = self.lock.lock();
        let file = OpenOptions::new().create(true).append(true).open(&self.path);
        if let Ok(mut file) = file {
            let _ = writeln!(
                file,
                "{secs} [{event}] {} ({:?}) {details}",
                ctx.source, ctx.format
            );
        }
    }
}

impl ReadObserver for FileObserver {
    fn on_headers(&self, ctx: &ReadContext, headers: &[String]) {
        self.write_event("headers", ctx, format_args!("{headers:?}"));
    }

    fn on_batch(&self, ctx: &ReadContext, stats: BatchStats) {
        self.write_event(
            "batch",
            ctx,
            format_args!(
                "window={} rows={} warned={} finished={}",
                stats.window, stats.rows, stats.warned_rows, stats.finished
            ),
        );
    }

    fn on_schema_error(&self, ctx: &ReadContext, errors: &[String]) {
        self.write_event("schema", ctx, format_args!("{}", errors.join("; ")));
    }

    fn on_failure(&self, ctx: &ReadContext, severity: ReadSeverity, error: &ReaderError) {
        self.write_event("failure", ctx, format_args!("{severity:?}: {error}"));
    }

    fn on_alert(&self, ctx: &ReadContext, severity: ReadSeverity, error: &ReaderError) {
        self.write_event("ALERT", ctx, format_args!("{severity:?}: {error}"));
    }
}
