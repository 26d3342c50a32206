use thiserror::Error;

/// Convenience result type for reader operations.
pub type ReaderResult<T> = Result<T, ReaderError>;

/// Error type returned by readers and tabular sources.
///
/// Schema mismatches and per-row type problems are *not* errors: they are reported as data inside
/// [`crate::types::ReadBatch`]. This enum only covers failures of the underlying source and of the
/// caller's configuration.
#[derive(Debug, Error)]
pub enum ReaderError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "excel")]
    /// Workbook error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// CSV source error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// A schema document could not be parsed into column definitions.
    #[error("invalid schema: {message}")]
    Schema { message: String },

    /// The source format could not be determined or is not enabled in this build.
    #[error("unsupported format: {message}")]
    UnsupportedFormat { message: String },

    /// The requested worksheet does not exist in the workbook.
    #[error("sheet '{name}' not found")]
    SheetNotFound { name: String },

    /// `read` was called with a step that cannot advance the cursor.
    #[error("step size must be > 0 (got {step})")]
    InvalidStepSize { step: usize },
}

impl From<serde_json::Error> for ReaderError {
    fn from(err: serde_json::Error) -> Self {
        Self::Schema {
            message: err.to_string(),
        }
    }
}
