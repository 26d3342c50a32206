//! Half-open row windows used to bound how much of a sheet a source materializes.

use std::fmt;

/// A band of 1-based row indexes `[start, end)`.
///
/// An `end` at or below `start` means the window is unbounded above, i.e. every row from `start`
/// on is included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowWindow {
    start: usize,
    end: usize,
}

impl RowWindow {
    /// Window over `[start, end)`; unbounded when `end <= start`.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Window of `len` rows beginning at `start`.
    pub fn with_len(start: usize, len: usize) -> Self {
        Self::new(start, start.saturating_add(len))
    }

    /// Every row from `start` on.
    pub fn unbounded(start: usize) -> Self {
        Self::new(start, start)
    }

    /// First row of the window (inclusive).
    pub fn start(&self) -> usize {
        self.start
    }

    /// Exclusive upper bound, or `None` if unbounded.
    pub fn end(&self) -> Option<usize> {
        (!self.is_unbounded()).then_some(self.end)
    }

    /// Whether the window has no upper bound.
    pub fn is_unbounded(&self) -> bool {
        self.end <= self.start
    }

    /// Whether `row` falls inside the window.
    pub fn includes(&self, row: usize) -> bool {
        row >= self.start && (self.is_unbounded() || row < self.end)
    }
}

impl fmt::Display for RowWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end() {
            Some(end) => write!(f, "[{}, {})", self.start, end),
            None => write!(f, "[{}, ..)", self.start),
        }
    }
}
