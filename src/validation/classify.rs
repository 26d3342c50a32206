//! Per-cell type classification.
//!
//! Every predicate looks at both the source's native tag and the cell's textual rendering. None of
//! them coerce or fail: a value either satisfies a type or it does not.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use regex::{Captures, Regex};

use crate::types::{CellValue, ColumnDefinition, ColumnType};

static NUMERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?\s*$")
        .expect("Hardcode regex pattern")
});

// Date separators are captured separately and compared, since `regex` has no backreferences.
static DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([0-9]{4})([-/])([0-9]{1,2})([-/])([0-9]{1,2})(?:\s+([0-9]{1,2})(?::([0-9]{1,2})(?::([0-9]{1,2}))?)?)?$",
    )
    .expect("Hardcode regex pattern")
});

static TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([0-9]{4})([-/])([0-9]{1,2})([-/])([0-9]{1,2})\s+([0-9]{1,2}):([0-9]{1,2}):([0-9]{1,2})$",
    )
    .expect("Hardcode regex pattern")
});

/// The source reports no value, the text is empty, or it reads `NULL` (case-insensitive, trimmed).
///
/// Whitespace-only text is not null.
pub fn is_null(value: &CellValue) -> bool {
    if value.is_native_null() {
        return true;
    }
    let text = value.as_text();
    text.is_empty() || text.trim().eq_ignore_ascii_case("NULL")
}

/// Any non-null value is a valid string.
pub fn is_string(value: &CellValue) -> bool {
    !is_null(value)
}

/// Natively numeric, or text that reads as a base-10 number (sign, decimals and exponent allowed).
pub fn is_float(value: &CellValue) -> bool {
    value.is_native_number() || NUMERIC.is_match(value.as_text())
}

/// A float whose text has no decimal point.
///
/// Exponent forms such as `1e3` count as integers, matching [`is_float`]'s acceptance of them.
pub fn is_int(value: &CellValue) -> bool {
    is_float(value) && !value.as_text().contains('.')
}

/// `YYYY-MM-DD` or `YYYY/MM/DD`, optionally followed by `HH`, `HH:MM` or `HH:MM:SS`, naming a real
/// calendar date and clock time.
pub fn is_date(value: &CellValue) -> bool {
    DATE.captures(value.as_text())
        .is_some_and(|caps| is_valid_date_time(&caps))
}

/// `YYYY-MM-DD HH:MM:SS` (or `/`-separated date) naming a real calendar date and clock time.
pub fn is_time(value: &CellValue) -> bool {
    TIME.captures(value.as_text())
        .is_some_and(|caps| is_valid_date_time(&caps))
}

fn is_valid_date_time(caps: &Captures<'_>) -> bool {
    if caps[2] != caps[4] {
        return false;
    }
    let part = |i: usize| -> Option<u32> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };
    let (Ok(year), Some(month), Some(day)) = (caps[1].parse::<i32>(), part(3), part(5)) else {
        return false;
    };
    let (Some(hour), Some(minute), Some(second)) = (part(6), part(7), part(8)) else {
        return false;
    };
    NaiveDate::from_ymd_opt(year, month, day).is_some()
        && NaiveTime::from_hms_opt(hour, minute, second).is_some()
}

/// Whether `value` satisfies `column_type` (nulls are handled separately by [`check_cell`]).
pub fn matches_type(column_type: ColumnType, value: &CellValue) -> bool {
    match column_type {
        ColumnType::String => is_string(value),
        ColumnType::Int => is_int(value),
        ColumnType::Float => is_float(value),
        ColumnType::Date => is_date(value),
        ColumnType::Time => is_time(value),
    }
}

/// Validate one cell of `row` against its column definition.
///
/// Optional columns are never checked. Returns the warning message for a required cell that is
/// null or does not match the declared type.
pub fn check_cell(definition: &ColumnDefinition, row: usize, value: &CellValue) -> Option<String> {
    if !definition.required {
        return None;
    }
    if is_null(value) {
        return Some(format!("[{row}, {}] can't be NULL", definition.name));
    }
    if matches_type(definition.column_type, value) {
        return None;
    }
    Some(format!(
        "[{row}, {}] must be {} (which is '{}')",
        definition.name,
        definition.column_type.label(),
        value.as_text()
    ))
}
