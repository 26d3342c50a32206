//! Core data model types for chunked reading.
//!
//! A reader is configured with a [`Schema`] (an ordered list of [`ColumnDefinition`]s, one per
//! expected spreadsheet column) and produces [`ReadBatch`]es of [`Record`]s whose values are the
//! raw [`CellValue`]s read from the source.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::ReaderResult;

/// Semantic type a required column's cells are validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Any non-null value.
    String,
    /// Numeric value without a decimal point.
    Int,
    /// Any numeric value.
    Float,
    /// `YYYY-MM-DD` (or `/`-separated) with an optional `HH[:MM[:SS]]` part.
    Date,
    /// `YYYY-MM-DD HH:MM:SS` (or `/`-separated date).
    Time,
}

impl ColumnType {
    /// Upper-case label used in warning messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::String => "STRING",
            Self::Int => "INT",
            Self::Float => "FLOAT",
            Self::Date => "DATE",
            Self::Time => "TIME",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A declared column: its header text, semantic type, whether it must be present and valid, and
/// the key it is emitted under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// If `false`, a missing header is tolerated and cell values are never validated.
    #[serde(default)]
    pub required: bool,
    /// Semantic type checked for required cells.
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Exact header text expected at this column's position.
    pub name: String,
    /// Record key; falls back to `name` when unset or empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl ColumnDefinition {
    /// A column that must be present in the header row and hold valid values.
    pub fn required(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            required: true,
            column_type,
            name: name.into(),
            key: None,
        }
    }

    /// A column that may be absent and whose values are passed through unchecked.
    pub fn optional(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            required: false,
            ..Self::required(name, column_type)
        }
    }

    /// Emit this column's values under `key` instead of its header name.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// The key values are emitted under.
    pub fn effective_key(&self) -> &str {
        match self.key.as_deref() {
            Some(key) if !key.is_empty() => key,
            _ => &self.name,
        }
    }
}

/// Ordered column definitions; position `i` describes spreadsheet column `i`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    /// Ordered list of columns.
    pub columns: Vec<ColumnDefinition>,
}

impl Schema {
    /// Create a new schema from column definitions.
    pub fn new(columns: Vec<ColumnDefinition>) -> Self {
        Self { columns }
    }

    /// Parse a schema from a JSON array of column definitions.
    ///
    /// ```rust
    /// use chunked_sheet_reader::types::{ColumnType, Schema};
    ///
    /// let schema = Schema::from_json_str(
    ///     r#"[{"required": true, "type": "int", "name": "id", "key": "c1"},
    ///         {"required": false, "type": "float", "name": "amt"}]"#,
    /// )
    /// .unwrap();
    /// assert_eq!(schema.len(), 2);
    /// assert_eq!(schema.columns[0].effective_key(), "c1");
    /// assert_eq!(schema.columns[1].column_type, ColumnType::Float);
    /// ```
    pub fn from_json_str(input: &str) -> ReaderResult<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Load a JSON schema document from disk.
    pub fn load(path: impl AsRef<Path>) -> ReaderResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Number of declared columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the schema declares no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterate column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

/// A raw cell value as reported by a source.
///
/// Carries the source's native tag together with the textual rendering, since classification
/// needs both (a numeric cell is always a float, a text cell only if its text parses).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CellValue {
    /// The source holds no value for this cell.
    Null,
    /// A natively numeric cell, rendered as text.
    Number(String),
    /// Any other cell, rendered as text.
    Text(String),
}

impl CellValue {
    /// Wrap a native number; integral values render without a fractional part.
    pub fn number(value: f64) -> Self {
        Self::Number(format_number(value))
    }

    /// Wrap text.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Textual rendering; empty for [`CellValue::Null`].
    pub fn as_text(&self) -> &str {
        match self {
            Self::Null => "",
            Self::Number(s) | Self::Text(s) => s,
        }
    }

    /// Whether the source reported no value.
    pub fn is_native_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether the source reported a numeric value.
    pub fn is_native_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_text())
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Number(s) => {
                if let Ok(i) = s.parse::<i64>() {
                    serializer.serialize_i64(i)
                } else if let Ok(f) = s.parse::<f64>() {
                    serializer.serialize_f64(f)
                } else {
                    serializer.serialize_str(s)
                }
            }
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// Render a float the way spreadsheet cells print: no trailing `.0` for integral values.
pub(crate) fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// One valid data row: column key to raw cell value, in schema order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    fields: Vec<(String, CellValue)>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value under `key`, replacing an earlier value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: CellValue) {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    /// `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, CellValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, CellValue)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Output of a single `read` call.
///
/// A non-empty `error` means the header row does not match the schema and no data will be produced
/// for the rest of the session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ReadBatch {
    /// Rows that passed validation.
    pub list: Vec<Record>,
    /// Row-level validation warnings; the affected rows are absent from `list`.
    pub warn: Vec<String>,
    /// Fatal schema errors.
    pub error: Vec<String>,
}

impl ReadBatch {
    /// Whether this batch carries fatal schema errors.
    pub fn has_errors(&self) -> bool {
        !self.error.is_empty()
    }

    /// Render as a JSON value (`{"list": [...], "warn": [...], "error": [...]}`).
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "list": self.list,
            "warn": self.warn,
            "error": self.error,
        })
    }
}
