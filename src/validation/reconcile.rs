//! Matching declared columns against a sheet's header row.

use crate::types::{ColumnDefinition, Schema};

/// A declared column after reconciliation: where it lives, which key it is emitted under, and
/// whether it may be read at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumn {
    /// 0-based column position in the sheet.
    pub index: usize,
    /// Record key (the definition's key, or its name).
    pub key: String,
    /// `false` if the header at `index` is missing or differs from the declared name.
    pub exists: bool,
    /// The declared column.
    pub definition: ColumnDefinition,
}

/// Read-only lookup table derived once from a schema and a header row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reconciliation {
    columns: Vec<ResolvedColumn>,
    errors: Vec<String>,
}

impl Reconciliation {
    /// Check every declared column against the header at the same position.
    ///
    /// All columns are checked before returning; a required column that is missing or whose
    /// header differs yields `Can't find column '<name>'`. A mismatched optional column is
    /// silently marked as not existing.
    pub fn reconcile(schema: &Schema, headers: &[String]) -> Self {
        let mut columns = Vec::with_capacity(schema.len());
        let mut errors = Vec::new();

        for (index, definition) in schema.columns.iter().enumerate() {
            let exists = match headers.get(index) {
                None => {
                    errors.push(missing_column(definition));
                    false
                }
                Some(header) if *header != definition.name => {
                    if definition.required {
                        errors.push(missing_column(definition));
                    }
                    false
                }
                Some(_) => true,
            };
            columns.push(ResolvedColumn {
                index,
                key: definition.effective_key().to_string(),
                exists,
                definition: definition.clone(),
            });
        }

        Self { columns, errors }
    }

    /// Fatal errors; empty when the header row satisfies the schema.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Whether no fatal errors were found.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Every declared column, in schema order.
    pub fn columns(&self) -> &[ResolvedColumn] {
        &self.columns
    }

    /// Columns whose values may be read, in schema order.
    pub fn existing(&self) -> impl Iterator<Item = &ResolvedColumn> {
        self.columns.iter().filter(|c| c.exists)
    }

    /// Whether the column at `index` exists in the sheet.
    pub fn exists(&self, index: usize) -> bool {
        self.columns.get(index).is_some_and(|c| c.exists)
    }
}

fn missing_column(definition: &ColumnDefinition) -> String {
    format!("Can't find column '{}'", definition.name)
}
