use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::types::SqlValue;

/// Column names for one result set, shared by all of its rows.
///
/// The by-name index is built once per metadata change. When a statement
/// yields duplicate column names, every value is kept positionally and the
/// index points at the last occurrence, so by-name lookup behaves like a
/// name-keyed row map would (later columns shadow earlier ones).
#[derive(Debug, Default)]
pub(crate) struct Columns {
    names: Vec<String>,
    by_name: HashMap<String, usize>,
}

impl Columns {
    pub(crate) fn new(names: Vec<String>) -> Self {
        let by_name = names
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.clone(), idx))
            .collect();
        Self { names, by_name }
    }
}

/// A row from a query result: shared column names plus the values for this
/// row, in column order.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Arc<Columns>,
    values: Vec<SqlValue>,
}

impl Row {
    pub(crate) fn new(columns: Arc<Columns>, values: Vec<SqlValue>) -> Self {
        Self { columns, values }
    }

    /// Get a value by column name, or `None` if no such column exists.
    /// With duplicate column names this returns the last occurrence; earlier
    /// duplicates stay reachable through [`Row::get_by_index`].
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&SqlValue> {
        self.columns
            .by_name
            .get(column_name)
            .and_then(|&idx| self.values.get(idx))
    }

    /// Get a value by column position.
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.columns.names
    }

    #[must_use]
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The aggregate outcome of one request.
///
/// Built fresh per request, populated while the driver streams items, and
/// finalized exactly once on completion; callers receive it by value and it
/// is never reused.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    /// Rows in arrival order, across all result sets the statement produced.
    pub rows: Vec<Row>,
    /// Rows observed at completion. Tiberius query streams report no count
    /// distinct from the rows themselves, so this equals `rows.len()`.
    pub row_count: u64,
    /// Wall-clock time from request dispatch to completion.
    pub duration: Duration,
    /// Reserved: stored-procedure return values are not surfaced by the
    /// driver's query stream. Kept so the result shape has a stable slot for
    /// them should a later driver API expose them.
    pub return_values: Vec<(String, SqlValue)>,
}

impl QueryResult {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub(crate) fn finish(&mut self, duration: Duration) {
        self.row_count = self.rows.len() as u64;
        self.duration = duration;
    }

    /// All rows, by value. Empty vec when the statement produced none.
    #[must_use]
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// The first row in arrival order, or `None` when there is none.
    #[must_use]
    pub fn into_single_row(self) -> Option<Row> {
        self.rows.into_iter().next()
    }
}
