//! Tabular result model
//!
//! Every read operation on every backend materializes into one shape: a
//! header of column names plus data rows of nullable text cells. Native
//! column types are erased in favor of uniform textual rendering, so the
//! table preview, the structure view, and ad-hoc queries all share a single
//! downstream contract.

use crate::error::{DbError, DbResult};

/// A fully materialized, engine-agnostic result set.
///
/// The header is part of the value, not metadata on the side: rendering
/// code walks header and data rows through the same path. A cell is
/// `None` exactly when the engine reported SQL NULL; an empty string is
/// a real (empty) value. Column order is the engine's native order.
///
/// Invariant: every data row has exactly `width()` cells. The header
/// cannot contain NULL by construction, and [`Table::push_row`] rejects
/// rows of any other width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Table {
    /// Create an empty table with the given header
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a data row; fails when its width differs from the header's
    pub fn push_row(&mut self, row: Vec<Option<String>>) -> DbResult<()> {
        if row.len() != self.columns.len() {
            return Err(DbError::QueryFailed(format!(
                "result row has {} cells, expected {}",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Build a single-column table from a list of non-null values
    pub fn single_column(name: &str, values: impl IntoIterator<Item = String>) -> Self {
        Self {
            columns: vec![name.to_string()],
            rows: values.into_iter().map(|v| vec![Some(v)]).collect(),
        }
    }

    /// Column names, in the engine's native order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Data rows (the header is not among them)
    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    /// Number of cells per row
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of data rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// True when there are no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
