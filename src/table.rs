use chrono::NaiveDate;

use crate::error::{EtlError, Result};

/// A single cell in a [`Table`].
///
/// Raw data arrives as text; the loader and normalizer promote cells to dates
/// and numbers, and the surrogate assigner introduces integer keys. A cell
/// that failed a coercion is `Null`, never an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Key(i64),
    Null,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_key(&self) -> Option<i64> {
        match self {
            Value::Key(k) => Some(*k),
            _ => None,
        }
    }

    /// Canonical text rendering, used for dedup keys and CSV cells.
    /// Null renders as the empty string.
    pub fn render(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::Key(k) => k.to_string(),
            Value::Null => String::new(),
        }
    }
}

/// An in-memory tabular dataset: named columns over rows of [`Value`]s.
///
/// Each pipeline step consumes its input table and produces a new one; a
/// table is never shared between steps.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new<S: Into<String>>(columns: Vec<S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push_row(&mut self, row: Vec<Value>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn require_index(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| EtlError::UnknownColumn(name.to_string()))
    }

    /// Rewrite every cell of `column` through `f`. A column the table does
    /// not have is skipped silently; normalization passes rely on this.
    pub fn map_column<F>(&mut self, column: &str, f: F)
    where
        F: Fn(Value) -> Value,
    {
        if let Some(ix) = self.column_index(column) {
            for row in &mut self.rows {
                let cell = std::mem::replace(&mut row[ix], Value::Null);
                row[ix] = f(cell);
            }
        }
    }

    /// Keep only rows for which `keep` returns true, preserving order.
    /// Returns the number of rows removed.
    pub fn retain_rows<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&[Value]) -> bool,
    {
        let before = self.rows.len();
        self.rows.retain(|row| keep(row));
        before - self.rows.len()
    }

    /// Append a column of per-row values.
    pub fn add_column<S: Into<String>>(&mut self, name: S, values: Vec<Value>) -> Result<()> {
        let name = name.into();
        if self.has_column(&name) {
            return Err(EtlError::DuplicateColumn(name));
        }
        debug_assert_eq!(values.len(), self.rows.len());
        self.columns.push(name);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(())
    }

    /// Project onto `columns` in the given order, dropping everything else.
    pub fn select(&self, columns: &[&str]) -> Result<Table> {
        let indexes = columns
            .iter()
            .map(|c| self.require_index(c))
            .collect::<Result<Vec<_>>>()?;
        let rows = self
            .rows
            .iter()
            .map(|row| indexes.iter().map(|&ix| row[ix].clone()).collect())
            .collect();
        Ok(Table {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        })
    }
}
