//! Surrogate key assignment.
//!
//! Each dimension entity gets a dense integer key starting at 1, assigned in
//! order of first appearance of the natural key. Re-running on identical
//! input in identical order reproduces identical keys; there is no key
//! persistence across runs beyond that.

use std::collections::HashMap;

use crate::error::Result;
use crate::table::{Table, Value};

/// Mapping from natural key to assigned surrogate, used by the dimension and
/// fact builders for foreign-key resolution.
#[derive(Debug, Clone)]
pub struct KeyMap {
    key_column: String,
    by_natural: HashMap<String, i64>,
}

impl KeyMap {
    /// Name of the surrogate column this map mints.
    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    pub fn get(&self, natural: &str) -> Option<i64> {
        self.by_natural.get(natural).copied()
    }

    pub fn len(&self) -> usize {
        self.by_natural.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_natural.is_empty()
    }
}

/// Assign surrogate keys over `natural_column`, returning the table with the
/// surrogate column appended plus the key map for downstream joins.
pub fn assign_surrogates(
    mut table: Table,
    natural_column: &str,
    key_column: &str,
) -> Result<(Table, KeyMap)> {
    let ix = table.require_index(natural_column)?;
    let mut by_natural: HashMap<String, i64> = HashMap::new();
    let mut keys = Vec::with_capacity(table.len());
    for row in table.rows() {
        let natural = row[ix].render();
        let next = by_natural.len() as i64 + 1;
        let key = *by_natural.entry(natural).or_insert(next);
        keys.push(Value::Key(key));
    }
    table.add_column(key_column, keys)?;
    Ok((
        table,
        KeyMap {
            key_column: key_column.to_string(),
            by_natural,
        },
    ))
}
