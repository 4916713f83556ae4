//! Row-level data-quality filtering between normalization and modeling.
//!
//! `ensure_columns` is the single structural check: a missing required column
//! halts the whole run before any output is written. Everything after it is a
//! row-level rule that can only drop rows, never edit survivors. Rules run in
//! a fixed order and each records how many rows it removed from the table
//! state it received, so drop counts compose sequentially.

use std::collections::HashSet;

use serde::Serialize;
use tracing::warn;

use crate::error::{EtlError, Result};
use crate::observability::metrics as obs;
use crate::table::{Table, Value};

/// Outcome of one data-quality rule, recorded in application order.
#[derive(Debug, Clone, Serialize)]
pub struct DqRecord {
    pub rule_name: String,
    pub dropped_count: u64,
}

/// How a non-negativity rule treats a missing numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingPolicy {
    /// Missing passes; only a present negative value drops the row.
    Pass,
    /// Missing drops the row along with negatives.
    Drop,
}

/// Fail fast when any required column is absent, naming every missing column.
pub fn ensure_columns(table: &Table, table_name: &str, required: &[&str]) -> Result<()> {
    let missing: Vec<String> = required
        .iter()
        .filter(|column| !table.has_column(column))
        .map(|column| column.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(EtlError::MissingColumns {
            table: table_name.to_string(),
            columns: missing,
        })
    }
}

/// Drop rows whose value in any checked column falls outside its whitelist.
/// A missing value is a violation.
pub fn enum_membership(
    table: Table,
    rule_name: &str,
    checks: &[(&str, &HashSet<&'static str>)],
    dq: &mut Vec<DqRecord>,
) -> Result<Table> {
    let indexes = checks
        .iter()
        .map(|(column, _)| table.require_index(column))
        .collect::<Result<Vec<_>>>()?;
    Ok(apply_rule(table, rule_name, dq, |row| {
        indexes
            .iter()
            .zip(checks)
            .all(|(&ix, (_, allowed))| match row[ix].as_text() {
                Some(value) => allowed.contains(value),
                None => false,
            })
    }))
}

/// Drop rows with a negative value in any checked column. `missing` decides
/// whether a null cell passes or fails.
pub fn non_negative(
    table: Table,
    rule_name: &str,
    columns: &[&str],
    missing: MissingPolicy,
    dq: &mut Vec<DqRecord>,
) -> Result<Table> {
    let indexes = columns
        .iter()
        .map(|column| table.require_index(column))
        .collect::<Result<Vec<_>>>()?;
    Ok(apply_rule(table, rule_name, dq, |row| {
        indexes.iter().all(|&ix| match row[ix].as_number() {
            Some(value) => value >= 0.0,
            None => missing == MissingPolicy::Pass,
        })
    }))
}

fn apply_rule<F>(mut table: Table, rule_name: &str, dq: &mut Vec<DqRecord>, keep: F) -> Table
where
    F: FnMut(&[Value]) -> bool,
{
    let dropped = table.retain_rows(keep) as u64;
    if dropped > 0 {
        warn!(rule = rule_name, dropped, "quality rule dropped rows");
    }
    obs::quality_gate::rows_dropped(rule_name, dropped);
    dq.push(DqRecord {
        rule_name: rule_name.to_string(),
        dropped_count: dropped,
    });
    table
}
