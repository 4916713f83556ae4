//! Column-scoped normalization passes applied between load and validation.
//!
//! Each operation is a pure table-in, table-out function, idempotent on its
//! own output, and skips columns the table does not carry. Stripping comes
//! first in every run: case folding and numeric parsing are whitespace
//! sensitive, so `upper`/`lower`/`to_numeric` trim again on their own to stay
//! order safe.

use crate::table::{Table, Value};

/// Trim surrounding whitespace on every text cell of every column.
pub fn strip_all(mut table: Table) -> Table {
    for column in table.columns().to_vec() {
        table.map_column(&column, strip_value);
    }
    table
}

/// Trim surrounding whitespace on the given columns only.
pub fn strip(mut table: Table, columns: &[&str]) -> Table {
    for column in columns {
        table.map_column(column, strip_value);
    }
    table
}

/// Canonicalize the given columns to upper case.
pub fn upper(mut table: Table, columns: &[&str]) -> Table {
    for column in columns {
        table.map_column(column, |value| case_fold(value, true));
    }
    table
}

/// Canonicalize the given columns to lower case.
pub fn lower(mut table: Table, columns: &[&str]) -> Table {
    for column in columns {
        table.map_column(column, |value| case_fold(value, false));
    }
    table
}

/// Parse the given columns as numbers. Text that does not parse becomes
/// null, never an error; already-numeric and null cells pass through.
pub fn to_numeric(mut table: Table, columns: &[&str]) -> Table {
    for column in columns {
        table.map_column(column, |value| match value {
            Value::Text(s) => s
                .trim()
                .parse::<f64>()
                .map(Value::Number)
                .unwrap_or(Value::Null),
            other => other,
        });
    }
    table
}

fn strip_value(value: Value) -> Value {
    match value {
        Value::Text(s) => Value::Text(s.trim().to_string()),
        other => other,
    }
}

fn case_fold(value: Value, to_upper: bool) -> Value {
    match value {
        Value::Text(s) => {
            let trimmed = s.trim();
            Value::Text(if to_upper {
                trimmed.to_uppercase()
            } else {
                trimmed.to_lowercase()
            })
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_of(column: &str, cells: Vec<Value>) -> Table {
        let mut t = Table::new(vec![column]);
        for cell in cells {
            t.push_row(vec![cell]);
        }
        t
    }

    #[test]
    fn strip_then_case_then_numeric_compose() {
        let t = table_of("status", vec![Value::Text("  Active ".into())]);
        let t = lower(strip_all(t), &["status"]);
        assert_eq!(t.rows()[0][0], Value::Text("active".into()));
    }

    #[test]
    fn operations_are_idempotent() {
        let t = table_of("ticker", vec![Value::Text(" aapl".into())]);
        let once = upper(strip(t, &["ticker"]), &["ticker"]);
        let twice = upper(strip(once.clone(), &["ticker"]), &["ticker"]);
        assert_eq!(once.rows(), twice.rows());
    }

    #[test]
    fn to_numeric_turns_garbage_into_null() {
        let t = table_of(
            "quantity",
            vec![
                Value::Text(" 12.5 ".into()),
                Value::Text("oops".into()),
                Value::Null,
            ],
        );
        let t = to_numeric(t, &["quantity"]);
        assert_eq!(t.rows()[0][0], Value::Number(12.5));
        assert_eq!(t.rows()[1][0], Value::Null);
        assert_eq!(t.rows()[2][0], Value::Null);
    }

    #[test]
    fn absent_columns_are_skipped() {
        let t = table_of("a", vec![Value::Text("x".into())]);
        let t = upper(t, &["missing"]);
        assert_eq!(t.rows()[0][0], Value::Text("x".into()));
    }
}
