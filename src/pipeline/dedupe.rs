//! Natural-key deduplication.
//!
//! The first occurrence of each key combination (in input row order) wins;
//! later occurrences are dropped silently, with no data-quality record.

use std::collections::HashSet;

use tracing::debug;

use crate::error::Result;
use crate::table::Table;

pub fn dedupe_by(mut table: Table, key_columns: &[&str]) -> Result<Table> {
    let indexes = key_columns
        .iter()
        .map(|column| table.require_index(column))
        .collect::<Result<Vec<_>>>()?;
    let mut seen = HashSet::new();
    let dropped = table.retain_rows(|row| {
        let key: Vec<String> = indexes.iter().map(|&ix| row[ix].render()).collect();
        seen.insert(key)
    });
    if dropped > 0 {
        debug!(keys = ?key_columns, dropped, "removed duplicate rows");
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    #[test]
    fn first_occurrence_wins() {
        let mut t = Table::new(vec!["customer_id", "email"]);
        t.push_row(vec![Value::Text("C1".into()), Value::Text("first@x.com".into())]);
        t.push_row(vec![Value::Text("C2".into()), Value::Text("other@x.com".into())]);
        t.push_row(vec![Value::Text("C1".into()), Value::Text("second@x.com".into())]);
        let t = dedupe_by(t, &["customer_id"]).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.rows()[0][1], Value::Text("first@x.com".into()));
    }

    #[test]
    fn composite_keys_dedupe_jointly() {
        let mut t = Table::new(vec!["as_of_date", "account_id"]);
        t.push_row(vec![Value::Text("2024-01-01".into()), Value::Text("A1".into())]);
        t.push_row(vec![Value::Text("2024-01-01".into()), Value::Text("A2".into())]);
        t.push_row(vec![Value::Text("2024-01-01".into()), Value::Text("A1".into())]);
        let t = dedupe_by(t, &["as_of_date", "account_id"]).unwrap();
        assert_eq!(t.len(), 2);
    }
}
