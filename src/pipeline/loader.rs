use std::path::Path;

use chrono::NaiveDate;
use csv::ReaderBuilder;
use tracing::debug;

use crate::error::Result;
use crate::table::{Table, Value};

/// Read a raw CSV into a [`Table`].
///
/// Every cell comes in as text except the designated date columns, which are
/// coerced to calendar dates. A value that does not parse as a date becomes
/// null rather than failing the load; empty cells are null in any column.
pub fn read_raw_csv(path: &Path, date_columns: &[&str]) -> Result<Table> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let is_date: Vec<bool> = headers
        .iter()
        .map(|h| date_columns.contains(&h.as_str()))
        .collect();

    let mut table = Table::new(headers);
    for record in reader.records() {
        let record = record?;
        let row = record
            .iter()
            .enumerate()
            .map(|(ix, field)| {
                if field.is_empty() {
                    Value::Null
                } else if is_date.get(ix).copied().unwrap_or(false) {
                    parse_date(field)
                } else {
                    Value::Text(field.to_string())
                }
            })
            .collect();
        table.push_row(row);
    }
    debug!(path = %path.display(), rows = table.len(), "loaded raw table");
    Ok(table)
}

fn parse_date(raw: &str) -> Value {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%m/%d/%Y"))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%m-%d-%Y"))
        .map(Value::Date)
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fixture(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn coerces_date_columns_and_keeps_text() {
        let file = write_fixture("id,created_at\nC1,2024-03-01\nC2,not-a-date\n");
        let table = read_raw_csv(file.path(), &["created_at"]).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.rows()[0][1],
            Value::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );
        // unparseable date becomes null, not an error
        assert_eq!(table.rows()[1][1], Value::Null);
        assert_eq!(table.rows()[0][0], Value::Text("C1".into()));
    }

    #[test]
    fn empty_cells_are_null() {
        let file = write_fixture("id,security_id\nT1,\n");
        let table = read_raw_csv(file.path(), &[]).unwrap();
        assert_eq!(table.rows()[0][1], Value::Null);
    }

    #[test]
    fn accepts_us_date_formats() {
        let file = write_fixture("id,created_at\nC1,03/01/2024\n");
        let table = read_raw_csv(file.path(), &["created_at"]).unwrap();
        assert_eq!(
            table.rows()[0][1],
            Value::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );
    }
}
