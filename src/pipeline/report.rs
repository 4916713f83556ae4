//! End-of-run file sinks: the processed output tables, the row-count metrics
//! report, and the data-quality report. Reports are overwritten on every run;
//! failures surface as errors and are not retried.

use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::pipeline::quality_gate::DqRecord;
use crate::table::Table;

/// One row of the metrics report: an output table and its final row count.
#[derive(Debug, Clone, Serialize)]
pub struct TableCount {
    pub table_name: String,
    pub row_count: u64,
}

pub fn write_table_csv(path: &Path, table: &Table) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|value| value.render()))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_metrics_report(path: &Path, counts: &[TableCount]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in counts {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_dq_report(path: &Path, records: &[DqRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    #[test]
    fn table_csv_round_trips_header_and_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut t = Table::new(vec!["account_key", "total_market_value"]);
        t.push_row(vec![Value::Key(1), Value::Number(350.0)]);
        t.push_row(vec![Value::Null, Value::Number(10.0)]);
        write_table_csv(&path, &t).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("account_key,total_market_value"));
        assert_eq!(lines.next(), Some("1,350"));
        assert_eq!(lines.next(), Some(",10"));
    }

    #[test]
    fn dq_report_keeps_rule_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dq.csv");
        let records = vec![
            DqRecord { rule_name: "securities.asset_class_enum".into(), dropped_count: 0 },
            DqRecord { rule_name: "accounts.enums".into(), dropped_count: 2 },
        ];
        write_dq_report(&path, &records).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "rule_name,dropped_count");
        assert_eq!(lines[1], "securities.asset_class_enum,0");
        assert_eq!(lines[2], "accounts.enums,2");
    }
}
