//! Offline warehouse load planning.
//!
//! Infers a warehouse column type for every column of the processed output
//! files and emits one `CREATE OR REPLACE TABLE` statement per table, plus a
//! load-plan log. Running the actual bulk copy belongs to warehouse-side
//! tooling and stays out of this crate.

use std::fs::{self, OpenOptions};
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::error::Result;
use crate::observability::metrics as obs;

static DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());
static TS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}[ T]\d{2}:\d{2}:\d{2}").unwrap());

const DATE_NAME_HINTS: &[&str] = &[
    "date",
    "transaction_date",
    "trade_date",
    "as_of_date",
    "effective_date",
    "posted_date",
    "settlement_date",
    "valuation_date",
];
const TS_NAME_HINTS: &[&str] = &["timestamp", "created_at", "updated_at", "ingested_at", "txn_ts"];
const SAMPLE_ROWS: usize = 50;

/// Output tables and their processed files, in load order.
pub const TABLE_FILES: &[(&str, &str)] = &[
    ("DIM_CUSTOMERS", "dim_customers.csv"),
    ("DIM_ACCOUNTS", "dim_accounts.csv"),
    ("DIM_SECURITIES", "dim_securities.csv"),
    ("FACT_TRANSACTIONS", "fact_transactions.csv"),
    ("ACCOUNT_DAILY_VALUE", "account_daily_value.csv"),
    ("CUSTOMER_DAILY_VALUE", "customer_daily_value.csv"),
];

/// Per-table column overrides that beat value-shape inference.
const SCHEMA_HINTS: &[(&str, &[(&str, &str)])] = &[
    ("FACT_TRANSACTIONS", &[("TRADE_DATE", "DATE"), ("SETTLE_DATE", "DATE")]),
    ("ACCOUNT_DAILY_VALUE", &[("AS_OF_DATE", "DATE")]),
    ("CUSTOMER_DAILY_VALUE", &[("AS_OF_DATE", "DATE")]),
];

#[derive(Debug, Clone, Serialize)]
pub struct LoadPlanRow {
    pub run_id: String,
    pub table_name: String,
    pub file_name: String,
    pub source_rows: u64,
    pub status: String,
}

/// Plan the load of every processed file that exists: infer column types,
/// write DDL to `ddl_dir`, append one row per table to the plan log. Missing
/// output files are skipped, not errors.
pub fn plan_load(processed_dir: &Path, ddl_dir: &Path, logs_dir: &Path) -> Result<Vec<LoadPlanRow>> {
    let run_id = Uuid::new_v4().to_string();
    let schema_name = std::env::var("FINMART_WAREHOUSE_SCHEMA")
        .unwrap_or_else(|_| "ANALYTICS".to_string())
        .to_uppercase();
    fs::create_dir_all(ddl_dir)?;
    fs::create_dir_all(logs_dir)?;

    let mut plan = Vec::new();
    for (table_name, file_name) in TABLE_FILES {
        let path = processed_dir.join(file_name);
        if !path.exists() {
            continue;
        }
        let (headers, rows) = read_processed_csv(&path)?;
        let ddl = build_ddl(&schema_name, table_name, &headers, &rows);
        fs::write(ddl_dir.join(format!("{table_name}.sql")), ddl)?;
        obs::load_plan::table_planned(table_name);
        info!(table = table_name, rows = rows.len(), "planned warehouse load");
        plan.push(LoadPlanRow {
            run_id: run_id.clone(),
            table_name: table_name.to_string(),
            file_name: file_name.to_string(),
            source_rows: rows.len() as u64,
            status: "planned".to_string(),
        });
    }
    append_plan_log(&logs_dir.join("load_plan.csv"), &plan)?;
    Ok(plan)
}

fn read_processed_csv(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(|f| f.to_string()).collect());
    }
    Ok((headers, rows))
}

/// Build one CREATE OR REPLACE TABLE statement from headers and sampled rows.
pub fn build_ddl(schema_name: &str, table_name: &str, headers: &[String], rows: &[Vec<String>]) -> String {
    let hints: &[(&str, &str)] = SCHEMA_HINTS
        .iter()
        .find(|(table, _)| *table == table_name)
        .map(|(_, hints)| *hints)
        .unwrap_or(&[]);
    let columns: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(ix, header)| {
            let upper = header.to_uppercase();
            let hinted = hints
                .iter()
                .find(|(column, _)| *column == upper)
                .map(|(_, dtype)| *dtype);
            let samples: Vec<&str> = rows
                .iter()
                .filter_map(|row| row.get(ix).map(String::as_str))
                .filter(|value| !value.is_empty())
                .take(SAMPLE_ROWS)
                .collect();
            let dtype = hinted.unwrap_or_else(|| infer_column_type(header, &samples));
            format!("\"{upper}\" {dtype}")
        })
        .collect();
    format!(
        "CREATE OR REPLACE TABLE {schema_name}.{table_name} ({});\n",
        columns.join(", ")
    )
}

/// Map a column to a warehouse type from its name and a sample of its
/// non-empty values. Name hints take precedence over value shapes; VARCHAR
/// is the fallback.
pub fn infer_column_type(name: &str, samples: &[&str]) -> &'static str {
    let lower = name.to_lowercase();
    let all = |pred: fn(&&str) -> bool| !samples.is_empty() && samples.iter().all(pred);

    if DATE_NAME_HINTS.contains(&lower.as_str()) && all(|v| DATE_RE.is_match(v)) {
        return "DATE";
    }
    if TS_NAME_HINTS.contains(&lower.as_str()) || samples.iter().any(|v| TS_RE.is_match(v)) {
        return "TIMESTAMP_NTZ";
    }
    if all(|v| v.parse::<i64>().is_ok()) {
        return "NUMBER(38,0)";
    }
    if all(|v| v.parse::<f64>().is_ok()) {
        return "FLOAT";
    }
    if all(|v| matches!(v.to_lowercase().as_str(), "true" | "false")) {
        return "BOOLEAN";
    }
    if all(|v| DATE_RE.is_match(v)) {
        return "DATE";
    }
    "VARCHAR"
}

fn append_plan_log(path: &Path, plan: &[LoadPlanRow]) -> Result<()> {
    let write_header = !path.exists();
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new().has_headers(write_header).from_writer(file);
    for row in plan {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
