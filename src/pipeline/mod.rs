//! The transform-and-model stage: a linear, synchronous sequence of
//! whole-table steps. Each step consumes the complete output of its
//! predecessor and hands a fresh table to the next; I/O happens only at the
//! boundaries (read raw, write processed, write reports).
//!
//! Step order: load, normalize, validate/filter, dedupe, assign surrogate
//! keys, build dimensions and facts, aggregate, report. Dimensions are keyed
//! before facts, facts before aggregates.

pub mod aggregate;
pub mod dedupe;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod quality_gate;
pub mod report;
pub mod surrogate;

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::observability::metrics as obs;
use crate::schema::{accounts, customers, enums, market_data, positions, securities, transactions};
use crate::table::Table;

use self::quality_gate::{DqRecord, MissingPolicy};
use self::report::TableCount;

/// Everything a transform run produced, for callers and tests. The same rows
/// land in `transform_metrics.csv` and `data_quality_report.csv`.
#[derive(Debug)]
pub struct TransformOutcome {
    pub metrics: Vec<TableCount>,
    pub dq: Vec<DqRecord>,
}

/// Run the full transform: raw CSVs in `raw_dir`, star schema into
/// `processed_dir`, reports into `logs_dir`.
///
/// A missing required column aborts before any output file is written. All
/// row-level violations are dropped, counted, and reported instead.
pub fn run_transform(raw_dir: &Path, processed_dir: &Path, logs_dir: &Path) -> Result<TransformOutcome> {
    // Load. Date-like columns are coerced now; everything else stays text.
    let customers_raw = loader::read_raw_csv(&raw_dir.join("customers.csv"), customers::DATE_COLUMNS)?;
    let accounts_raw = loader::read_raw_csv(&raw_dir.join("accounts.csv"), accounts::DATE_COLUMNS)?;
    let securities_raw = loader::read_raw_csv(&raw_dir.join("securities.csv"), securities::DATE_COLUMNS)?;
    let transactions_raw =
        loader::read_raw_csv(&raw_dir.join("transactions.csv"), transactions::DATE_COLUMNS)?;
    let positions_raw = loader::read_raw_csv(&raw_dir.join("positions.csv"), positions::DATE_COLUMNS)?;
    for (entity, table) in [
        ("customers", &customers_raw),
        ("accounts", &accounts_raw),
        ("securities", &securities_raw),
        ("transactions", &transactions_raw),
        ("positions", &positions_raw),
    ] {
        obs::transform::rows_loaded(entity, table.len() as u64);
    }

    // Market data is optional: staged and normalized when present, tolerated
    // when absent, and feeds no modeled output.
    let market_data_path = raw_dir.join("market_data.csv");
    let _market = if market_data_path.exists() {
        let market = loader::read_raw_csv(&market_data_path, market_data::DATE_COLUMNS)?;
        obs::transform::rows_loaded("market_data", market.len() as u64);
        Some(normalize::upper(normalize::strip_all(market), &[market_data::TICKER]))
    } else {
        info!("market_data.csv not present, skipping");
        None
    };

    // Normalize: strip everywhere, canonical case per column, then numeric
    // coercion on measure columns.
    let customers_t = normalize::lower(normalize::strip_all(customers_raw), &[customers::STATUS]);
    let accounts_t = normalize::lower(
        normalize::strip_all(accounts_raw),
        &[accounts::STATUS, accounts::ACCOUNT_TYPE, accounts::CURRENCY],
    );
    let securities_t = normalize::upper(
        normalize::strip_all(securities_raw),
        &[securities::TICKER, securities::EXCHANGE],
    );
    let transactions_t = normalize::to_numeric(
        normalize::upper(normalize::strip_all(transactions_raw), &[transactions::CURRENCY]),
        transactions::NUMERIC_COLUMNS,
    );
    let positions_t = normalize::to_numeric(
        normalize::upper(normalize::strip_all(positions_raw), &[positions::CURRENCY]),
        positions::NUMERIC_COLUMNS,
    );

    // Structural contract. Failing here halts the run with every missing
    // column named, before any output exists.
    quality_gate::ensure_columns(&customers_t, "customers", customers::REQUIRED)?;
    quality_gate::ensure_columns(&accounts_t, "accounts", accounts::REQUIRED)?;
    quality_gate::ensure_columns(&securities_t, "securities", securities::REQUIRED)?;
    quality_gate::ensure_columns(&transactions_t, "transactions", transactions::REQUIRED)?;
    quality_gate::ensure_columns(&positions_t, "positions", positions::REQUIRED)?;

    // Row-level rules, fixed order. Each rule counts its own drops against
    // the table state it received.
    let mut dq: Vec<DqRecord> = Vec::new();
    let securities_t = quality_gate::enum_membership(
        securities_t,
        "securities.asset_class_enum",
        &[(securities::ASSET_CLASS, &*enums::ASSET_CLASS)],
        &mut dq,
    )?;
    let accounts_t = quality_gate::enum_membership(
        accounts_t,
        "accounts.enums",
        &[
            (accounts::ACCOUNT_TYPE, &*enums::ACCOUNT_TYPE),
            (accounts::STATUS, &*enums::ACCOUNT_STATUS),
        ],
        &mut dq,
    )?;
    let customers_t = quality_gate::enum_membership(
        customers_t,
        "customers.status_enum",
        &[(customers::STATUS, &*enums::CUSTOMER_STATUS)],
        &mut dq,
    )?;
    let transactions_t = quality_gate::enum_membership(
        transactions_t,
        "transactions.transaction_type_enum",
        &[(transactions::TRANSACTION_TYPE, &*enums::TRANSACTION_TYPE)],
        &mut dq,
    )?;
    let transactions_t = quality_gate::non_negative(
        transactions_t,
        "transactions.quantity_nonnegative",
        &[transactions::QUANTITY],
        MissingPolicy::Pass,
        &mut dq,
    )?;
    let transactions_t = quality_gate::non_negative(
        transactions_t,
        "transactions.price_nonnegative",
        &[transactions::PRICE],
        MissingPolicy::Pass,
        &mut dq,
    )?;
    let positions_t = quality_gate::non_negative(
        positions_t,
        "positions.nonnegative",
        &[positions::QUANTITY, positions::MARKET_PRICE, positions::MARKET_VALUE],
        MissingPolicy::Drop,
        &mut dq,
    )?;

    // One row per natural key from here on.
    let customers_t = dedupe::dedupe_by(customers_t, &[customers::CUSTOMER_ID])?;
    let accounts_t = dedupe::dedupe_by(accounts_t, &[accounts::ACCOUNT_ID])?;
    let securities_t = dedupe::dedupe_by(securities_t, &[securities::SECURITY_ID])?;
    let transactions_t = dedupe::dedupe_by(transactions_t, &[transactions::TRANSACTION_ID])?;
    let positions_t = dedupe::dedupe_by(positions_t, positions::NATURAL_KEY)?;

    // Surrogate keys for the dimensions, then dimensions before facts before
    // aggregates.
    let (customers_t, customer_keys) =
        surrogate::assign_surrogates(customers_t, customers::CUSTOMER_ID, customers::CUSTOMER_KEY)?;
    let (accounts_t, account_keys) =
        surrogate::assign_surrogates(accounts_t, accounts::ACCOUNT_ID, accounts::ACCOUNT_KEY)?;
    let (securities_t, security_keys) =
        surrogate::assign_surrogates(securities_t, securities::SECURITY_ID, securities::SECURITY_KEY)?;

    let dim_customers = model::build_dim_customers(&customers_t)?;
    let dim_accounts = model::build_dim_accounts(accounts_t, &customer_keys)?;
    let dim_securities = model::build_dim_securities(&securities_t)?;
    let fact_transactions =
        model::build_fact_transactions(transactions_t, &account_keys, &security_keys)?;

    let account_daily_value = aggregate::account_daily_value(positions_t, &account_keys)?;
    let customer_daily_value = aggregate::customer_daily_value(&account_daily_value, &dim_accounts)?;

    // Sinks: six output tables, then the two reports.
    fs::create_dir_all(processed_dir)?;
    fs::create_dir_all(logs_dir)?;
    let output_tables: [(&str, &Table); 6] = [
        ("dim_customers", &dim_customers),
        ("dim_accounts", &dim_accounts),
        ("dim_securities", &dim_securities),
        ("fact_transactions", &fact_transactions),
        ("account_daily_value", &account_daily_value),
        ("customer_daily_value", &customer_daily_value),
    ];
    let mut metrics: Vec<TableCount> = Vec::new();
    for (table_name, table) in output_tables {
        report::write_table_csv(&processed_dir.join(format!("{table_name}.csv")), table)?;
        obs::transform::table_written(table_name, table.len() as u64);
        info!(table = table_name, rows = table.len(), "wrote output table");
        metrics.push(TableCount {
            table_name: table_name.to_string(),
            row_count: table.len() as u64,
        });
    }
    report::write_metrics_report(&logs_dir.join("transform_metrics.csv"), &metrics)?;
    report::write_dq_report(&logs_dir.join("data_quality_report.csv"), &dq)?;
    info!("transform complete");

    Ok(TransformOutcome { metrics, dq })
}
