//! End-to-end runs over temp directories: the happy path through
//! generate -> ingest -> transform -> plan-load, a dirty dataset exercising
//! every quality rule, and the structural failure path.

use std::fs;
use std::path::Path;

use finmart::config::{Config, GeneratorConfig};
use finmart::error::EtlError;
use finmart::gateway::{self, UploadStatus};
use finmart::pipeline;
use finmart::warehouse;

fn read_csv(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let headers = reader.headers().unwrap().iter().map(|h| h.to_string()).collect();
    let rows = reader
        .records()
        .map(|r| r.unwrap().iter().map(|f| f.to_string()).collect())
        .collect();
    (headers, rows)
}

fn column<'a>(headers: &[String], rows: &'a [Vec<String>], name: &str) -> Vec<&'a str> {
    let ix = headers.iter().position(|h| h == name).unwrap();
    rows.iter().map(|r| r[ix].as_str()).collect()
}

#[test]
fn generated_data_flows_through_the_whole_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::default().rooted_at(dir.path());

    mockdata_generate(&config);

    let receipts =
        gateway::ingest_raw_files(&config.raw_dir(), &config.blob_root, &config.ingest_log_path())
            .unwrap();
    assert_eq!(receipts.len(), 6);
    assert!(receipts.iter().all(|r| r.status == UploadStatus::Success));

    let outcome =
        pipeline::run_transform(&config.raw_dir(), &config.processed_dir(), &config.logs_dir).unwrap();

    // six output tables, seven quality rules, generated data is clean
    assert_eq!(outcome.metrics.len(), 6);
    assert_eq!(outcome.dq.len(), 7);
    assert!(outcome.dq.iter().all(|record| record.dropped_count == 0));

    // every fact row survived: generated transactions are all valid
    let (_, raw_txns) = read_csv(&config.raw_dir().join("transactions.csv"));
    let fact_count = outcome
        .metrics
        .iter()
        .find(|m| m.table_name == "fact_transactions")
        .unwrap()
        .row_count;
    assert_eq!(fact_count, raw_txns.len() as u64);

    // surrogate keys of dim_customers are a dense 1..=N range
    let (headers, rows) = read_csv(&config.processed_dir().join("dim_customers.csv"));
    let mut keys: Vec<i64> = column(&headers, &rows, "customer_key")
        .iter()
        .map(|k| k.parse().unwrap())
        .collect();
    keys.sort_unstable();
    assert_eq!(keys, (1..=rows.len() as i64).collect::<Vec<_>>());

    // account daily totals add up to the raw position market value
    let (pos_headers, pos_rows) = read_csv(&config.raw_dir().join("positions.csv"));
    let positions_total: f64 = column(&pos_headers, &pos_rows, "market_value")
        .iter()
        .map(|v| v.parse::<f64>().unwrap())
        .sum();
    let (adv_headers, adv_rows) = read_csv(&config.processed_dir().join("account_daily_value.csv"));
    let daily_total: f64 = column(&adv_headers, &adv_rows, "total_market_value")
        .iter()
        .map(|v| v.parse::<f64>().unwrap())
        .sum();
    assert!((positions_total - daily_total).abs() < 1e-6);

    // reports exist and the plan covers all six tables
    assert!(config.logs_dir.join("transform_metrics.csv").exists());
    assert!(config.logs_dir.join("data_quality_report.csv").exists());
    let plan = warehouse::plan_load(&config.processed_dir(), &config.ddl_dir, &config.logs_dir).unwrap();
    assert_eq!(plan.len(), 6);
    for (table_name, _) in warehouse::TABLE_FILES {
        let ddl = fs::read_to_string(config.ddl_dir.join(format!("{table_name}.sql"))).unwrap();
        assert!(ddl.starts_with("CREATE OR REPLACE TABLE"));
    }
}

#[test]
fn dirty_rows_are_dropped_counted_and_orphans_kept() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::default().rooted_at(dir.path());
    write_dirty_fixture(&config.raw_dir());

    let outcome =
        pipeline::run_transform(&config.raw_dir(), &config.processed_dir(), &config.logs_dir).unwrap();

    let expected: &[(&str, u64)] = &[
        ("securities.asset_class_enum", 1),
        ("accounts.enums", 1),
        ("customers.status_enum", 1),
        ("transactions.transaction_type_enum", 1),
        ("transactions.quantity_nonnegative", 0),
        ("transactions.price_nonnegative", 1),
        ("positions.nonnegative", 1),
    ];
    let actual: Vec<(&str, u64)> = outcome
        .dq
        .iter()
        .map(|record| (record.rule_name.as_str(), record.dropped_count))
        .collect();
    assert_eq!(actual, expected);

    // duplicate customer removed, one row per natural key
    let (headers, rows) = read_csv(&config.processed_dir().join("dim_customers.csv"));
    assert_eq!(column(&headers, &rows, "customer_id"), vec!["C1", "C3"]);
    assert_eq!(column(&headers, &rows, "email")[0], "ann@x.com");

    // orphaned accounts survive with an empty customer_key
    let (headers, rows) = read_csv(&config.processed_dir().join("dim_accounts.csv"));
    assert_eq!(column(&headers, &rows, "account_id"), vec!["A1", "A2", "A3"]);
    assert_eq!(column(&headers, &rows, "customer_key"), vec!["1", "", ""]);

    // T3 fell to the price rule despite its missing quantity; the orphan T4
    // kept its row with a null account key
    let (headers, rows) = read_csv(&config.processed_dir().join("fact_transactions.csv"));
    assert_eq!(column(&headers, &rows, "transaction_id"), vec!["T1", "T4"]);
    assert_eq!(column(&headers, &rows, "account_key"), vec!["1", ""]);

    // two same-day positions for A1 roll up to 350; the unresolved account
    // aggregates under a null key
    let (headers, rows) = read_csv(&config.processed_dir().join("account_daily_value.csv"));
    let totals = column(&headers, &rows, "total_market_value");
    let keys = column(&headers, &rows, "account_key");
    assert_eq!(keys, vec!["1", ""]);
    assert_eq!(totals, vec!["350", "50"]);

    // the customer rollup goes through dim_accounts, not raw source
    let (headers, rows) = read_csv(&config.processed_dir().join("customer_daily_value.csv"));
    assert_eq!(column(&headers, &rows, "customer_key"), vec!["1", ""]);
    assert_eq!(column(&headers, &rows, "total_market_value"), vec!["350", "50"]);
}

#[test]
fn missing_required_columns_abort_before_any_output() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::default().rooted_at(dir.path());
    let raw = config.raw_dir();
    fs::create_dir_all(&raw).unwrap();

    // customers lacks email and status
    fs::write(raw.join("customers.csv"), "customer_id,first_name,last_name,created_at\nC1,A,B,2023-01-01\n").unwrap();
    fs::write(raw.join("accounts.csv"), "account_id,customer_id,account_type,opened_at,status,currency\n").unwrap();
    fs::write(raw.join("securities.csv"), "security_id,ticker,name,asset_class,cusip,exchange\n").unwrap();
    fs::write(
        raw.join("transactions.csv"),
        "transaction_id,account_id,security_id,transaction_type,quantity,price,amount,trade_date,settle_date,currency\n",
    )
    .unwrap();
    fs::write(
        raw.join("positions.csv"),
        "as_of_date,account_id,security_id,quantity,avg_cost,market_price,market_value,currency\n",
    )
    .unwrap();

    let err = pipeline::run_transform(&config.raw_dir(), &config.processed_dir(), &config.logs_dir)
        .unwrap_err();
    match err {
        EtlError::MissingColumns { table, columns } => {
            assert_eq!(table, "customers");
            assert_eq!(columns, vec!["email".to_string(), "status".to_string()]);
        }
        other => panic!("expected MissingColumns, got {other:?}"),
    }
    // structural failure writes nothing
    assert!(!config.processed_dir().exists());
}

fn mockdata_generate(config: &Config) {
    finmart::mockdata::generate(&config.raw_dir(), &GeneratorConfig::default()).unwrap();
}

fn write_dirty_fixture(raw: &Path) {
    fs::create_dir_all(raw).unwrap();
    fs::write(
        raw.join("customers.csv"),
        "customer_id,first_name,last_name,email,created_at,status\n\
         C1,Ann,Lee,ann@x.com,2023-01-01,active\n\
         C1,Ann,Lee,dup@x.com,2023-01-01,active\n\
         C2,Bob,Ray,bob@x.com,2023-02-01,retired\n\
         C3,Cat,Paz,cat@x.com,2023-03-01,inactive\n",
    )
    .unwrap();
    fs::write(
        raw.join("accounts.csv"),
        "account_id,customer_id,account_type,opened_at,status,currency\n\
         A1,C1,brokerage,2023-05-01,active,USD\n\
         A2,C404,ira,2023-05-02,active,USD\n\
         A3,C2,roth,2023-05-03,active,USD\n\
         A4,C1,checking,2023-05-04,active,USD\n",
    )
    .unwrap();
    fs::write(
        raw.join("securities.csv"),
        "security_id,ticker,name,asset_class,cusip,exchange\n\
         S1,aapl,Apple,equity,000000001,nasdaq\n\
         S2,XXX,Weird,crypto,000000002,OTC\n",
    )
    .unwrap();
    fs::write(
        raw.join("transactions.csv"),
        "transaction_id,account_id,security_id,transaction_type,quantity,price,amount,trade_date,settle_date,currency\n\
         T1,A1,S1,buy,10,100,1000,2024-01-02,2024-01-04,usd\n\
         T2,A1,S1,invalid_type,1,1,1,2024-01-02,2024-01-02,usd\n\
         T3,A1,S1,sell,,-5,10,2024-01-02,2024-01-02,usd\n\
         T4,A9,S1,buy,abc,50,100,2024-01-02,2024-01-02,usd\n",
    )
    .unwrap();
    fs::write(
        raw.join("positions.csv"),
        "as_of_date,account_id,security_id,quantity,avg_cost,market_price,market_value,currency\n\
         2024-06-01,A1,S1,10,90,10,100,usd\n\
         2024-06-01,A1,S2,10,90,25,250,usd\n\
         2024-06-01,A2,S1,-1,90,25,250,usd\n\
         2024-06-01,GHOST,S1,1,1,1,50,usd\n\
         2024-06-01,A1,S1,99,99,99,9999,usd\n",
    )
    .unwrap();
}
