//! Seeded mock source data for the raw file contract.
//!
//! Everything derives from the configured seed, so a rerun on the same day
//! regenerates identical files. The generated data is clean by construction;
//! dirty-input behavior is exercised by tests, not by the generator.

use std::fs;
use std::path::Path;

use chrono::{Duration, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::observability::metrics as obs;

const ACCOUNT_TYPES: &[&str] = &["brokerage", "ira", "roth", "trust"];
const TRANSACTION_TYPES: &[&str] = &["buy", "sell", "dividend", "deposit", "withdrawal", "fee", "interest"];
const CASHLESS_TYPES: &[&str] = &["deposit", "withdrawal", "fee", "interest"];
const TICKERS: &[(&str, &str, &str)] = &[
    ("AAPL", "Apple Inc.", "equity"),
    ("MSFT", "Microsoft Corp.", "equity"),
    ("AGG", "iShares Core US Agg Bond ETF", "bond"),
    ("VTI", "Vanguard Total Stock Mkt", "etf"),
    ("CASH", "Cash", "cash"),
];

struct Security {
    security_id: String,
    asset_class: &'static str,
}

/// Generate the six raw CSVs under `raw_dir`.
pub fn generate(raw_dir: &Path, config: &GeneratorConfig) -> Result<()> {
    fs::create_dir_all(raw_dir)?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let today = Utc::now().date_naive();

    let customer_ids = write_customers(raw_dir, config, today)?;
    let account_ids = write_accounts(raw_dir, config, today, &mut rng, &customer_ids)?;
    let securities = write_securities(raw_dir)?;
    write_transactions(raw_dir, today, &mut rng, &account_ids, &securities)?;
    write_positions(raw_dir, today, &mut rng, &account_ids, &securities)?;
    write_market_data(raw_dir, config, today, &mut rng)?;

    info!(dir = %raw_dir.display(), "mock raw data generated");
    Ok(())
}

fn days_ago(today: NaiveDate, days: i64) -> String {
    (today - Duration::days(days)).format("%Y-%m-%d").to_string()
}

fn round(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn write_customers(raw_dir: &Path, config: &GeneratorConfig, today: NaiveDate) -> Result<Vec<String>> {
    let mut rows = Vec::new();
    let mut ids = Vec::new();
    for i in 0..config.customers {
        let customer_id = format!("CUST{:03}", i + 1);
        let status = if i % 4 == 0 { "inactive" } else { "active" };
        rows.push(vec![
            customer_id.clone(),
            format!("First{}", i + 1),
            format!("Last{}", i + 1),
            format!("user{}@example.com", i + 1),
            days_ago(today, 400 - i as i64 * 20),
            status.to_string(),
        ]);
        ids.push(customer_id);
    }
    write_entity(
        raw_dir,
        "customers",
        &["customer_id", "first_name", "last_name", "email", "created_at", "status"],
        &rows,
    )?;
    Ok(ids)
}

fn write_accounts(
    raw_dir: &Path,
    config: &GeneratorConfig,
    today: NaiveDate,
    rng: &mut StdRng,
    customer_ids: &[String],
) -> Result<Vec<String>> {
    let mut rows = Vec::new();
    let mut ids = Vec::new();
    for (i, customer_id) in customer_ids.iter().enumerate() {
        for j in 1..=config.accounts_per_customer {
            let account_id = format!("ACCT{:03}{:02}", i + 1, j);
            rows.push(vec![
                account_id.clone(),
                customer_id.clone(),
                ACCOUNT_TYPES.choose(rng).unwrap().to_string(),
                days_ago(today, 365 - (i as i64 + 1) * 10 - j as i64),
                "active".to_string(),
                "USD".to_string(),
            ]);
            ids.push(account_id);
        }
    }
    write_entity(
        raw_dir,
        "accounts",
        &["account_id", "customer_id", "account_type", "opened_at", "status", "currency"],
        &rows,
    )?;
    Ok(ids)
}

fn write_securities(raw_dir: &Path) -> Result<Vec<Security>> {
    let mut rows = Vec::new();
    let mut securities = Vec::new();
    for (i, (ticker, name, asset_class)) in TICKERS.iter().enumerate() {
        let security_id = format!("SEC{:03}", i + 1);
        let exchange = if matches!(*asset_class, "equity" | "etf") { "NASDAQ" } else { "OTC" };
        rows.push(vec![
            security_id.clone(),
            ticker.to_string(),
            name.to_string(),
            asset_class.to_string(),
            format!("000000{:03}", i + 1),
            exchange.to_string(),
        ]);
        securities.push(Security {
            security_id,
            asset_class: *asset_class,
        });
    }
    write_entity(
        raw_dir,
        "securities",
        &["security_id", "ticker", "name", "asset_class", "cusip", "exchange"],
        &rows,
    )?;
    Ok(securities)
}

fn write_transactions(
    raw_dir: &Path,
    today: NaiveDate,
    rng: &mut StdRng,
    account_ids: &[String],
    securities: &[Security],
) -> Result<()> {
    let mut rows = Vec::new();
    for account_id in account_ids {
        for _ in 0..rng.gen_range(8..=15) {
            let transaction_type = *TRANSACTION_TYPES.choose(rng).unwrap();
            let security = securities.choose(rng).unwrap();
            let cash_movement =
                CASHLESS_TYPES.contains(&transaction_type) || security.asset_class == "cash";
            let security_id = if cash_movement { String::new() } else { security.security_id.clone() };
            let quantity = if cash_movement { 0.0 } else { round(rng.gen_range(1.0..50.0), 3) };
            let price = if cash_movement { 0.0 } else { round(rng.gen_range(10.0..300.0), 2) };
            let amount = if cash_movement {
                let sign = if matches!(transaction_type, "deposit" | "interest" | "dividend") {
                    1.0
                } else {
                    -1.0
                };
                round(rng.gen_range(10.0..2000.0), 2) * sign
            } else {
                round(quantity * price, 2)
            };
            let trade_date = days_ago(today, rng.gen_range(1..=120));
            rows.push(vec![
                transaction_uuid(rng),
                account_id.clone(),
                security_id,
                transaction_type.to_string(),
                quantity.to_string(),
                price.to_string(),
                amount.to_string(),
                trade_date.clone(),
                trade_date,
                "USD".to_string(),
            ]);
        }
    }
    write_entity(
        raw_dir,
        "transactions",
        &[
            "transaction_id",
            "account_id",
            "security_id",
            "transaction_type",
            "quantity",
            "price",
            "amount",
            "trade_date",
            "settle_date",
            "currency",
        ],
        &rows,
    )
}

fn write_positions(
    raw_dir: &Path,
    today: NaiveDate,
    rng: &mut StdRng,
    account_ids: &[String],
    securities: &[Security],
) -> Result<()> {
    let as_of = today.format("%Y-%m-%d").to_string();
    let mut rows = Vec::new();
    for account_id in account_ids {
        for security in securities.iter().filter(|s| s.asset_class != "cash") {
            let quantity = round(rng.gen_range(0.0..120.0), 3);
            let market_price = round(rng.gen_range(10.0..350.0), 2);
            let market_value = round(quantity * market_price, 2);
            let avg_cost = round(market_price * rng.gen_range(0.7..1.1), 2);
            rows.push(vec![
                as_of.clone(),
                account_id.clone(),
                security.security_id.clone(),
                quantity.to_string(),
                avg_cost.to_string(),
                market_price.to_string(),
                market_value.to_string(),
                "USD".to_string(),
            ]);
        }
    }
    write_entity(
        raw_dir,
        "positions",
        &[
            "as_of_date",
            "account_id",
            "security_id",
            "quantity",
            "avg_cost",
            "market_price",
            "market_value",
            "currency",
        ],
        &rows,
    )
}

fn write_market_data(
    raw_dir: &Path,
    config: &GeneratorConfig,
    today: NaiveDate,
    rng: &mut StdRng,
) -> Result<()> {
    let mut rows = Vec::new();
    for (ticker, _, asset_class) in TICKERS {
        if *asset_class == "cash" {
            continue;
        }
        for d in (0..=config.market_data_days as i64).rev() {
            rows.push(vec![
                days_ago(today, d),
                ticker.to_string(),
                round(rng.gen_range(50.0..350.0), 2).to_string(),
                rng.gen_range(1_000_000..=50_000_000u64).to_string(),
            ]);
        }
    }
    write_entity(raw_dir, "market_data", &["as_of_date", "ticker", "close", "volume"], &rows)
}

/// UUIDs come from the seeded rng so reruns stay reproducible.
fn transaction_uuid(rng: &mut StdRng) -> String {
    uuid::Builder::from_random_bytes(rng.gen()).into_uuid().to_string()
}

fn write_entity(raw_dir: &Path, entity: &str, header: &[&str], rows: &[Vec<String>]) -> Result<()> {
    let path = raw_dir.join(format!("{entity}.csv"));
    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    obs::generator::rows_written(entity, rows.len() as u64);
    info!(entity, rows = rows.len(), "wrote raw file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;

    #[test]
    fn generates_expected_shape() {
        let dir = tempfile::tempdir().unwrap();
        generate(dir.path(), &GeneratorConfig::default()).unwrap();

        for file in ["customers", "accounts", "securities", "transactions", "positions", "market_data"] {
            assert!(dir.path().join(format!("{file}.csv")).exists(), "{file}.csv missing");
        }
        let customers = std::fs::read_to_string(dir.path().join("customers.csv")).unwrap();
        assert_eq!(customers.lines().count(), 6); // header + 5
        let accounts = std::fs::read_to_string(dir.path().join("accounts.csv")).unwrap();
        assert_eq!(accounts.lines().count(), 11); // header + 5 * 2
        let positions = std::fs::read_to_string(dir.path().join("positions.csv")).unwrap();
        assert_eq!(positions.lines().count(), 41); // header + 10 accounts * 4 non-cash securities
    }

    #[test]
    fn same_seed_regenerates_identical_files() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let config = GeneratorConfig::default();
        generate(first.path(), &config).unwrap();
        generate(second.path(), &config).unwrap();

        for file in ["customers.csv", "transactions.csv", "market_data.csv"] {
            let a = std::fs::read(first.path().join(file)).unwrap();
            let b = std::fs::read(second.path().join(file)).unwrap();
            assert_eq!(a, b, "{file} differs between runs");
        }
    }

    #[test]
    fn first_customer_is_inactive() {
        let dir = tempfile::tempdir().unwrap();
        generate(dir.path(), &GeneratorConfig::default()).unwrap();
        let customers = std::fs::read_to_string(dir.path().join("customers.csv")).unwrap();
        let first_row = customers.lines().nth(1).unwrap();
        assert!(first_row.starts_with("CUST001"));
        assert!(first_row.ends_with("inactive"));
    }
}
