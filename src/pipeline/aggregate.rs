//! Daily market-value rollups over surviving positions.
//!
//! Positions roll up to (as_of_date, account_key); those totals roll up to
//! (as_of_date, customer_key) through the account-to-customer mapping carried
//! by dim_accounts, never from raw source rows. A null group key (an
//! unresolved account or customer) is a valid group of its own. Sums skip
//! missing values; an empty or all-missing group totals 0.0.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::error::Result;
use crate::pipeline::model::resolve_foreign_key;
use crate::pipeline::surrogate::KeyMap;
use crate::schema::{accounts, customers, outputs, positions};
use crate::table::{Table, Value};

type GroupKey = (Option<NaiveDate>, Option<i64>);

/// Sum position market value per (as_of_date, account_key).
pub fn account_daily_value(positions_table: Table, account_keys: &KeyMap) -> Result<Table> {
    let joined = resolve_foreign_key(positions_table, positions::ACCOUNT_ID, account_keys)?;
    group_sum(
        &joined,
        positions::AS_OF_DATE,
        accounts::ACCOUNT_KEY,
        positions::MARKET_VALUE,
        outputs::ACCOUNT_DAILY_VALUE,
    )
}

/// Roll account totals up to (as_of_date, customer_key).
pub fn customer_daily_value(account_daily: &Table, dim_accounts: &Table) -> Result<Table> {
    let account_to_customer = account_customer_mapping(dim_accounts)?;

    let dx = account_daily.require_index(positions::AS_OF_DATE)?;
    let kx = account_daily.require_index(accounts::ACCOUNT_KEY)?;
    let vx = account_daily.require_index(outputs::TOTAL_MARKET_VALUE)?;

    let mut order: Vec<GroupKey> = Vec::new();
    let mut totals: HashMap<GroupKey, f64> = HashMap::new();
    for row in account_daily.rows() {
        let customer_key = row[kx]
            .as_key()
            .and_then(|account_key| account_to_customer.get(&account_key).copied())
            .flatten();
        let group = (row[dx].as_date(), customer_key);
        if !totals.contains_key(&group) {
            order.push(group);
        }
        let total = totals.entry(group).or_insert(0.0);
        if let Some(value) = row[vx].as_number() {
            *total += value;
        }
    }
    Ok(grouped_table(outputs::CUSTOMER_DAILY_VALUE, order, &totals))
}

fn account_customer_mapping(dim_accounts: &Table) -> Result<HashMap<i64, Option<i64>>> {
    let akx = dim_accounts.require_index(accounts::ACCOUNT_KEY)?;
    let ckx = dim_accounts.require_index(customers::CUSTOMER_KEY)?;
    let mut mapping = HashMap::new();
    for row in dim_accounts.rows() {
        if let Some(account_key) = row[akx].as_key() {
            mapping.entry(account_key).or_insert_with(|| row[ckx].as_key());
        }
    }
    Ok(mapping)
}

fn group_sum(
    table: &Table,
    date_column: &str,
    key_column: &str,
    value_column: &str,
    out_columns: &[&str],
) -> Result<Table> {
    let dx = table.require_index(date_column)?;
    let kx = table.require_index(key_column)?;
    let vx = table.require_index(value_column)?;

    let mut order: Vec<GroupKey> = Vec::new();
    let mut totals: HashMap<GroupKey, f64> = HashMap::new();
    for row in table.rows() {
        let group = (row[dx].as_date(), row[kx].as_key());
        if !totals.contains_key(&group) {
            order.push(group);
        }
        let total = totals.entry(group).or_insert(0.0);
        if let Some(value) = row[vx].as_number() {
            *total += value;
        }
    }
    Ok(grouped_table(out_columns, order, &totals))
}

fn grouped_table(
    out_columns: &[&str],
    mut order: Vec<GroupKey>,
    totals: &HashMap<GroupKey, f64>,
) -> Table {
    // deterministic output order, null groups last
    order.sort_by_key(|(date, key)| (date.is_none(), *date, key.is_none(), *key));
    let mut out = Table::new(out_columns.to_vec());
    for group in order {
        out.push_row(vec![
            group.0.map(Value::Date).unwrap_or(Value::Null),
            group.1.map(Value::Key).unwrap_or(Value::Null),
            Value::Number(totals[&group]),
        ]);
    }
    out
}
