//! Dimension and fact builders.
//!
//! Every foreign natural-key reference is resolved to its surrogate key with
//! a left join against the relevant key map: an unresolved reference yields a
//! null surrogate and the row is retained. Output column sets are fixed per
//! table; extraneous source columns are dropped here.

use crate::error::Result;
use crate::pipeline::surrogate::KeyMap;
use crate::schema::{accounts, outputs, transactions};
use crate::table::{Table, Value};

/// Left-join `key_map` onto `fk_column`, appending the surrogate column.
pub fn resolve_foreign_key(mut table: Table, fk_column: &str, key_map: &KeyMap) -> Result<Table> {
    let ix = table.require_index(fk_column)?;
    let resolved: Vec<Value> = table
        .rows()
        .iter()
        .map(|row| {
            row[ix]
                .as_text()
                .and_then(|natural| key_map.get(natural))
                .map(Value::Key)
                .unwrap_or(Value::Null)
        })
        .collect();
    table.add_column(key_map.key_column(), resolved)?;
    Ok(table)
}

pub fn build_dim_customers(customers: &Table) -> Result<Table> {
    customers.select(outputs::DIM_CUSTOMERS)
}

pub fn build_dim_accounts(accounts_table: Table, customer_keys: &KeyMap) -> Result<Table> {
    let joined = resolve_foreign_key(accounts_table, accounts::CUSTOMER_ID, customer_keys)?;
    joined.select(outputs::DIM_ACCOUNTS)
}

pub fn build_dim_securities(securities: &Table) -> Result<Table> {
    securities.select(outputs::DIM_SECURITIES)
}

pub fn build_fact_transactions(
    transactions_table: Table,
    account_keys: &KeyMap,
    security_keys: &KeyMap,
) -> Result<Table> {
    let joined = resolve_foreign_key(transactions_table, transactions::ACCOUNT_ID, account_keys)?;
    let joined = resolve_foreign_key(joined, transactions::SECURITY_ID, security_keys)?;
    joined.select(outputs::FACT_TRANSACTIONS)
}
