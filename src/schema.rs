//! Column names, required-column contracts, and categorical whitelists for
//! every entity the pipeline touches. Addressing columns through these
//! constants keeps the stringly-typed CSV surface confined to one module.

pub mod customers {
    pub const CUSTOMER_ID: &str = "customer_id";
    pub const FIRST_NAME: &str = "first_name";
    pub const LAST_NAME: &str = "last_name";
    pub const EMAIL: &str = "email";
    pub const CREATED_AT: &str = "created_at";
    pub const STATUS: &str = "status";
    pub const CUSTOMER_KEY: &str = "customer_key";

    pub const REQUIRED: &[&str] = &[CUSTOMER_ID, FIRST_NAME, LAST_NAME, EMAIL, CREATED_AT, STATUS];
    pub const DATE_COLUMNS: &[&str] = &[CREATED_AT];
}

pub mod accounts {
    pub const ACCOUNT_ID: &str = "account_id";
    pub const CUSTOMER_ID: &str = "customer_id";
    pub const ACCOUNT_TYPE: &str = "account_type";
    pub const OPENED_AT: &str = "opened_at";
    pub const STATUS: &str = "status";
    pub const CURRENCY: &str = "currency";
    pub const ACCOUNT_KEY: &str = "account_key";

    pub const REQUIRED: &[&str] = &[ACCOUNT_ID, CUSTOMER_ID, ACCOUNT_TYPE, OPENED_AT, STATUS, CURRENCY];
    pub const DATE_COLUMNS: &[&str] = &[OPENED_AT];
}

pub mod securities {
    pub const SECURITY_ID: &str = "security_id";
    pub const TICKER: &str = "ticker";
    pub const NAME: &str = "name";
    pub const ASSET_CLASS: &str = "asset_class";
    pub const CUSIP: &str = "cusip";
    pub const EXCHANGE: &str = "exchange";
    pub const SECURITY_KEY: &str = "security_key";

    pub const REQUIRED: &[&str] = &[SECURITY_ID, TICKER, NAME, ASSET_CLASS, CUSIP, EXCHANGE];
    pub const DATE_COLUMNS: &[&str] = &[];
}

pub mod transactions {
    pub const TRANSACTION_ID: &str = "transaction_id";
    pub const ACCOUNT_ID: &str = "account_id";
    pub const SECURITY_ID: &str = "security_id";
    pub const TRANSACTION_TYPE: &str = "transaction_type";
    pub const QUANTITY: &str = "quantity";
    pub const PRICE: &str = "price";
    pub const AMOUNT: &str = "amount";
    pub const TRADE_DATE: &str = "trade_date";
    pub const SETTLE_DATE: &str = "settle_date";
    pub const CURRENCY: &str = "currency";

    pub const REQUIRED: &[&str] = &[
        TRANSACTION_ID,
        ACCOUNT_ID,
        SECURITY_ID,
        TRANSACTION_TYPE,
        QUANTITY,
        PRICE,
        AMOUNT,
        TRADE_DATE,
        SETTLE_DATE,
        CURRENCY,
    ];
    pub const DATE_COLUMNS: &[&str] = &[TRADE_DATE, SETTLE_DATE];
    pub const NUMERIC_COLUMNS: &[&str] = &[QUANTITY, PRICE, AMOUNT];
}

pub mod positions {
    pub const AS_OF_DATE: &str = "as_of_date";
    pub const ACCOUNT_ID: &str = "account_id";
    pub const SECURITY_ID: &str = "security_id";
    pub const QUANTITY: &str = "quantity";
    pub const AVG_COST: &str = "avg_cost";
    pub const MARKET_PRICE: &str = "market_price";
    pub const MARKET_VALUE: &str = "market_value";
    pub const CURRENCY: &str = "currency";

    pub const REQUIRED: &[&str] = &[
        AS_OF_DATE,
        ACCOUNT_ID,
        SECURITY_ID,
        QUANTITY,
        AVG_COST,
        MARKET_PRICE,
        MARKET_VALUE,
        CURRENCY,
    ];
    pub const DATE_COLUMNS: &[&str] = &[AS_OF_DATE];
    pub const NUMERIC_COLUMNS: &[&str] = &[QUANTITY, AVG_COST, MARKET_PRICE, MARKET_VALUE];
    pub const NATURAL_KEY: &[&str] = &[AS_OF_DATE, ACCOUNT_ID, SECURITY_ID];
}

/// Optional daily close prices. Staged and normalized when present, never
/// validated or modeled.
pub mod market_data {
    pub const AS_OF_DATE: &str = "as_of_date";
    pub const TICKER: &str = "ticker";
    pub const CLOSE: &str = "close";
    pub const VOLUME: &str = "volume";

    pub const DATE_COLUMNS: &[&str] = &[AS_OF_DATE];
}

/// Allowed categorical values, matched after case canonicalization.
pub mod enums {
    use once_cell::sync::Lazy;
    use std::collections::HashSet;

    pub static CUSTOMER_STATUS: Lazy<HashSet<&'static str>> =
        Lazy::new(|| ["active", "inactive"].into_iter().collect());

    pub static ACCOUNT_STATUS: Lazy<HashSet<&'static str>> =
        Lazy::new(|| ["active", "inactive"].into_iter().collect());

    pub static ACCOUNT_TYPE: Lazy<HashSet<&'static str>> =
        Lazy::new(|| ["brokerage", "ira", "roth", "trust"].into_iter().collect());

    pub static ASSET_CLASS: Lazy<HashSet<&'static str>> =
        Lazy::new(|| ["equity", "etf", "bond", "cash"].into_iter().collect());

    pub static TRANSACTION_TYPE: Lazy<HashSet<&'static str>> = Lazy::new(|| {
        ["buy", "sell", "dividend", "interest", "deposit", "withdrawal", "fee"]
            .into_iter()
            .collect()
    });
}

/// Fixed column sets of the modeled output tables, in output order.
pub mod outputs {
    use super::*;

    pub const DIM_CUSTOMERS: &[&str] = &[
        customers::CUSTOMER_KEY,
        customers::CUSTOMER_ID,
        customers::FIRST_NAME,
        customers::LAST_NAME,
        customers::EMAIL,
        customers::CREATED_AT,
        customers::STATUS,
    ];

    pub const DIM_ACCOUNTS: &[&str] = &[
        accounts::ACCOUNT_KEY,
        accounts::ACCOUNT_ID,
        customers::CUSTOMER_KEY,
        accounts::CUSTOMER_ID,
        accounts::ACCOUNT_TYPE,
        accounts::OPENED_AT,
        accounts::STATUS,
        accounts::CURRENCY,
    ];

    pub const DIM_SECURITIES: &[&str] = &[
        securities::SECURITY_KEY,
        securities::SECURITY_ID,
        securities::TICKER,
        securities::NAME,
        securities::ASSET_CLASS,
        securities::CUSIP,
        securities::EXCHANGE,
    ];

    pub const FACT_TRANSACTIONS: &[&str] = &[
        transactions::TRANSACTION_ID,
        accounts::ACCOUNT_KEY,
        securities::SECURITY_KEY,
        transactions::TRANSACTION_TYPE,
        transactions::QUANTITY,
        transactions::PRICE,
        transactions::AMOUNT,
        transactions::TRADE_DATE,
        transactions::SETTLE_DATE,
        transactions::CURRENCY,
    ];

    pub const TOTAL_MARKET_VALUE: &str = "total_market_value";

    pub const ACCOUNT_DAILY_VALUE: &[&str] = &[
        positions::AS_OF_DATE,
        accounts::ACCOUNT_KEY,
        TOTAL_MARKET_VALUE,
    ];

    pub const CUSTOMER_DAILY_VALUE: &[&str] = &[
        positions::AS_OF_DATE,
        customers::CUSTOMER_KEY,
        TOTAL_MARKET_VALUE,
    ];
}
