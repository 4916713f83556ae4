use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("missing required columns in {table}: {}", columns.join(", "))]
    MissingColumns { table: String, columns: Vec<String> },

    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("duplicate column: {0}")]
    DuplicateColumn(String),
}

pub type Result<T> = std::result::Result<T, EtlError>;
