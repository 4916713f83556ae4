use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Runtime configuration, read from `config.toml` when present and falling
/// back to the default directory layout otherwise. `FINMART_DATA_ROOT`
/// overrides the data root for tests and one-off runs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root for raw and processed datasets (`<data_root>/raw`, `<data_root>/processed`)
    pub data_root: PathBuf,
    /// Reports, run logs, and the metrics snapshot
    pub logs_dir: PathBuf,
    /// Root of the local blob store the ingest stage uploads into
    pub blob_root: PathBuf,
    /// Where the load planner writes warehouse DDL
    pub ddl_dir: PathBuf,
    pub generator: GeneratorConfig,
}

/// Shape knobs for the mock data generator.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub seed: u64,
    pub customers: usize,
    pub accounts_per_customer: usize,
    pub market_data_days: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("data"),
            logs_dir: PathBuf::from("logs"),
            blob_root: PathBuf::from("blob"),
            ddl_dir: PathBuf::from("warehouse/ddl"),
            generator: GeneratorConfig::default(),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 7,
            customers: 5,
            accounts_per_customer: 2,
            market_data_days: 30,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = match fs::read_to_string("config.toml") {
            Ok(content) => toml::from_str(&content)?,
            Err(_) => Config::default(),
        };
        if let Ok(root) = std::env::var("FINMART_DATA_ROOT") {
            config = config.rooted_at(Path::new(&root));
        }
        Ok(config)
    }

    /// Re-anchor every directory under `root`, keeping relative layout.
    pub fn rooted_at(mut self, root: &Path) -> Self {
        self.data_root = root.join("data");
        self.logs_dir = root.join("logs");
        self.blob_root = root.join("blob");
        self.ddl_dir = root.join("warehouse").join("ddl");
        self
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.data_root.join("raw")
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.data_root.join("processed")
    }

    pub fn ingest_log_path(&self) -> PathBuf {
        self.logs_dir.join("ingestion_log.ndjson")
    }
}
