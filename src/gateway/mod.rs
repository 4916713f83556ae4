//! Raw-file staging into the blob store.
//!
//! The blob store is a plain directory root laid out `raw/YYYY/MM/DD/<file>`.
//! An upload is a byte copy plus a SHA-256 checksum; every file gets one
//! receipt appended to the ingest log as a JSON line, success or failure. A
//! failed upload is recorded and skipped, never fatal to the rest of the run.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::observability::metrics as obs;

/// One receipt per uploaded file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub run_id: String,
    pub file_name: String,
    pub blob_path: String,
    pub size_bytes: u64,
    pub sha256: String,
    pub status: UploadStatus,
    pub error: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    Success,
    Failed,
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Upload every `*.csv` under `raw_dir` into the date-partitioned blob
/// layout and append one receipt per file to the ingest log.
pub fn ingest_raw_files(raw_dir: &Path, blob_root: &Path, log_path: &Path) -> Result<Vec<UploadReceipt>> {
    let run_id = Uuid::new_v4().to_string();
    let today = Utc::now();
    let prefix = PathBuf::from("raw")
        .join(today.format("%Y").to_string())
        .join(today.format("%m").to_string())
        .join(today.format("%d").to_string());

    let mut files: Vec<PathBuf> = fs::read_dir(raw_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .map(|ext| ext.eq_ignore_ascii_case("csv"))
                .unwrap_or(false)
        })
        .collect();
    files.sort();

    let mut receipts = Vec::with_capacity(files.len());
    for path in files {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let blob_rel = prefix.join(&file_name);
        receipts.push(upload_one(&path, blob_root, &blob_rel, &run_id, &file_name));
    }
    append_receipts(log_path, &receipts)?;
    info!(run_id = %run_id, files = receipts.len(), "ingest run complete");
    Ok(receipts)
}

fn upload_one(
    source: &Path,
    blob_root: &Path,
    blob_rel: &Path,
    run_id: &str,
    file_name: &str,
) -> UploadReceipt {
    let blob_path = blob_rel.to_string_lossy().into_owned();
    let receipt = |size, sha256, status, error| UploadReceipt {
        run_id: run_id.to_string(),
        file_name: file_name.to_string(),
        blob_path: blob_path.clone(),
        size_bytes: size,
        sha256,
        status,
        error,
        uploaded_at: Utc::now(),
    };

    let bytes = match fs::read(source) {
        Ok(bytes) => bytes,
        Err(e) => {
            obs::gateway::upload_error();
            warn!(file = file_name, error = %e, "failed to read raw file");
            return receipt(0, String::new(), UploadStatus::Failed, Some(e.to_string()));
        }
    };
    let digest = sha256_hex(&bytes);
    let target = blob_root.join(blob_rel);
    let copy = target
        .parent()
        .map(fs::create_dir_all)
        .unwrap_or(Ok(()))
        .and_then(|_| fs::write(&target, &bytes));
    match copy {
        Ok(()) => {
            obs::gateway::file_uploaded();
            obs::gateway::bytes_uploaded(bytes.len() as u64);
            info!(file = file_name, bytes = bytes.len(), sha256 = %digest, "uploaded raw file");
            receipt(bytes.len() as u64, digest, UploadStatus::Success, None)
        }
        Err(e) => {
            obs::gateway::upload_error();
            warn!(file = file_name, error = %e, "failed to upload raw file");
            receipt(bytes.len() as u64, digest, UploadStatus::Failed, Some(e.to_string()))
        }
    }
}

fn append_receipts(log_path: &Path, receipts: &[UploadReceipt]) -> Result<()> {
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(log_path)?;
    for receipt in receipts {
        let line = serde_json::to_string(receipt)?;
        writeln!(file, "{}", line)?;
    }
    Ok(())
}
