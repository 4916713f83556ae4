//! Simple metrics module for the pipeline.
//!
//! This module provides a straightforward API for recording metrics using
//! the standard Prometheus naming conventions. A batch run installs the
//! recorder at startup and snapshots the rendered registry into a textfile
//! at exit, where a node-exporter style collector can pick it up.

use std::fmt;
use std::path::Path;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Enum representing all metric names used in the system.
/// This eliminates magic strings and provides compile-time safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Generator metrics
    GeneratorRowsWritten,

    // Gateway metrics
    GatewayFilesUploaded,
    GatewayUploadErrors,
    GatewayBytesUploaded,

    // Transform metrics
    TransformRowsLoaded,
    TransformTablesWritten,
    TransformRowsWritten,

    // Quality gate metrics
    QualityGateRowsDropped,

    // Load planner metrics
    LoadPlanTablesPlanned,
}

impl MetricName {
    /// Get the metric name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::GeneratorRowsWritten => "finmart_generator_rows_written_total",
            MetricName::GatewayFilesUploaded => "finmart_gateway_files_uploaded_total",
            MetricName::GatewayUploadErrors => "finmart_gateway_upload_errors_total",
            MetricName::GatewayBytesUploaded => "finmart_gateway_bytes_uploaded_total",
            MetricName::TransformRowsLoaded => "finmart_transform_rows_loaded_total",
            MetricName::TransformTablesWritten => "finmart_transform_tables_written_total",
            MetricName::TransformRowsWritten => "finmart_transform_rows_written_total",
            MetricName::QualityGateRowsDropped => "finmart_quality_gate_rows_dropped_total",
            MetricName::LoadPlanTablesPlanned => "finmart_load_plan_tables_planned_total",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Install the global Prometheus recorder. Returns `None` when a recorder is
/// already installed (tests install at most one per process).
pub fn install_recorder() -> Option<PrometheusHandle> {
    PrometheusBuilder::new().install_recorder().ok()
}

/// Snapshot the rendered registry into a textfile.
pub fn write_textfile(handle: &PrometheusHandle, path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, handle.render())
}

pub mod generator {
    use super::MetricName;

    pub fn rows_written(entity: &str, rows: u64) {
        ::metrics::counter!(
            MetricName::GeneratorRowsWritten.as_str(),
            "entity" => entity.to_string()
        )
        .increment(rows);
    }
}

pub mod gateway {
    use super::MetricName;

    pub fn file_uploaded() {
        ::metrics::counter!(MetricName::GatewayFilesUploaded.as_str()).increment(1);
    }

    pub fn upload_error() {
        ::metrics::counter!(MetricName::GatewayUploadErrors.as_str()).increment(1);
    }

    pub fn bytes_uploaded(bytes: u64) {
        ::metrics::counter!(MetricName::GatewayBytesUploaded.as_str()).increment(bytes);
    }
}

pub mod transform {
    use super::MetricName;

    pub fn rows_loaded(entity: &str, rows: u64) {
        ::metrics::counter!(
            MetricName::TransformRowsLoaded.as_str(),
            "entity" => entity.to_string()
        )
        .increment(rows);
    }

    pub fn table_written(table: &str, rows: u64) {
        ::metrics::counter!(
            MetricName::TransformTablesWritten.as_str(),
            "table" => table.to_string()
        )
        .increment(1);
        ::metrics::counter!(
            MetricName::TransformRowsWritten.as_str(),
            "table" => table.to_string()
        )
        .increment(rows);
    }
}

pub mod quality_gate {
    use super::MetricName;

    pub fn rows_dropped(rule: &str, dropped: u64) {
        ::metrics::counter!(
            MetricName::QualityGateRowsDropped.as_str(),
            "rule" => rule.to_string()
        )
        .increment(dropped);
    }
}

pub mod load_plan {
    use super::MetricName;

    pub fn table_planned(table: &str) {
        ::metrics::counter!(
            MetricName::LoadPlanTablesPlanned.as_str(),
            "table" => table.to_string()
        )
        .increment(1);
    }
}
