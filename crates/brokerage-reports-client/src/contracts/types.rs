use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::{SourceKind, SplitRule};
use crate::pipeline::TransactionKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowIssue {
    pub row: i64,
    pub field: String,
    pub code: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    Loaded,
    Missing,
    Unreadable,
    SchemaMismatch,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub source: SourceKind,
    pub path: String,
    pub status: SourceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub rows_read: i64,
    pub rows_normalized: i64,
    pub rows_skipped: i64,
    pub rows_invalid: i64,
    pub issues: Vec<RowIssue>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BucketReport {
    pub category: TransactionKind,
    pub file: Option<String>,
    pub rows: i64,
    /// Serialized as a decimal string; `null` when the sum overflows.
    pub total: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub rows_read: i64,
    pub rows_normalized: i64,
    pub rows_skipped: i64,
    pub rows_invalid: i64,
    pub split_adjusted: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunData {
    pub dry_run: bool,
    pub year: i32,
    pub config_path: String,
    pub reports_dir: String,
    pub message: String,
    pub summary: RunSummary,
    pub sources: Vec<SourceReport>,
    pub buckets: Vec<BucketReport>,
    pub files_written: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputFile {
    pub source: SourceKind,
    pub path: String,
    pub exists: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputFile {
    pub category: TransactionKind,
    pub path: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigShowData {
    pub config_path: String,
    pub year: i32,
    pub currency: String,
    pub stock_splits: Vec<SplitRule>,
    pub transactions_dir: String,
    pub reports_dir: String,
    pub inputs: Vec<InputFile>,
    pub outputs: Vec<OutputFile>,
}
