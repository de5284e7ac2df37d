pub mod categorize;
pub mod normalize;
pub mod reader;
pub mod report;
pub mod splits;
pub mod values;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::ClientResult;
use crate::config::{ReportConfig, SourceKind};
use crate::contracts::types::{
    BucketReport, RowIssue, RunSummary, SourceReport, SourceStatus,
};
use categorize::ReportBuckets;
use normalize::NormalizedSource;
use reader::SourceLoad;
use splits::SplitSchedule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Dividend,
    Interest,
    Tax,
    Sale,
    Misc,
}

impl TransactionKind {
    pub const ALL: [Self; 5] = [
        Self::Dividend,
        Self::Interest,
        Self::Tax,
        Self::Sale,
        Self::Misc,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dividend => "dividend",
            Self::Interest => "interest",
            Self::Tax => "tax",
            Self::Sale => "sale",
            Self::Misc => "misc",
        }
    }
}

/// A normalized brokerage record. Built once by the normalizer; the split
/// adjuster produces a new value rather than editing in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub date: NaiveDate,
    pub symbol: Option<String>,
    pub kind: TransactionKind,
    pub action: String,
    pub quantity: Option<Decimal>,
    pub price: Option<Decimal>,
    pub amount: Decimal,
    pub cost_basis: Option<Decimal>,
    pub acquired_on: Option<NaiveDate>,
    pub currency: String,
    pub source: SourceKind,
    pub source_row: i64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub dry_run: bool,
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub summary: RunSummary,
    pub sources: Vec<SourceReport>,
    pub buckets: Vec<BucketReport>,
    pub files_written: Vec<String>,
}

pub fn execute(config: &ReportConfig, options: RunOptions) -> ClientResult<RunOutcome> {
    let schedule = SplitSchedule::new(config.split_rules());
    let mut sources = Vec::new();
    let mut transactions = Vec::new();
    let mut split_adjusted = 0;

    for kind in SourceKind::ALL {
        let mut loaded = load_source(config, &schedule, kind);
        transactions.append(&mut loaded.transactions);
        split_adjusted += loaded.split_adjusted;
        sources.push(loaded.report);
    }

    if split_adjusted > 0 {
        debug!(split_adjusted, "applied stock split adjustments");
    }

    let buckets = ReportBuckets::from_transactions(transactions);
    let files_written = if options.dry_run {
        Vec::new()
    } else {
        report::write_reports(config, &buckets)?
            .iter()
            .map(|path| path.display().to_string())
            .collect()
    };

    let summary = RunSummary {
        rows_read: sources.iter().map(|source| source.rows_read).sum(),
        rows_normalized: sources.iter().map(|source| source.rows_normalized).sum(),
        rows_skipped: sources.iter().map(|source| source.rows_skipped).sum(),
        rows_invalid: sources.iter().map(|source| source.rows_invalid).sum(),
        split_adjusted: split_adjusted as i64,
    };

    Ok(RunOutcome {
        summary,
        sources,
        buckets: buckets.summaries(),
        files_written,
    })
}

struct LoadedSource {
    report: SourceReport,
    transactions: Vec<Transaction>,
    split_adjusted: usize,
}

impl LoadedSource {
    fn skipped(report: SourceReport) -> Self {
        Self {
            report,
            transactions: Vec::new(),
            split_adjusted: 0,
        }
    }
}

fn load_source(config: &ReportConfig, schedule: &SplitSchedule, kind: SourceKind) -> LoadedSource {
    let path = config.input_path(kind);
    let mut report = SourceReport {
        source: kind,
        path: path.display().to_string(),
        status: SourceStatus::Loaded,
        detail: None,
        rows_read: 0,
        rows_normalized: 0,
        rows_skipped: 0,
        rows_invalid: 0,
        issues: Vec::new(),
    };

    let (table, read_issues) = match reader::read_table(&path, kind.leading_lines()) {
        SourceLoad::Loaded { table, issues } => (table, issues),
        SourceLoad::Missing => {
            warn!(source = kind.as_str(), path = %path.display(), "input file not found; skipping");
            report.status = SourceStatus::Missing;
            return LoadedSource::skipped(report);
        }
        SourceLoad::Unreadable(detail) => {
            warn!(source = kind.as_str(), path = %path.display(), %detail, "input file unreadable; skipping");
            report.status = SourceStatus::Unreadable;
            report.detail = Some(detail);
            return LoadedSource::skipped(report);
        }
    };

    report.rows_read = (table.rows.len() + read_issues.len()) as i64;

    let normalized = match normalize::normalize_source(kind, &table, &config.currency) {
        Ok(value) => value,
        Err(mismatch) => {
            let detail = format!(
                "missing required headers: {}",
                mismatch.missing_headers.join(", ")
            );
            warn!(source = kind.as_str(), path = %path.display(), %detail, "input file has an unexpected layout; skipping");
            report.status = SourceStatus::SchemaMismatch;
            report.detail = Some(detail);
            report.issues = read_issues;
            report.rows_invalid = report.rows_read;
            return LoadedSource::skipped(report);
        }
    };

    let NormalizedSource {
        transactions,
        issues: row_issues,
        skipped,
    } = normalized;

    let split = schedule.adjust_all(transactions);
    let transactions = split.transactions;

    let mut issues = read_issues;
    issues.extend(row_issues);
    issues.extend(split.overflows.iter().map(|overflow| overflow.to_issue()));
    issues.sort_by_key(|issue| issue.row);
    for issue in &issues {
        warn!(
            source = kind.as_str(),
            row = issue.row,
            field = %issue.field,
            code = %issue.code,
            "{}",
            issue.description
        );
    }

    report.rows_normalized = transactions.len() as i64;
    report.rows_skipped = skipped as i64;
    report.rows_invalid = distinct_rows(&issues);
    report.issues = issues;

    info!(
        source = kind.as_str(),
        path = %path.display(),
        rows_read = report.rows_read,
        rows_normalized = report.rows_normalized,
        rows_invalid = report.rows_invalid,
        "loaded input file"
    );

    LoadedSource {
        report,
        transactions,
        split_adjusted: split.adjusted,
    }
}

fn distinct_rows(issues: &[RowIssue]) -> i64 {
    issues
        .iter()
        .map(|issue| issue.row)
        .collect::<std::collections::BTreeSet<i64>>()
        .len() as i64
}
