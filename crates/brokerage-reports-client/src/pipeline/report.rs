use std::fs;
use std::path::PathBuf;

use tracing::info;

use crate::config::ReportConfig;
use crate::pipeline::categorize::ReportBuckets;
use crate::pipeline::values::{format_amount, format_quantity, format_report_date};
use crate::pipeline::{Transaction, TransactionKind};
use crate::{ClientError, ClientResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportColumn {
    Date,
    Action,
    Symbol,
    Quantity,
    Amount,
    CostBasis,
    PurchaseDate,
}

impl ReportColumn {
    pub const fn header(self) -> &'static str {
        match self {
            Self::Date => "Date",
            Self::Action => "Action",
            Self::Symbol => "Symbol",
            Self::Quantity => "Quantity",
            Self::Amount => "Amount",
            Self::CostBasis => "Cost Basis",
            Self::PurchaseDate => "PurchaseDate",
        }
    }

    fn cell(self, transaction: &Transaction) -> String {
        match self {
            Self::Date => format_report_date(transaction.date),
            Self::Action => transaction.action.clone(),
            Self::Symbol => transaction.symbol.clone().unwrap_or_default(),
            Self::Quantity => transaction
                .quantity
                .map(format_quantity)
                .unwrap_or_default(),
            Self::Amount => format_amount(transaction.amount),
            Self::CostBasis => transaction
                .cost_basis
                .map(format_amount)
                .unwrap_or_default(),
            Self::PurchaseDate => transaction
                .acquired_on
                .map(format_report_date)
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReportLayout {
    pub kind: TransactionKind,
    pub file_name: &'static str,
    pub columns: &'static [ReportColumn],
}

impl ReportLayout {
    pub fn headers(&self) -> Vec<String> {
        self.columns
            .iter()
            .map(|column| column.header().to_string())
            .collect()
    }
}

pub static REPORT_LAYOUTS: [ReportLayout; 4] = [
    ReportLayout {
        kind: TransactionKind::Dividend,
        file_name: "dividend_transactions.csv",
        columns: &[
            ReportColumn::Date,
            ReportColumn::Action,
            ReportColumn::Symbol,
            ReportColumn::Amount,
        ],
    },
    ReportLayout {
        kind: TransactionKind::Interest,
        file_name: "interest_transactions.csv",
        columns: &[ReportColumn::Date, ReportColumn::Action, ReportColumn::Amount],
    },
    ReportLayout {
        kind: TransactionKind::Tax,
        file_name: "tax_deducted_transactions.csv",
        columns: &[ReportColumn::Date, ReportColumn::Symbol, ReportColumn::Amount],
    },
    ReportLayout {
        kind: TransactionKind::Sale,
        file_name: "sale_transactions.csv",
        columns: &[
            ReportColumn::Date,
            ReportColumn::Symbol,
            ReportColumn::Quantity,
            ReportColumn::Amount,
            ReportColumn::CostBasis,
            ReportColumn::PurchaseDate,
        ],
    },
];

/// `None` for kinds that are tallied but never written (misc).
pub fn layout_for(kind: TransactionKind) -> Option<&'static ReportLayout> {
    REPORT_LAYOUTS.iter().find(|layout| layout.kind == kind)
}

pub fn render_report(layout: &ReportLayout, transactions: &[Transaction]) -> Result<Vec<u8>, String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(layout.columns.iter().map(|column| column.header()))
        .map_err(|error| error.to_string())?;
    for transaction in transactions {
        writer
            .write_record(layout.columns.iter().map(|column| column.cell(transaction)))
            .map_err(|error| error.to_string())?;
    }
    writer.into_inner().map_err(|error| error.to_string())
}

/// Writes one CSV per report layout, replacing any earlier output.
pub fn write_reports(config: &ReportConfig, buckets: &ReportBuckets) -> ClientResult<Vec<PathBuf>> {
    fs::create_dir_all(&config.reports_dir).map_err(|error| {
        ClientError::report_write_failed(&config.reports_dir, &error.to_string())
    })?;

    let mut written = Vec::with_capacity(REPORT_LAYOUTS.len());
    for layout in &REPORT_LAYOUTS {
        let path = config.output_path(layout.file_name);
        let transactions = buckets
            .get(layout.kind)
            .map(|bucket| bucket.transactions.as_slice())
            .unwrap_or_default();
        let body = render_report(layout, transactions)
            .map_err(|detail| ClientError::report_write_failed(&path, &detail))?;
        fs::write(&path, body)
            .map_err(|error| ClientError::report_write_failed(&path, &error.to_string()))?;
        info!(
            report = layout.kind.as_str(),
            path = %path.display(),
            rows = transactions.len(),
            "wrote report"
        );
        written.push(path);
    }
    Ok(written)
}
