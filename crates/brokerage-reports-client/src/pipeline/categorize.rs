use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::warn;

use crate::contracts::types::BucketReport;
use crate::pipeline::report::layout_for;
use crate::pipeline::{Transaction, TransactionKind};

#[derive(Debug, Clone)]
pub struct ReportBucket {
    pub kind: TransactionKind,
    pub transactions: Vec<Transaction>,
}

impl ReportBucket {
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Sum of amounts, or `None` when it does not fit in a `Decimal`.
    pub fn total(&self) -> Option<Decimal> {
        self.transactions
            .iter()
            .try_fold(Decimal::ZERO, |total, txn| total.checked_add(txn.amount))
    }
}

/// Transactions grouped by kind. Every kind has a bucket, even when empty,
/// so each report is written on every run.
#[derive(Debug, Clone)]
pub struct ReportBuckets {
    buckets: BTreeMap<TransactionKind, ReportBucket>,
}

impl ReportBuckets {
    pub fn from_transactions(mut transactions: Vec<Transaction>) -> Self {
        transactions.sort_by(|left, right| {
            left.date
                .cmp(&right.date)
                .then(left.source.cmp(&right.source))
                .then(left.source_row.cmp(&right.source_row))
        });

        let mut buckets = TransactionKind::ALL
            .iter()
            .map(|kind| {
                (
                    *kind,
                    ReportBucket {
                        kind: *kind,
                        transactions: Vec::new(),
                    },
                )
            })
            .collect::<BTreeMap<_, _>>();

        for transaction in transactions {
            if let Some(bucket) = buckets.get_mut(&transaction.kind) {
                bucket.transactions.push(transaction);
            }
        }

        Self { buckets }
    }

    pub fn get(&self, kind: TransactionKind) -> Option<&ReportBucket> {
        self.buckets.get(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReportBucket> {
        self.buckets.values()
    }

    pub fn summaries(&self) -> Vec<BucketReport> {
        self.iter()
            .map(|bucket| {
                let total = bucket.total();
                if total.is_none() {
                    warn!(
                        category = bucket.kind.as_str(),
                        rows = bucket.len(),
                        "bucket total is too large to represent; leaving it out"
                    );
                }
                BucketReport {
                    category: bucket.kind,
                    file: layout_for(bucket.kind).map(|layout| layout.file_name.to_string()),
                    rows: bucket.len() as i64,
                    total,
                }
            })
            .collect()
    }
}
