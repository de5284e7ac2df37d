use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::SplitRule;
use crate::contracts::types::RowIssue;
use crate::pipeline::Transaction;

/// Stock splits in effect for a run, ordered by date.
///
/// A transaction dated strictly before a split is restated in post-split
/// units: its quantity is multiplied by the ratio and its per-unit price
/// divided by it, so `quantity * price` does not change. Splits compound.
#[derive(Debug, Clone, Default)]
pub struct SplitSchedule {
    rules: Vec<SplitRule>,
}

impl SplitSchedule {
    pub fn new(rules: &[SplitRule]) -> Self {
        let mut rules = rules.to_vec();
        rules.sort_by_key(|rule| rule.date);
        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Combined ratio of every split after `date` that applies to `symbol`,
    /// or `None` when the product does not fit in a `Decimal`.
    /// Symbol-scoped rules never match a transaction without a symbol.
    pub fn factor_for(&self, date: NaiveDate, symbol: Option<&str>) -> Option<Decimal> {
        self.rules
            .iter()
            .filter(|rule| date < rule.date)
            .filter(|rule| match rule.symbol.as_deref() {
                Some(scoped) => symbol.is_some_and(|value| value.eq_ignore_ascii_case(scoped)),
                None => true,
            })
            .try_fold(Decimal::ONE, |factor, rule| factor.checked_mul(rule.ratio))
    }

    pub fn adjust(&self, transaction: Transaction) -> Result<Transaction, SplitOverflow> {
        let Some(quantity) = transaction.quantity else {
            return Ok(transaction);
        };
        let source_row = transaction.source_row;
        let overflow = move || SplitOverflow {
            source_row,
            quantity,
        };
        let factor = self
            .factor_for(transaction.date, transaction.symbol.as_deref())
            .ok_or_else(overflow)?;
        if factor == Decimal::ONE {
            return Ok(transaction);
        }
        let restated = quantity.checked_mul(factor).ok_or_else(overflow)?;

        let price = transaction
            .price
            .map(|value| value.checked_div(factor).unwrap_or(value));
        Ok(Transaction {
            quantity: Some(restated),
            price,
            ..transaction
        })
    }

    /// Adjusts every transaction. Rows that cannot be restated are returned
    /// separately so the caller can report them.
    pub fn adjust_all(&self, transactions: Vec<Transaction>) -> SplitOutcome {
        let mut outcome = SplitOutcome::default();
        if self.is_empty() {
            outcome.transactions = transactions;
            return outcome;
        }

        for transaction in transactions {
            let before = transaction.quantity;
            match self.adjust(transaction) {
                Ok(after) => {
                    if after.quantity != before {
                        outcome.adjusted += 1;
                    }
                    outcome.transactions.push(after);
                }
                Err(overflow) => outcome.overflows.push(overflow),
            }
        }
        outcome
    }
}

/// A row whose quantity is too large to restate in post-split units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOverflow {
    pub source_row: i64,
    pub quantity: Decimal,
}

impl SplitOverflow {
    pub fn to_issue(&self) -> RowIssue {
        RowIssue {
            row: self.source_row,
            field: "Quantity".to_string(),
            code: "split_overflow".to_string(),
            description: "Quantity is too large to restate for the configured stock splits."
                .to_string(),
            received: Some(self.quantity.to_string()),
        }
    }
}

#[derive(Debug, Default)]
pub struct SplitOutcome {
    pub transactions: Vec<Transaction>,
    pub adjusted: usize,
    pub overflows: Vec<SplitOverflow>,
}
