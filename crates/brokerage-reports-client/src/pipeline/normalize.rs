//! Maps the three brokerage export layouts onto [`Transaction`].
//!
//! Every data row ends up as exactly one transaction, one or more issues
//! against that row, or a skipped summary line.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::SourceKind;
use crate::contracts::types::RowIssue;
use crate::pipeline::reader::{Columns, RawRow, SourceTable};
use crate::pipeline::values::{parse_money, parse_source_date};
use crate::pipeline::{Transaction, TransactionKind};

const EAC_REQUIRED_HEADERS: [&str; 4] = ["Date", "Action", "Symbol", "Amount"];
const INDIVIDUAL_REQUIRED_HEADERS: [&str; 4] = ["Date", "Action", "Symbol", "Amount"];
const REALIZED_GAINS_REQUIRED_HEADERS: [&str; 4] = ["Closed Date", "Symbol", "Quantity", "Proceeds"];

const EAC_DIVIDEND: &str = "Dividend";
const EAC_TAX_WITHHOLDING: &str = "Tax Withholding";
const EAC_SALE: &str = "Sale";
const EAC_LOT_SALE: &str = "Lot Sale";
const RESTRICTED_STOCK_LOT: &str = "RS";
const REALIZED_SALE_ACTION: &str = "Sale";
const TRANSACTIONS_TOTAL_PREFIX: &str = "Transactions Total";

const INDIVIDUAL_DIVIDEND_ACTIONS: [&str; 7] = [
    "Reinvest Dividend",
    "Qual Div Reinvest",
    "Qualified Dividend",
    "Cash Dividend",
    "Non-Qualified Div",
    "Pr Yr Div Reinvest",
    "Special Dividend",
];
const INDIVIDUAL_INTEREST_ACTIONS: [&str; 2] = ["Credit Interest", "Bank Interest"];
const INDIVIDUAL_TAX_ACTIONS: [&str; 3] = ["NRA Tax Adj", "NRA Withholding", "Foreign Tax Paid"];

#[derive(Debug, Clone, Default)]
pub struct NormalizedSource {
    pub transactions: Vec<Transaction>,
    pub issues: Vec<RowIssue>,
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaMismatch {
    pub missing_headers: Vec<String>,
}

pub fn required_headers(kind: SourceKind) -> &'static [&'static str] {
    match kind {
        SourceKind::EacTransactions => &EAC_REQUIRED_HEADERS,
        SourceKind::IndividualTransactions => &INDIVIDUAL_REQUIRED_HEADERS,
        SourceKind::IndividualRealizedGains => &REALIZED_GAINS_REQUIRED_HEADERS,
    }
}

pub fn normalize_source(
    kind: SourceKind,
    table: &SourceTable,
    currency: &str,
) -> Result<NormalizedSource, SchemaMismatch> {
    if table.headers.is_empty() && table.rows.is_empty() {
        return Ok(NormalizedSource::default());
    }

    let columns = Columns::new(&table.headers);
    let missing = columns.missing(required_headers(kind));
    if !missing.is_empty() {
        return Err(SchemaMismatch {
            missing_headers: missing.iter().map(|name| name.to_string()).collect(),
        });
    }

    let mut output = NormalizedSource::default();
    match kind {
        SourceKind::EacTransactions => normalize_eac(&columns, table, currency, &mut output),
        SourceKind::IndividualTransactions => {
            normalize_individual(&columns, table, currency, &mut output)
        }
        SourceKind::IndividualRealizedGains => {
            normalize_realized_gains(&columns, table, currency, &mut output)
        }
    }
    Ok(output)
}

pub fn classify_individual_action(action: &str) -> TransactionKind {
    if INDIVIDUAL_DIVIDEND_ACTIONS.contains(&action) {
        TransactionKind::Dividend
    } else if INDIVIDUAL_INTEREST_ACTIONS.contains(&action) {
        TransactionKind::Interest
    } else if INDIVIDUAL_TAX_ACTIONS.contains(&action) {
        TransactionKind::Tax
    } else {
        TransactionKind::Misc
    }
}

fn normalize_eac(
    columns: &Columns,
    table: &SourceTable,
    currency: &str,
    output: &mut NormalizedSource,
) {
    let mut last_date: Option<NaiveDate> = None;
    let mut last_symbol: Option<String> = None;

    for (position, raw) in table.rows.iter().enumerate() {
        let mut row = RowReader::new(columns, raw);
        let action = row.text("Action").unwrap_or_default().to_string();

        // Lot detail and trailing withholding rows leave Date blank. A bad
        // date clears the inherited one so its detail rows are rejected too.
        let date = match row.text("Date") {
            Some(value) => {
                last_date = row.date_value("Date", value);
                last_date
            }
            None => {
                if last_date.is_none() {
                    row.push(
                        "Date",
                        "missing_date",
                        "Date is blank and the nearest dated row above has no valid date.",
                        None,
                    );
                }
                last_date
            }
        };

        let own_symbol = row.text("Symbol").map(str::to_string);
        if own_symbol.is_some() {
            last_symbol = own_symbol.clone();
        }

        let draft = match action.as_str() {
            EAC_DIVIDEND => cash_draft(&mut row, TransactionKind::Dividend, &action, own_symbol),
            EAC_TAX_WITHHOLDING => cash_draft(&mut row, TransactionKind::Tax, &action, own_symbol),
            EAC_LOT_SALE => lot_sale_draft(
                &mut row,
                &action,
                own_symbol.or_else(|| last_symbol.clone()),
            ),
            EAC_SALE => {
                let followed_by_lots = table
                    .rows
                    .get(position + 1)
                    .and_then(|next| columns.text(next, "Action"))
                    == Some(EAC_LOT_SALE);
                if followed_by_lots {
                    misc_draft(&mut row, &action, own_symbol)
                } else {
                    sale_summary_draft(&mut row, &action, own_symbol)
                }
            }
            _ => misc_draft(&mut row, &action, own_symbol),
        };

        row.finish(date, draft, SourceKind::EacTransactions, currency, output);
    }
}

fn normalize_individual(
    columns: &Columns,
    table: &SourceTable,
    currency: &str,
    output: &mut NormalizedSource,
) {
    for raw in &table.rows {
        let mut row = RowReader::new(columns, raw);
        if row
            .text("Date")
            .is_some_and(|value| value.starts_with(TRANSACTIONS_TOTAL_PREFIX))
        {
            output.skipped += 1;
            continue;
        }

        let date = row.required_date("Date");
        let action = row.text("Action").unwrap_or_default().to_string();
        let symbol = row.text("Symbol").map(str::to_string);
        let kind = classify_individual_action(&action);

        let mut draft = if kind == TransactionKind::Misc {
            misc_draft(&mut row, &action, symbol)
        } else {
            cash_draft(&mut row, kind, &action, symbol)
        };
        draft.price = row.optional_money("Price");

        row.finish(date, draft, SourceKind::IndividualTransactions, currency, output);
    }
}

fn normalize_realized_gains(
    columns: &Columns,
    table: &SourceTable,
    currency: &str,
    output: &mut NormalizedSource,
) {
    for raw in &table.rows {
        let mut row = RowReader::new(columns, raw);
        let date = row.required_date("Closed Date");
        let quantity = row.required_money("Quantity");
        let amount = row.required_money("Proceeds");
        let draft = Draft {
            kind: TransactionKind::Sale,
            action: REALIZED_SALE_ACTION.to_string(),
            symbol: row.text("Symbol").map(str::to_string),
            quantity,
            price: per_unit(amount, quantity),
            amount,
            cost_basis: row.optional_money("Cost Basis (CB)"),
            acquired_on: row.lenient_date("Opened Date"),
        };

        row.finish(date, draft, SourceKind::IndividualRealizedGains, currency, output);
    }
}

fn cash_draft(
    row: &mut RowReader<'_>,
    kind: TransactionKind,
    action: &str,
    symbol: Option<String>,
) -> Draft {
    Draft {
        kind,
        action: action.to_string(),
        symbol,
        quantity: row.optional_money("Quantity"),
        price: None,
        amount: row.required_money("Amount"),
        cost_basis: None,
        acquired_on: None,
    }
}

fn misc_draft(row: &mut RowReader<'_>, action: &str, symbol: Option<String>) -> Draft {
    Draft {
        kind: TransactionKind::Misc,
        action: action.to_string(),
        symbol,
        quantity: row.optional_money("Quantity"),
        price: None,
        amount: Some(row.optional_money("Amount").unwrap_or(Decimal::ZERO)),
        cost_basis: None,
        acquired_on: None,
    }
}

fn sale_summary_draft(row: &mut RowReader<'_>, action: &str, symbol: Option<String>) -> Draft {
    let quantity = row.optional_money("Quantity");
    let amount = row.required_money("Amount");
    let price = row.optional_money("SalePrice").or_else(|| per_unit(amount, quantity));
    Draft {
        kind: TransactionKind::Sale,
        action: action.to_string(),
        symbol,
        quantity,
        price,
        amount,
        cost_basis: None,
        acquired_on: None,
    }
}

fn lot_sale_draft(row: &mut RowReader<'_>, action: &str, symbol: Option<String>) -> Draft {
    let shares = row.optional_money("Shares");
    let quantity = match shares {
        Some(value) => Some(value),
        None => row.optional_money("Quantity"),
    };
    if quantity.is_none() {
        row.push(
            "Shares",
            "missing_quantity",
            "Lot Sale rows must carry Shares (or Quantity).",
            None,
        );
    }

    let sale_price = row.optional_money("SalePrice");
    let amount = match row.optional_money("Amount") {
        Some(value) => Some(value),
        None => match quantity.zip(sale_price) {
            Some((shares, price)) => row.product("Amount", shares, price),
            None => None,
        },
    };
    if amount.is_none() && quantity.is_some() && row.issues.is_empty() {
        row.push(
            "Amount",
            "missing_amount",
            "Lot Sale rows need Amount, or Shares and SalePrice to derive it.",
            None,
        );
    }

    let restricted = row
        .text("Type")
        .is_some_and(|value| value.eq_ignore_ascii_case(RESTRICTED_STOCK_LOT));
    let vest_value = row.optional_money("VestFairMarketValue");
    let purchase_value = row.optional_money("PurchaseFairMarketValue");
    let vest_date = row.lenient_date("VestDate");
    let purchase_date = row.lenient_date("PurchaseDate");

    let (basis_per_share, acquired_on) = if restricted {
        (vest_value.or(purchase_value), vest_date.or(purchase_date))
    } else {
        (purchase_value.or(vest_value), purchase_date.or(vest_date))
    };

    let cost_basis = match basis_per_share.zip(quantity) {
        Some((per_share, shares)) => row.product("Cost Basis", per_share, shares),
        None => None,
    };

    Draft {
        kind: TransactionKind::Sale,
        action: action.to_string(),
        symbol,
        quantity,
        price: sale_price.or_else(|| per_unit(amount, quantity)),
        amount,
        cost_basis,
        acquired_on,
    }
}

fn per_unit(amount: Option<Decimal>, quantity: Option<Decimal>) -> Option<Decimal> {
    let (total, units) = amount.zip(quantity)?;
    total.checked_div(units)
}

struct Draft {
    kind: TransactionKind,
    action: String,
    symbol: Option<String>,
    quantity: Option<Decimal>,
    price: Option<Decimal>,
    amount: Option<Decimal>,
    cost_basis: Option<Decimal>,
    acquired_on: Option<NaiveDate>,
}

/// Field access for one raw row, collecting issues as fields are read.
struct RowReader<'a> {
    columns: &'a Columns,
    raw: &'a RawRow,
    issues: Vec<RowIssue>,
}

impl<'a> RowReader<'a> {
    fn new(columns: &'a Columns, raw: &'a RawRow) -> Self {
        Self {
            columns,
            raw,
            issues: Vec::new(),
        }
    }

    fn text(&self, name: &str) -> Option<&'a str> {
        self.columns.text(self.raw, name)
    }

    fn push(&mut self, field: &str, code: &str, description: &str, received: Option<&str>) {
        self.issues.push(RowIssue {
            row: self.raw.row,
            field: field.to_string(),
            code: code.to_string(),
            description: description.to_string(),
            received: received.map(str::to_string),
        });
    }

    fn required_money(&mut self, name: &str) -> Option<Decimal> {
        if self.text(name).is_none() {
            self.push(
                name,
                "missing_amount",
                &format!("{name} must be present and non-empty."),
                None,
            );
            return None;
        }
        self.optional_money(name)
    }

    fn optional_money(&mut self, name: &str) -> Option<Decimal> {
        let value = self.text(name)?;
        let parsed = parse_money(value);
        if parsed.is_none() {
            self.push(
                name,
                "invalid_amount",
                &format!("{name} must be a number such as $1,234.56 or ($75.00); got \"{value}\""),
                Some(value),
            );
        }
        parsed
    }

    /// `left * right`, or an `invalid_amount` issue when it overflows.
    fn product(&mut self, name: &str, left: Decimal, right: Decimal) -> Option<Decimal> {
        let product = left.checked_mul(right);
        if product.is_none() {
            self.push(
                name,
                "invalid_amount",
                &format!("{name} is too large to compute from {left} x {right}."),
                None,
            );
        }
        product
    }

    fn required_date(&mut self, name: &str) -> Option<NaiveDate> {
        let Some(value) = self.text(name) else {
            self.push(
                name,
                "missing_date",
                &format!("{name} must be present and non-empty."),
                None,
            );
            return None;
        };
        self.date_value(name, value)
    }

    fn date_value(&mut self, name: &str, value: &str) -> Option<NaiveDate> {
        let parsed = parse_source_date(value);
        if parsed.is_none() {
            self.push(
                name,
                "invalid_date",
                &format!("{name} must be MM/DD/YYYY; got \"{value}\""),
                Some(value),
            );
        }
        parsed
    }

    /// Acquisition dates may read `Various`; anything unparseable is dropped.
    fn lenient_date(&self, name: &str) -> Option<NaiveDate> {
        self.text(name).and_then(parse_source_date)
    }

    fn finish(
        mut self,
        date: Option<NaiveDate>,
        draft: Draft,
        source: SourceKind,
        currency: &str,
        output: &mut NormalizedSource,
    ) {
        if self.issues.is_empty() {
            match (date, draft.amount) {
                (Some(date), Some(amount)) => {
                    output.transactions.push(Transaction {
                        date,
                        symbol: draft.symbol,
                        kind: draft.kind,
                        action: draft.action,
                        quantity: draft.quantity,
                        price: draft.price,
                        amount,
                        cost_basis: draft.cost_basis,
                        acquired_on: draft.acquired_on,
                        currency: currency.to_string(),
                        source,
                        source_row: self.raw.row,
                    });
                    return;
                }
                (None, _) => self.push("Date", "missing_date", "Row has no usable date.", None),
                (_, None) => {
                    self.push("Amount", "missing_amount", "Row has no usable amount.", None)
                }
            }
        }
        output.issues.append(&mut self.issues);
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use super::{NormalizedSource, classify_individual_action, normalize_source};
    use crate::config::SourceKind;
    use crate::pipeline::TransactionKind;
    use crate::pipeline::reader::parse_table;

    fn normalize(kind: SourceKind, body: &str) -> NormalizedSource {
        let parsed = parse_table(body, kind.leading_lines());
        assert!(parsed.is_ok());
        if let Ok((table, _issues)) = parsed {
            let normalized = normalize_source(kind, &table, "USD");
            assert!(normalized.is_ok());
            if let Ok(value) = normalized {
                return value;
            }
        }
        NormalizedSource::default()
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
    }

    const EAC_EXPORT: &str = "\
Date,Action,Symbol,Quantity,Amount,Shares,Type,SalePrice,VestFairMarketValue,PurchaseFairMarketValue,VestDate,PurchaseDate
06/15/2024,Sale,AAPL,100,\"$15,000.00\",,,,,,,
,Lot Sale,,,,60,RS,$150.00,$100.00,,01/01/2024,
,Lot Sale,,,\"$6,000.00\",40,ESPP,,,$80.00,,01/01/2023
05/01/2024,Dividend,AAPL,,$500.00,,,,,,,
,Tax Withholding,AAPL,,($75.00),,,,,,,
04/01/2024,Deposit,AAPL,10,,,,,,,,
";

    #[test]
    fn eac_rows_map_to_categories() {
        let normalized = normalize(SourceKind::EacTransactions, EAC_EXPORT);
        assert!(normalized.issues.is_empty(), "{:?}", normalized.issues);
        let kinds = normalized
            .transactions
            .iter()
            .map(|txn| txn.kind)
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                TransactionKind::Misc,
                TransactionKind::Sale,
                TransactionKind::Sale,
                TransactionKind::Dividend,
                TransactionKind::Tax,
                TransactionKind::Misc,
            ]
        );
    }

    #[test]
    fn eac_lot_sales_inherit_date_and_symbol_and_carry_basis() {
        let normalized = normalize(SourceKind::EacTransactions, EAC_EXPORT);
        let lots = normalized
            .transactions
            .iter()
            .filter(|txn| txn.action == "Lot Sale")
            .collect::<Vec<_>>();
        assert_eq!(lots.len(), 2);

        let restricted = lots[0];
        assert_eq!(restricted.date, date(2024, 6, 15));
        assert_eq!(restricted.symbol.as_deref(), Some("AAPL"));
        assert_eq!(restricted.quantity, Some(dec!(60)));
        assert_eq!(restricted.amount, dec!(9000));
        assert_eq!(restricted.price, Some(dec!(150)));
        assert_eq!(restricted.cost_basis, Some(dec!(6000)));
        assert_eq!(restricted.acquired_on, Some(date(2024, 1, 1)));

        let espp = lots[1];
        assert_eq!(espp.amount, dec!(6000));
        assert_eq!(espp.price, Some(dec!(150)));
        assert_eq!(espp.cost_basis, Some(dec!(3200)));
        assert_eq!(espp.acquired_on, Some(date(2023, 1, 1)));
    }

    #[test]
    fn eac_trailing_withholding_inherits_previous_date() {
        let normalized = normalize(SourceKind::EacTransactions, EAC_EXPORT);
        let tax = normalized
            .transactions
            .iter()
            .find(|txn| txn.kind == TransactionKind::Tax);
        assert!(tax.is_some());
        if let Some(txn) = tax {
            assert_eq!(txn.date, date(2024, 5, 1));
            assert_eq!(txn.amount, dec!(-75));
        }
    }

    #[test]
    fn eac_sale_without_lots_is_a_sale() {
        let normalized = normalize(
            SourceKind::EacTransactions,
            "Date,Action,Symbol,Quantity,Amount\n06/15/2024,Sale,AAPL,100,\"$15,000.00\"\n",
        );
        assert_eq!(normalized.transactions.len(), 1);
        assert_eq!(normalized.transactions[0].kind, TransactionKind::Sale);
        assert_eq!(normalized.transactions[0].price, Some(dec!(150)));
        assert_eq!(normalized.transactions[0].cost_basis, None);
    }

    #[test]
    fn eac_leading_blank_date_is_an_issue() {
        let normalized = normalize(
            SourceKind::EacTransactions,
            "Date,Action,Symbol,Amount\n,Dividend,AAPL,$1.00\n05/01/2024,Dividend,AAPL,$2.00\n",
        );
        assert_eq!(normalized.transactions.len(), 1);
        assert_eq!(normalized.issues.len(), 1);
        assert_eq!(normalized.issues[0].row, 1);
        assert_eq!(normalized.issues[0].code, "missing_date");
    }

    #[test]
    fn eac_lots_under_a_bad_date_are_rejected_not_backdated() {
        let normalized = normalize(
            SourceKind::EacTransactions,
            "Date,Action,Symbol,Quantity,Amount,Shares,Type,SalePrice,VestFairMarketValue,PurchaseFairMarketValue,VestDate,PurchaseDate
01/05/2024,Dividend,AAPL,,$1.00,,,,,,,
06/3O/2024,Sale,AAPL,60,\"$9,000.00\",,,,,,,
,Lot Sale,,,,60,RS,$150.00,$100.00,,01/02/2024,
07/01/2024,Dividend,AAPL,,$2.00,,,,,,,
",
        );
        assert!(
            normalized
                .transactions
                .iter()
                .all(|txn| txn.action != "Lot Sale")
        );
        assert_eq!(normalized.transactions.len(), 2);

        let codes = normalized
            .issues
            .iter()
            .map(|issue| (issue.row, issue.code.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(codes, vec![(2, "invalid_date"), (3, "missing_date")]);
    }

    #[test]
    fn eac_oversized_lot_is_a_row_issue() {
        let normalized = normalize(
            SourceKind::EacTransactions,
            "Date,Action,Symbol,Amount,Shares,Type,SalePrice,VestFairMarketValue
06/15/2024,Lot Sale,AAPL,,79228162514264337593543950335,RS,$2.00,$1.00
06/16/2024,Lot Sale,AAPL,,10,RS,$2.00,$1.00
",
        );
        assert_eq!(normalized.transactions.len(), 1);
        assert_eq!(normalized.transactions[0].amount, dec!(20));
        assert_eq!(normalized.issues.len(), 1);
        assert_eq!(normalized.issues[0].row, 1);
        assert_eq!(normalized.issues[0].field, "Amount");
        assert_eq!(normalized.issues[0].code, "invalid_amount");
    }

    #[test]
    fn individual_actions_are_classified() {
        assert_eq!(
            classify_individual_action("Reinvest Dividend"),
            TransactionKind::Dividend
        );
        assert_eq!(
            classify_individual_action("Qual Div Reinvest"),
            TransactionKind::Dividend
        );
        assert_eq!(
            classify_individual_action("Credit Interest"),
            TransactionKind::Interest
        );
        assert_eq!(classify_individual_action("NRA Tax Adj"), TransactionKind::Tax);
        assert_eq!(
            classify_individual_action("Reinvest Shares"),
            TransactionKind::Misc
        );
        assert_eq!(classify_individual_action("Buy"), TransactionKind::Misc);
    }

    #[test]
    fn individual_rows_normalize_and_skip_total_line() {
        let normalized = normalize(
            SourceKind::IndividualTransactions,
            "\"Date\",\"Action\",\"Symbol\",\"Description\",\"Quantity\",\"Price\",\"Fees & Comm\",\"Amount\"
\"06/15/2024\",\"Reinvest Dividend\",\"AAPL\",\"APPLE INC\",\"\",\"\",\"\",\"$250.00\"
\"06/15/2024\",\"Reinvest Shares\",\"AAPL\",\"APPLE INC\",\"1.25\",\"$200.00\",\"\",\"-$250.00\"
\"05/01/2024 as of 04/30/2024\",\"Credit Interest\",\"\",\"SCHWAB1 INT\",\"\",\"\",\"\",\"$15.50\"
\"04/15/2024\",\"NRA Tax Adj\",\"AAPL\",\"APPLE INC\",\"\",\"\",\"\",\"($37.50)\"
\"Transactions Total\",\"\",\"\",\"\",\"\",\"\",\"\",\"-$22.00\"
",
        );
        assert!(normalized.issues.is_empty(), "{:?}", normalized.issues);
        assert_eq!(normalized.skipped, 1);
        assert_eq!(normalized.transactions.len(), 4);

        let reinvest = &normalized.transactions[1];
        assert_eq!(reinvest.kind, TransactionKind::Misc);
        assert_eq!(reinvest.quantity, Some(dec!(1.25)));
        assert_eq!(reinvest.price, Some(dec!(200)));

        let interest = &normalized.transactions[2];
        assert_eq!(interest.kind, TransactionKind::Interest);
        assert_eq!(interest.date, date(2024, 5, 1));
        assert_eq!(interest.symbol, None);
    }

    #[test]
    fn individual_bad_amount_is_reported_per_row() {
        let normalized = normalize(
            SourceKind::IndividualTransactions,
            "Date,Action,Symbol,Amount\n06/15/2024,Reinvest Dividend,AAPL,lots\n06/16/2024,Credit Interest,,\n13/45/2024,Credit Interest,,$1.00\n06/17/2024,Credit Interest,,$2.00\n",
        );
        assert_eq!(normalized.transactions.len(), 1);
        let codes = normalized
            .issues
            .iter()
            .map(|issue| (issue.row, issue.code.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(
            codes,
            vec![
                (1, "invalid_amount"),
                (2, "missing_amount"),
                (3, "invalid_date"),
            ]
        );
    }

    #[test]
    fn realized_gains_skip_title_and_become_sales() {
        let normalized = normalize(
            SourceKind::IndividualRealizedGains,
            "Realized Gain/Loss for Individual XXXX-1234 as of 12/31/2024
\"Closed Date\",\"Symbol\",\"Quantity\",\"Proceeds\",\"Cost Basis (CB)\",\"Opened Date\"
\"06/20/2024\",\"AAPL\",\"25\",\"$4,250.00\",\"$3,750.00\",\"01/15/2024\"
\"05/15/2024\",\"MSFT\",\"50\",\"$18,750.00\",\"$15,000.00\",\"Various\"
",
        );
        assert!(normalized.issues.is_empty(), "{:?}", normalized.issues);
        assert_eq!(normalized.transactions.len(), 2);

        let first = &normalized.transactions[0];
        assert_eq!(first.kind, TransactionKind::Sale);
        assert_eq!(first.amount, dec!(4250));
        assert_eq!(first.price, Some(dec!(170)));
        assert_eq!(first.cost_basis, Some(dec!(3750)));
        assert_eq!(first.acquired_on, Some(date(2024, 1, 15)));
        assert_eq!(normalized.transactions[1].acquired_on, None);
    }

    #[test]
    fn missing_required_headers_is_a_schema_mismatch() {
        let parsed = parse_table("Date,Action\n06/15/2024,Dividend\n", 0);
        assert!(parsed.is_ok());
        if let Ok((table, _issues)) = parsed {
            let normalized = normalize_source(SourceKind::EacTransactions, &table, "USD");
            assert!(normalized.is_err());
            if let Err(mismatch) = normalized {
                assert_eq!(mismatch.missing_headers, vec!["Symbol", "Amount"]);
            }
        }
    }
}
