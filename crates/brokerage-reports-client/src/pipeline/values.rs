use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

const SOURCE_DATE_FORMAT: &str = "%m/%d/%Y";
const REPORT_DATE_FORMAT: &str = "%Y/%m/%d";

/// Parses brokerage money text such as `$1,234.56`, `($75.00)` or `-$5.00`.
///
/// Returns `None` for anything that is not a plain decimal once the currency
/// sign, thousands separators and negative markers are removed. Callers check
/// for blank cells before calling this.
pub fn parse_money(value: &str) -> Option<Decimal> {
    let mut body = value.trim();
    let mut negative = false;

    if let Some(inner) = body
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
    {
        negative = true;
        body = inner.trim();
    }
    if let Some(rest) = body.strip_prefix('-') {
        negative = !negative;
        body = rest.trim_start();
    }
    if let Some(rest) = body.strip_prefix('$') {
        body = rest.trim_start();
    }
    if let Some(rest) = body.strip_prefix('-') {
        negative = !negative;
        body = rest;
    }

    let digits = body.replace(',', "");
    if digits.is_empty() || digits == "." {
        return None;
    }
    if !digits
        .chars()
        .all(|character| character.is_ascii_digit() || character == '.')
    {
        return None;
    }

    let parsed = Decimal::from_str(&digits).ok()?;
    if negative { Some(-parsed) } else { Some(parsed) }
}

/// Parses an export date. `MM/DD/YYYY as of MM/DD/YYYY` keeps the first date.
pub fn parse_source_date(value: &str) -> Option<NaiveDate> {
    let first = value.split_whitespace().next()?;
    NaiveDate::parse_from_str(first, SOURCE_DATE_FORMAT).ok()
}

pub fn format_report_date(date: NaiveDate) -> String {
    date.format(REPORT_DATE_FORMAT).to_string()
}

pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        return "0.00".to_string();
    }
    format!("{rounded:.2}")
}

pub fn format_quantity(quantity: Decimal) -> String {
    let normalized = quantity.normalize();
    if normalized.is_zero() {
        return "0".to_string();
    }
    normalized.to_string()
}
