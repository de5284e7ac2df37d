use std::path::PathBuf;
use std::str::FromStr;

use brokerage_reports_client::config::SplitRule;
use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use rust_decimal::Decimal;

pub fn parse_iso_date(value: &str) -> Result<NaiveDate, String> {
    if value.len() != 10 {
        return Err("date must use YYYY-MM-DD format".to_string());
    }

    let bytes = value.as_bytes();
    if bytes[4] != b'-' || bytes[7] != b'-' {
        return Err("date must use YYYY-MM-DD format".to_string());
    }

    for index in [0usize, 1, 2, 3, 5, 6, 8, 9] {
        if !bytes[index].is_ascii_digit() {
            return Err("date must use YYYY-MM-DD format".to_string());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| "date must use valid calendar values".to_string())
}

pub fn parse_year(value: &str) -> Result<i32, String> {
    let year = value
        .parse::<i32>()
        .map_err(|_| "year must be a four-digit number such as 2024".to_string())?;
    if !(1900..=9999).contains(&year) {
        return Err("year must be between 1900 and 9999".to_string());
    }
    Ok(year)
}

/// Parses `DATE:RATIO[:SYMBOL]`, e.g. `2024-06-10:10` or `2024-06-10:10:NVDA`.
pub fn parse_split(value: &str) -> Result<SplitRule, String> {
    let mut parts = value.split(':');
    let (Some(date), Some(ratio)) = (parts.next(), parts.next()) else {
        return Err("split must look like YYYY-MM-DD:RATIO or YYYY-MM-DD:RATIO:SYMBOL".to_string());
    };
    let symbol = parts.next().map(str::trim).filter(|value| !value.is_empty());
    if parts.next().is_some() {
        return Err("split must look like YYYY-MM-DD:RATIO or YYYY-MM-DD:RATIO:SYMBOL".to_string());
    }

    let date = parse_iso_date(date.trim())?;
    let ratio = Decimal::from_str(ratio.trim())
        .map_err(|_| format!("split ratio `{ratio}` is not a number"))?;

    SplitRule {
        date,
        ratio,
        symbol: symbol.map(str::to_uppercase),
    }
    .validated()
    .map_err(|detail| format!("split {detail}"))
}

/// Extended help shown after `brokerage-reports run --help`.
pub const RUN_AFTER_HELP: &str = "\
How a run works:
  1. Reads the year, stock splits and directories from the config file.
  2. Loads up to three exports from the transactions directory:
       EAC_transactions_{year}.csv
       Individual_transactions_{year}.csv
       Individual_realized_gains_{year}.csv
     A missing export is skipped with a warning.
  3. Restates share quantities dated before each split in post-split units.
  4. Writes four reports to the reports directory:
       dividend_transactions.csv      Date, Action, Symbol, Amount
       interest_transactions.csv      Date, Action, Amount
       tax_deducted_transactions.csv  Date, Symbol, Amount
       sale_transactions.csv          Date, Symbol, Quantity, Amount, Cost Basis, PurchaseDate

Config example (config.yaml):
  year: 2024
  stock_splits:
    - date: \"2024-06-10\"
      ratio: 10
      symbol: NVDA
  directories:
    transactions: transactions
    reports: reports

What to do next:
  1. Run `brokerage-reports config show` to confirm which files will be read.
  2. Run `brokerage-reports run --dry-run` and fix any reported row issues.
  3. Run `brokerage-reports run` to write the reports.
";

#[derive(Debug, Parser)]
#[command(
    name = "brokerage-reports",
    version,
    about = "brokerage export to tax report builder",
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Log progress to stderr (-v for info, -vv for debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build the dividend, interest, tax and sale reports.
    #[command(after_long_help = RUN_AFTER_HELP)]
    Run {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, value_parser = parse_year)]
        year: Option<i32>,
        /// Extra stock split, DATE:RATIO[:SYMBOL]. Repeatable.
        #[arg(long = "split", value_parser = parse_split)]
        splits: Vec<SplitRule>,
        #[arg(long)]
        dry_run: bool,
        #[arg(long)]
        json: bool,
    },
    #[command(arg_required_else_help = true)]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum ConfigCommand {
    /// Show resolved input and output paths without reading any export.
    Show {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, value_parser = parse_year)]
        year: Option<i32>,
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
pub fn parse_from<I, T>(itr: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(itr)
}
