//! YAML run configuration: tax year, stock splits, input/output directories
//! and the per-year file name patterns of the three brokerage exports.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ClientError, ClientResult};

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";
pub const DEFAULT_CURRENCY: &str = "USD";
const DEFAULT_TRANSACTIONS_DIR: &str = "transactions";
const DEFAULT_REPORTS_DIR: &str = "reports";
const DEFAULT_EAC_PATTERN: &str = "EAC_transactions_{year}.csv";
const DEFAULT_INDIVIDUAL_PATTERN: &str = "Individual_transactions_{year}.csv";
const DEFAULT_REALIZED_GAINS_PATTERN: &str = "Individual_realized_gains_{year}.csv";
const YEAR_PLACEHOLDER: &str = "{year}";

/// The three exports a brokerage account produces per tax year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    EacTransactions,
    IndividualTransactions,
    IndividualRealizedGains,
}

impl SourceKind {
    pub const ALL: [Self; 3] = [
        Self::EacTransactions,
        Self::IndividualTransactions,
        Self::IndividualRealizedGains,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EacTransactions => "eac_transactions",
            Self::IndividualTransactions => "individual_transactions",
            Self::IndividualRealizedGains => "individual_realized_gains",
        }
    }

    /// Realized-gains exports open with a title line above the header row.
    pub const fn leading_lines(self) -> usize {
        match self {
            Self::IndividualRealizedGains => 1,
            Self::EacTransactions | Self::IndividualTransactions => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitRule {
    pub date: NaiveDate,
    pub ratio: Decimal,
    /// Restricts the rule to one ticker; `None` applies it to every symbol.
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilePatterns {
    pub eac_transactions: String,
    pub individual_transactions: String,
    pub individual_realized_gains: String,
}

impl FilePatterns {
    pub fn pattern_for(&self, kind: SourceKind) -> &str {
        match kind {
            SourceKind::EacTransactions => &self.eac_transactions,
            SourceKind::IndividualTransactions => &self.individual_transactions,
            SourceKind::IndividualRealizedGains => &self.individual_realized_gains,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportConfig {
    pub config_path: PathBuf,
    pub year: i32,
    pub currency: String,
    pub stock_splits: Vec<SplitRule>,
    pub transactions_dir: PathBuf,
    pub reports_dir: PathBuf,
    pub file_patterns: FilePatterns,
}

/// Values supplied on the command line that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub year: Option<i32>,
    pub extra_splits: Vec<SplitRule>,
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    year: Option<i32>,
    currency: Option<String>,
    #[serde(default)]
    stock_splits: Vec<RawSplit>,
    #[serde(default)]
    directories: RawDirectories,
    #[serde(default)]
    file_patterns: RawFilePatterns,
}

#[derive(Debug, Deserialize)]
struct RawSplit {
    date: String,
    #[serde(with = "rust_decimal::serde::str")]
    ratio: Decimal,
    symbol: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawDirectories {
    transactions: Option<String>,
    reports: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawFilePatterns {
    eac_transactions: Option<String>,
    individual_transactions: Option<String>,
    individual_realized_gains: Option<String>,
}

pub fn load_config(path: &Path, overrides: ConfigOverrides) -> ClientResult<ReportConfig> {
    let body = fs::read_to_string(path).map_err(|error| {
        if error.kind() == ErrorKind::NotFound {
            ClientError::config_not_found(path)
        } else {
            ClientError::config_unreadable(path, &error.to_string())
        }
    })?;

    let raw = if body.trim().is_empty() {
        RawConfig::default()
    } else {
        serde_saphyr::from_str::<RawConfig>(&body)
            .map_err(|error| ClientError::config_invalid(path, &error.to_string()))?
    };

    resolve(path, raw, overrides)
}

fn resolve(path: &Path, raw: RawConfig, overrides: ConfigOverrides) -> ClientResult<ReportConfig> {
    let Some(year) = overrides.year.or(raw.year) else {
        return Err(ClientError::config_missing_year(path));
    };

    let mut stock_splits = raw
        .stock_splits
        .iter()
        .enumerate()
        .map(|(index, split)| parse_split(index, split))
        .collect::<ClientResult<Vec<SplitRule>>>()?;
    let configured = stock_splits.len();
    for (offset, rule) in overrides.extra_splits.into_iter().enumerate() {
        stock_splits.push(validate_split_rule(configured + offset, rule)?);
    }
    stock_splits.sort_by_key(|rule| rule.date);

    let currency = raw
        .currency
        .map(|value| value.trim().to_uppercase())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

    Ok(ReportConfig {
        config_path: path.to_path_buf(),
        year,
        currency,
        stock_splits,
        transactions_dir: PathBuf::from(
            raw.directories
                .transactions
                .unwrap_or_else(|| DEFAULT_TRANSACTIONS_DIR.to_string()),
        ),
        reports_dir: PathBuf::from(
            raw.directories
                .reports
                .unwrap_or_else(|| DEFAULT_REPORTS_DIR.to_string()),
        ),
        file_patterns: FilePatterns {
            eac_transactions: raw
                .file_patterns
                .eac_transactions
                .unwrap_or_else(|| DEFAULT_EAC_PATTERN.to_string()),
            individual_transactions: raw
                .file_patterns
                .individual_transactions
                .unwrap_or_else(|| DEFAULT_INDIVIDUAL_PATTERN.to_string()),
            individual_realized_gains: raw
                .file_patterns
                .individual_realized_gains
                .unwrap_or_else(|| DEFAULT_REALIZED_GAINS_PATTERN.to_string()),
        },
    })
}

fn parse_split(index: usize, raw: &RawSplit) -> ClientResult<SplitRule> {
    let date = NaiveDate::parse_from_str(raw.date.trim(), "%Y-%m-%d").map_err(|_| {
        ClientError::config_invalid_split(
            index,
            &format!("date must use YYYY-MM-DD; got \"{}\"", raw.date),
        )
    })?;
    let symbol = raw
        .symbol
        .as_deref()
        .map(|value| value.trim().to_uppercase())
        .filter(|value| !value.is_empty());
    validate_split_rule(
        index,
        SplitRule {
            date,
            ratio: raw.ratio,
            symbol,
        },
    )
}

pub fn validate_split_rule(index: usize, rule: SplitRule) -> ClientResult<SplitRule> {
    rule.validated()
        .map_err(|detail| ClientError::config_invalid_split(index, &detail))
}

impl SplitRule {
    /// Rejects zero and negative ratios.
    pub fn validated(self) -> Result<Self, String> {
        if self.ratio <= Decimal::ZERO {
            return Err(format!("ratio must be positive; got {}", self.ratio));
        }
        Ok(self)
    }
}

impl ReportConfig {
    pub fn input_path(&self, kind: SourceKind) -> PathBuf {
        let file_name = self
            .file_patterns
            .pattern_for(kind)
            .replace(YEAR_PLACEHOLDER, &self.year.to_string());
        self.transactions_dir.join(file_name)
    }

    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.reports_dir.join(file_name)
    }

    pub fn split_rules(&self) -> &[SplitRule] {
        &self.stock_splits
    }
}
