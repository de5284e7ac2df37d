use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::contracts::types::RowIssue;

const UTF8_BOM: char = '\u{feff}';

#[derive(Debug, Clone, Default)]
pub struct SourceTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// One data row; `row` is 1-based and counts data rows after the header.
#[derive(Debug, Clone)]
pub struct RawRow {
    pub row: i64,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone)]
pub enum SourceLoad {
    Loaded {
        table: SourceTable,
        issues: Vec<RowIssue>,
    },
    Missing,
    Unreadable(String),
}

pub fn read_table(path: &Path, leading_lines: usize) -> SourceLoad {
    let content = match fs::read_to_string(path) {
        Ok(value) => value,
        Err(error) if error.kind() == ErrorKind::NotFound => return SourceLoad::Missing,
        Err(error) => return SourceLoad::Unreadable(error.to_string()),
    };

    match parse_table(&content, leading_lines) {
        Ok((table, issues)) => SourceLoad::Loaded { table, issues },
        Err(detail) => SourceLoad::Unreadable(detail),
    }
}

pub(crate) fn parse_table(
    content: &str,
    leading_lines: usize,
) -> Result<(SourceTable, Vec<RowIssue>), String> {
    let body = skip_lines(content.trim_start_matches(UTF8_BOM), leading_lines);
    if body.trim().is_empty() {
        return Ok((SourceTable::default(), Vec::new()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|error| format!("CSV header row is missing or unreadable: {error}"))?
        .iter()
        .map(|value| value.trim_start_matches(UTF8_BOM).trim().to_string())
        .collect::<Vec<String>>();

    let mut rows = Vec::new();
    let mut issues = Vec::new();
    for (row_index, result_row) in reader.records().enumerate() {
        let row = (row_index as i64) + 1;
        let record = match result_row {
            Ok(value) => value,
            Err(error) => {
                issues.push(RowIssue {
                    row,
                    field: String::new(),
                    code: "malformed_row".to_string(),
                    description: format!("CSV row could not be parsed: {error}"),
                    received: None,
                });
                continue;
            }
        };

        let fields = record
            .iter()
            .map(std::string::ToString::to_string)
            .collect::<Vec<String>>();
        if fields.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        rows.push(RawRow { row, fields });
    }

    Ok((SourceTable { headers, rows }, issues))
}

fn skip_lines(content: &str, count: usize) -> &str {
    let mut remaining = content;
    for _ in 0..count {
        match remaining.find('\n') {
            Some(position) => remaining = &remaining[position + 1..],
            None => return "",
        }
    }
    remaining
}

/// Header name to column lookup for one table.
#[derive(Debug, Clone)]
pub(crate) struct Columns {
    index_by_name: HashMap<String, usize>,
}

impl Columns {
    pub(crate) fn new(headers: &[String]) -> Self {
        let mut index_by_name = HashMap::new();
        for (index, name) in headers.iter().enumerate() {
            index_by_name.entry(name.clone()).or_insert(index);
        }
        Self { index_by_name }
    }

    pub(crate) fn missing<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        required
            .iter()
            .filter(|name| !self.index_by_name.contains_key(**name))
            .copied()
            .collect()
    }

    /// Trimmed cell text, or `None` when the column is absent or the cell blank.
    pub(crate) fn text<'r>(&self, row: &'r RawRow, name: &str) -> Option<&'r str> {
        let index = self.index_by_name.get(name)?;
        let value = row.fields.get(*index)?.trim();
        if value.is_empty() {
            return None;
        }
        Some(value)
    }
}
