use std::io;
use std::str::FromStr;

use brokerage_reports_client::pipeline::values::format_amount;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use super::format::{self, Align, Column};

const MAX_ISSUES_SHOWN: usize = 20;

pub fn render_run(data: &Value) -> io::Result<String> {
    let dry_run = data
        .get("dry_run")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let summary = data
        .get("summary")
        .and_then(Value::as_object)
        .ok_or_else(|| io::Error::other("run output requires summary"))?;

    let mut lines = vec![value_str(data, "message").to_string()];
    lines.push(String::new());
    lines.push("Summary:".to_string());
    lines.extend(format::key_value_rows(
        &[
            ("Rows read:", get_i64(summary, "rows_read").to_string()),
            ("Rows normalized:", get_i64(summary, "rows_normalized").to_string()),
            ("Rows skipped:", get_i64(summary, "rows_skipped").to_string()),
            ("Rows invalid:", get_i64(summary, "rows_invalid").to_string()),
            ("Split-adjusted:", get_i64(summary, "split_adjusted").to_string()),
        ],
        2,
    ));

    lines.push(String::new());
    lines.push("Sources:".to_string());
    lines.extend(render_sources(data));

    lines.push(String::new());
    lines.push("Reports:".to_string());
    lines.extend(render_buckets(data));

    let issues = render_issues(data);
    if !issues.is_empty() {
        lines.push(String::new());
        lines.extend(issues);
    }

    lines.push(String::new());
    if dry_run {
        lines.push("No reports were written because this was a dry run.".to_string());
        lines.push("Run `brokerage-reports run` without --dry-run to write them.".to_string());
    } else {
        lines.push("Files written:".to_string());
        let files = data
            .get("files_written")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        lines.extend(
            files
                .iter()
                .filter_map(Value::as_str)
                .map(|path| format!("  {path}")),
        );
    }

    Ok(lines.join("\n"))
}

fn render_sources(data: &Value) -> Vec<String> {
    let sources = data
        .get("sources")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let columns = [
        Column {
            name: "Source",
            align: Align::Left,
        },
        Column {
            name: "Status",
            align: Align::Left,
        },
        Column {
            name: "Rows",
            align: Align::Right,
        },
        Column {
            name: "Invalid",
            align: Align::Right,
        },
        Column {
            name: "Path",
            align: Align::Left,
        },
    ];
    let rows = sources
        .iter()
        .map(|source| {
            vec![
                value_str(source, "source").to_string(),
                value_str(source, "status").to_string(),
                value_i64(source, "rows_read").to_string(),
                value_i64(source, "rows_invalid").to_string(),
                value_str(source, "path").to_string(),
            ]
        })
        .collect::<Vec<_>>();

    let mut lines = format::render_table(&columns, &rows);
    for source in &sources {
        if let Some(detail) = source.get("detail").and_then(Value::as_str) {
            lines.push(format!("  {}: {detail}", value_str(source, "source")));
        }
    }
    lines
}

fn render_buckets(data: &Value) -> Vec<String> {
    let buckets = data
        .get("buckets")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let columns = [
        Column {
            name: "Category",
            align: Align::Left,
        },
        Column {
            name: "Rows",
            align: Align::Right,
        },
        Column {
            name: "Total",
            align: Align::Right,
        },
        Column {
            name: "File",
            align: Align::Left,
        },
    ];
    let rows = buckets
        .iter()
        .map(|bucket| {
            let total = bucket
                .get("total")
                .and_then(Value::as_str)
                .and_then(|value| Decimal::from_str(value).ok())
                .map(format_amount)
                .unwrap_or_else(|| "n/a".to_string());
            vec![
                value_str(bucket, "category").to_string(),
                value_i64(bucket, "rows").to_string(),
                total,
                bucket
                    .get("file")
                    .and_then(Value::as_str)
                    .unwrap_or("(not written)")
                    .to_string(),
            ]
        })
        .collect::<Vec<_>>();

    format::render_table(&columns, &rows)
}

fn render_issues(data: &Value) -> Vec<String> {
    let sources = data
        .get("sources")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let mut issue_lines = Vec::new();
    let mut total = 0usize;
    for source in &sources {
        let name = value_str(source, "source");
        let issues = source
            .get("issues")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        for issue in &issues {
            total += 1;
            if issue_lines.len() < MAX_ISSUES_SHOWN {
                issue_lines.push(format!(
                    "  {name} row {} ({}): {}",
                    value_i64(issue, "row"),
                    value_str(issue, "code"),
                    value_str(issue, "description"),
                ));
            }
        }
    }

    if total == 0 {
        return Vec::new();
    }

    let mut lines = vec![format!(
        "{} left out of the reports:",
        format::plural(total as i64, "row issue", "row issues")
    )];
    lines.extend(issue_lines);
    if total > MAX_ISSUES_SHOWN {
        lines.push(format!(
            "  ... {} more. Use --json to see every issue.",
            total - MAX_ISSUES_SHOWN
        ));
    }
    lines
}

fn get_i64(map: &Map<String, Value>, key: &str) -> i64 {
    map.get(key).and_then(Value::as_i64).unwrap_or(0)
}

fn value_i64(value: &Value, key: &str) -> i64 {
    value.get(key).and_then(Value::as_i64).unwrap_or(0)
}

fn value_str<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or("")
}
