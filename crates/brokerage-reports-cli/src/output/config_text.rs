use std::io;

use serde_json::Value;

use super::format::{self, Align, Column};

pub fn render_config_show(data: &Value) -> io::Result<String> {
    let year = data
        .get("year")
        .and_then(Value::as_i64)
        .ok_or_else(|| io::Error::other("config show output requires year"))?;

    let mut lines = vec![format!("Configuration for tax year {year}.")];
    lines.push(String::new());
    lines.extend(format::key_value_rows(
        &[
            ("Config file:", text(data, "config_path")),
            ("Currency:", text(data, "currency")),
            ("Transactions:", text(data, "transactions_dir")),
            ("Reports:", text(data, "reports_dir")),
        ],
        2,
    ));

    lines.push(String::new());
    lines.push("Stock splits:".to_string());
    let splits = array(data, "stock_splits");
    if splits.is_empty() {
        lines.push("  (none)".to_string());
    } else {
        let columns = [
            Column {
                name: "Date",
                align: Align::Left,
            },
            Column {
                name: "Ratio",
                align: Align::Right,
            },
            Column {
                name: "Symbol",
                align: Align::Left,
            },
        ];
        let rows = splits
            .iter()
            .map(|split| {
                vec![
                    text(split, "date"),
                    text(split, "ratio"),
                    split
                        .get("symbol")
                        .and_then(Value::as_str)
                        .unwrap_or("all symbols")
                        .to_string(),
                ]
            })
            .collect::<Vec<_>>();
        lines.extend(format::render_table(&columns, &rows));
    }

    lines.push(String::new());
    lines.push("Inputs:".to_string());
    for input in array(data, "inputs") {
        let marker = if input.get("exists").and_then(Value::as_bool) == Some(true) {
            "found"
        } else {
            "missing"
        };
        lines.push(format!("  [{marker:<7}] {}", text(&input, "path")));
    }

    lines.push(String::new());
    lines.push("Outputs:".to_string());
    for output in array(data, "outputs") {
        let columns = array(&output, "columns")
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("  {}", text(&output, "path")));
        lines.push(format!("    {columns}"));
    }

    Ok(lines.join("\n"))
}

fn text(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}

fn array(value: &Value, key: &str) -> Vec<Value> {
    value
        .get(key)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}
