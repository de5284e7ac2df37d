use brokerage_reports_client::ClientError;
use serde_json::Value;

use crate::terminal::is_internal_error;

/// `data` keys echoed under Details, with their labels.
const CONTEXT_FIELDS: [(&str, &str); 3] = [
    ("config_path", "Config:"),
    ("report_path", "Report:"),
    ("split_index", "Split:"),
];

pub fn render_error(error: &ClientError) -> String {
    let headline = if is_internal_error(error) {
        "brokerage-reports could not finish the run."
    } else {
        "Something went wrong, but it's easy to fix."
    };
    let mut lines = vec![
        headline.to_string(),
        String::new(),
        format!("  Error:    {}", error.code),
        format!("  Details:  {}", error.message),
    ];
    lines.extend(context_lines(error.data.as_ref()));
    lines.push(String::new());
    lines.push("What to do next:".to_string());

    if error.recovery_steps.is_empty() {
        lines.push("  1. Re-run with -v to see what the run was doing.".to_string());
    } else {
        for (index, step) in error.recovery_steps.iter().enumerate() {
            lines.push(format!("  {}. {step}", index + 1));
        }
    }

    lines.join("\n")
}

fn context_lines(data: Option<&Value>) -> Vec<String> {
    let Some(data) = data else {
        return Vec::new();
    };
    CONTEXT_FIELDS
        .iter()
        .filter_map(|(key, label)| {
            let shown = match data.get(*key)? {
                Value::String(text) => text.clone(),
                // Split indexes are zero-based; config files count from one.
                Value::Number(number) => number
                    .as_u64()
                    .map(|index| format!("#{}", index + 1))
                    .unwrap_or_else(|| number.to_string()),
                _ => return None,
            };
            Some(format!("  {label:<9} {shown}"))
        })
        .collect()
}
