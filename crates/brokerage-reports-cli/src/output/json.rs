use std::io;

use brokerage_reports_client::{ClientError, SuccessEnvelope};
use serde::Serialize;
use serde_json::{Value, json};

const JSON_VERSION: &str = "v1";

pub fn render_success_json(success: &SuccessEnvelope) -> io::Result<String> {
    let value = match success.command.as_str() {
        "run" => render_run_json(&success.data),
        "config show" => render_envelope(&success.data),
        _ => {
            return Err(io::Error::other(format!(
                "JSON output is not supported for command `{}`",
                success.command
            )));
        }
    };

    serialize_json_pretty(&value)
}

pub fn render_error_json(error: &ClientError) -> io::Result<String> {
    let payload = json!({
        "error": {
            "code": error.code,
            "message": error.message,
            "recovery_steps": error.recovery_steps,
        }
    });
    serialize_json_pretty(&payload)
}

fn render_envelope(data: &Value) -> Value {
    json!({
        "ok": true,
        "version": JSON_VERSION,
        "data": data.clone()
    })
}

/// Sources with no rows and no issues drop their empty `issues` array.
fn render_run_json(data: &Value) -> Value {
    let mut data = data.clone();
    if let Some(sources) = data.get_mut("sources").and_then(Value::as_array_mut) {
        for source in sources {
            let no_issues = source
                .get("issues")
                .and_then(Value::as_array)
                .is_some_and(Vec::is_empty);
            if no_issues {
                if let Some(fields) = source.as_object_mut() {
                    fields.remove("issues");
                }
            }
        }
    }
    render_envelope(&data)
}

fn serialize_json_pretty<T>(value: &T) -> io::Result<String>
where
    T: Serialize,
{
    serde_json::to_string_pretty(value).map_err(io::Error::other)
}
