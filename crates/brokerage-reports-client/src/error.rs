use std::path::Path;

use serde_json::{Value, json};
use thiserror::Error;

pub(crate) const CONFIG_HELP_COMMAND: &str = "brokerage-reports config show";

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ClientError {
    pub code: String,
    pub message: String,
    pub recovery_steps: Vec<String>,
    pub data: Option<Value>,
}

impl ClientError {
    pub fn new(code: &str, message: &str, recovery_steps: Vec<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            recovery_steps,
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn invalid_argument(message: &str) -> Self {
        Self::invalid_argument_for_command(message, None)
    }

    pub fn invalid_argument_for_command(message: &str, command: Option<&str>) -> Self {
        let help_hint = match command {
            Some(cmd) => format!("Run `brokerage-reports {cmd} --help` for usage."),
            None => "Run `brokerage-reports --help` for usage.".to_string(),
        };
        let error = Self::new("invalid_argument", message, vec![help_hint]);
        if let Some(cmd) = command {
            return error.with_data(json!({
                "command_hint": cmd,
            }));
        }
        error
    }

    pub fn invalid_argument_with_recovery(message: &str, recovery_steps: Vec<String>) -> Self {
        Self::new("invalid_argument", message, recovery_steps)
    }

    pub fn config_not_found(path: &Path) -> Self {
        let location = path.display().to_string();
        Self::new(
            "config_not_found",
            &format!("Config file `{location}` was not found."),
            vec![
                "Create a YAML config with at least a `year` entry.".to_string(),
                "Or pass an explicit path with `--config <path>`.".to_string(),
            ],
        )
        .with_data(json!({
            "config_path": location,
        }))
    }

    pub fn config_unreadable(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "config_invalid",
            &format!("Could not read config file `{location}`: {detail}"),
            vec![format!("Verify `{location}` is a readable file.")],
        )
        .with_data(json!({
            "config_path": location,
        }))
    }

    pub fn config_invalid(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "config_invalid",
            &format!("Config file `{location}` is not valid YAML for this tool: {detail}"),
            vec![
                "Fix the YAML syntax or field types reported above.".to_string(),
                format!("Run `{CONFIG_HELP_COMMAND}` to confirm the resolved settings."),
            ],
        )
        .with_data(json!({
            "config_path": location,
        }))
    }

    pub fn config_missing_year(path: &Path) -> Self {
        let location = path.display().to_string();
        Self::new(
            "config_missing_year",
            &format!("Config file `{location}` does not set a `year`."),
            vec![
                "Add `year: <YYYY>` to the config file.".to_string(),
                "Or pass `--year <YYYY>` on the command line.".to_string(),
            ],
        )
        .with_data(json!({
            "config_path": location,
        }))
    }

    pub fn config_invalid_split(index: usize, detail: &str) -> Self {
        Self::new(
            "config_invalid_split",
            &format!("Stock split #{} is invalid: {detail}", index + 1),
            vec![
                "Use `date: YYYY-MM-DD` and a positive `ratio` for every split.".to_string(),
                "A 10-for-1 forward split has `ratio: 10`; a 1-for-2 reverse split has `ratio: 0.5`."
                    .to_string(),
            ],
        )
        .with_data(json!({
            "split_index": index,
        }))
    }

    pub fn report_write_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "report_write_failed",
            &format!("Could not write report `{location}`: {detail}"),
            vec![
                format!("Grant write access to `{location}` or point `directories.reports` elsewhere."),
                "Rerun the command once the directory is writable.".to_string(),
            ],
        )
        .with_data(json!({
            "report_path": location,
        }))
    }

    pub fn internal_serialization(message: &str) -> Self {
        Self::new("internal_serialization_error", message, Vec::new())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
