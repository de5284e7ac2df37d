mod cli;
mod dispatch;
mod logging;
mod output;
mod terminal;

use std::process::ExitCode;

use brokerage_reports_client::ClientError;
use clap::{Parser, error::ErrorKind};

const ROOT_HELP: &str = "brokerage-reports - brokerage export to tax report builder

Usage:
  brokerage-reports <command>

Start here:
  brokerage-reports config show
  brokerage-reports run --help
";

const TOP_LEVEL_HELP: &str = "brokerage-reports - brokerage export to tax report builder

USAGE: brokerage-reports <command>

Build reports for a tax year:
  1. brokerage-reports config show                        Check which exports will be read
  2. brokerage-reports run --dry-run                      Validate the exports without writing
  3. brokerage-reports run                                Write dividend, interest, tax and sale reports

Options for run:
  --config <path>                                         Config file (default: config.yaml)
  --year <YYYY>                                           Override the configured tax year
  --split <YYYY-MM-DD:RATIO[:SYMBOL]>                     Add a stock split (repeatable)
  --json                                                  Machine-readable output

Logging goes to stderr. Use -v or -vv for more detail, or set RUST_LOG.
Run `brokerage-reports <command> --help` for command usage.
";

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(code) => code,
    }
}

fn run() -> Result<ExitCode, ExitCode> {
    let raw_args = std::env::args().collect::<Vec<String>>();
    if raw_args.len() == 1 {
        if terminal::print_raw(ROOT_HELP).is_err() {
            return Err(terminal::output_failed());
        }
        return Ok(ExitCode::SUCCESS);
    }
    let parsed = cli::Cli::try_parse();
    let cli = match parsed {
        Ok(value) => value,
        Err(err) => {
            if matches!(
                err.kind(),
                ErrorKind::DisplayHelp
                    | ErrorKind::DisplayVersion
                    | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) {
                let text = if is_top_level_help_request(&raw_args) {
                    TOP_LEVEL_HELP.to_string()
                } else {
                    err.to_string()
                };
                if terminal::print_raw(&text).is_err() {
                    return Err(terminal::output_failed());
                }
                return Ok(ExitCode::SUCCESS);
            }
            let command_hint = if matches!(
                err.kind(),
                ErrorKind::MissingRequiredArgument
                    | ErrorKind::InvalidValue
                    | ErrorKind::ValueValidation
                    | ErrorKind::WrongNumberOfValues
                    | ErrorKind::UnknownArgument
                    | ErrorKind::InvalidSubcommand
            ) {
                command_path_from_args(&raw_args)
            } else {
                None
            };
            let clean_message = strip_clap_boilerplate(&err.to_string());
            let parse_error =
                ClientError::invalid_argument_for_command(&clean_message, command_hint.as_deref());
            let mode = infer_requested_output_mode(&raw_args);
            if output::print_failure(&parse_error, mode).is_err() {
                return Err(terminal::output_failed());
            }
            return Err(terminal::usage_error());
        }
    };

    logging::init(cli.verbose);
    let mode = output::mode_for_command(&cli.command);

    let dispatched = dispatch::dispatch(&cli);
    match dispatched {
        Ok(success) => {
            if output::print_success(&success, mode).is_err() {
                return Err(terminal::output_failed());
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            tracing::debug!(code = %error.code, "command failed");
            if output::print_failure(&error, mode).is_err() {
                return Err(terminal::output_failed());
            }
            Err(terminal::exit_code_for_error(&error))
        }
    }
}

fn is_top_level_help_request(raw_args: &[String]) -> bool {
    raw_args.len() == 2 && matches!(raw_args[1].as_str(), "--help" | "-h")
}

/// Strips clap's trailing boilerplate (Usage line, "For more information" hint)
/// so the "What to do next" section is the single source of guidance.
fn strip_clap_boilerplate(message: &str) -> String {
    let trimmed = if let Some(pos) = message.find("\n\nUsage:") {
        &message[..pos]
    } else if let Some(pos) = message.find("\nFor more information") {
        &message[..pos]
    } else {
        message
    };
    trimmed.trim_end().to_string()
}

/// Picks the subcommand path out of raw args for help hints, e.g. "config show".
fn command_path_from_args(raw_args: &[String]) -> Option<String> {
    let non_flags: Vec<&str> = raw_args
        .iter()
        .skip(1)
        .filter(|value| !value.starts_with('-'))
        .map(String::as_str)
        .collect();

    let hint = match non_flags.as_slice() {
        ["run", ..] => Some("run"),
        ["config", "show", ..] => Some("config show"),
        ["config", ..] => Some("config"),
        _ => None,
    };
    hint.map(std::string::ToString::to_string)
}

fn infer_requested_output_mode(raw_args: &[String]) -> output::OutputMode {
    if raw_args.iter().skip(1).any(|value| value == "--json") {
        return output::OutputMode::Json;
    }
    output::OutputMode::Text
}
