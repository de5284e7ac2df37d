//! Process edge: stdout writes that survive a reader closing the pipe early
//! (`brokerage-reports run | head`), and the exit code each outcome maps to.

use std::io::{self, Write};
use std::process::ExitCode;

use brokerage_reports_client::ClientError;

const EXIT_USER_ERROR: u8 = 1;
const EXIT_INTERNAL_ERROR: u8 = 2;

/// Prints a rendered block followed by a newline.
pub fn print_block(text: &str) -> io::Result<()> {
    write_stdout(text, true)
}

/// Prints text that already ends the way it should (help screens).
pub fn print_raw(text: &str) -> io::Result<()> {
    write_stdout(text, false)
}

fn write_stdout(text: &str, trailing_newline: bool) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    ignore_closed_pipe(stdout.write_all(text.as_bytes()))?;
    if trailing_newline {
        ignore_closed_pipe(stdout.write_all(b"\n"))?;
    }
    ignore_closed_pipe(stdout.flush())
}

fn ignore_closed_pipe(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(error) if error.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

/// Failures the user cannot fix by editing config or exports.
pub fn is_internal_error(error: &ClientError) -> bool {
    error.code.starts_with("internal_") || error.code == "report_write_failed"
}

pub fn exit_code_for_error(error: &ClientError) -> ExitCode {
    if is_internal_error(error) {
        ExitCode::from(EXIT_INTERNAL_ERROR)
    } else {
        ExitCode::from(EXIT_USER_ERROR)
    }
}

pub fn usage_error() -> ExitCode {
    ExitCode::from(EXIT_USER_ERROR)
}

/// Stdout itself failed, so nothing more can be reported.
pub fn output_failed() -> ExitCode {
    ExitCode::from(EXIT_INTERNAL_ERROR)
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::Path;

    use brokerage_reports_client::ClientError;

    use super::{ignore_closed_pipe, is_internal_error};

    #[test]
    fn closed_pipe_is_not_an_output_failure() {
        let closed = ignore_closed_pipe(Err(io::Error::from(io::ErrorKind::BrokenPipe)));
        assert!(closed.is_ok());

        let denied = ignore_closed_pipe(Err(io::Error::from(io::ErrorKind::PermissionDenied)));
        assert!(denied.is_err());
        if let Err(error) = denied {
            assert_eq!(error.kind(), io::ErrorKind::PermissionDenied);
        }
    }

    #[test]
    fn write_failures_and_serialization_are_internal() {
        assert!(is_internal_error(&ClientError::internal_serialization("boom")));
        assert!(is_internal_error(&ClientError::report_write_failed(
            Path::new("reports/x.csv"),
            "denied"
        )));
        assert!(!is_internal_error(&ClientError::invalid_argument("bad")));
        assert!(!is_internal_error(&ClientError::config_not_found(Path::new(
            "config.yaml"
        ))));
    }
}
