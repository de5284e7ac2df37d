use std::io;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Maps `-v` occurrences to a default filter. `RUST_LOG` overrides it.
pub fn default_filter(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    format!("brokerage_reports_client={level},brokerage_reports={level}")
}

/// Installs the stderr subscriber so stdout carries only command output.
pub fn init(verbosity: u8) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(false)
                .with_target(false)
                .without_time(),
        )
        .try_init();
    if let Err(error) = installed {
        eprintln!("Warning: failed to initialize logging: {error}");
    }
}
