use brokerage_reports_client::commands;
use brokerage_reports_client::commands::config::ConfigShowOptions;
use brokerage_reports_client::commands::run::RunCommandOptions;
use brokerage_reports_client::{ClientResult, SuccessEnvelope};

use crate::cli::{Cli, Commands, ConfigCommand};

pub fn dispatch(cli: &Cli) -> ClientResult<SuccessEnvelope> {
    match &cli.command {
        Commands::Run {
            config,
            year,
            splits,
            dry_run,
            json: _,
        } => commands::run::run_with_options(RunCommandOptions {
            config_path: config.as_deref(),
            year: *year,
            extra_splits: splits.clone(),
            dry_run: *dry_run,
        }),
        Commands::Config { command } => match command {
            ConfigCommand::Show { config, year, .. } => {
                commands::config::show(ConfigShowOptions {
                    config_path: config.as_deref(),
                    year: *year,
                })
            }
        },
    }
}
