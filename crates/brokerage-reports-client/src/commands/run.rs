use std::path::Path;

use crate::ClientResult;
use crate::config::{ConfigOverrides, DEFAULT_CONFIG_PATH, SplitRule, load_config};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::RunData;
use crate::pipeline::{self, RunOptions};

#[derive(Debug, Default)]
pub struct RunCommandOptions<'a> {
    pub config_path: Option<&'a Path>,
    pub year: Option<i32>,
    pub extra_splits: Vec<SplitRule>,
    pub dry_run: bool,
}

pub fn run_with_options(options: RunCommandOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let config_path = options
        .config_path
        .unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
    let config = load_config(
        config_path,
        ConfigOverrides {
            year: options.year,
            extra_splits: options.extra_splits,
        },
    )?;

    let outcome = pipeline::execute(
        &config,
        RunOptions {
            dry_run: options.dry_run,
        },
    )?;

    let reports_dir = config.reports_dir.display().to_string();
    let message = if options.dry_run {
        format!(
            "Dry run complete for {}. No reports were written.",
            config.year
        )
    } else {
        format!(
            "Wrote {} reports for {} to {reports_dir}.",
            outcome.files_written.len(),
            config.year
        )
    };

    let data = RunData {
        dry_run: options.dry_run,
        year: config.year,
        config_path: config.config_path.display().to_string(),
        reports_dir,
        message,
        summary: outcome.summary,
        sources: outcome.sources,
        buckets: outcome.buckets,
        files_written: outcome.files_written,
    };

    success("run", data)
}
