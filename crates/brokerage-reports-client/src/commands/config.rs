use std::path::Path;

use crate::ClientResult;
use crate::config::{ConfigOverrides, DEFAULT_CONFIG_PATH, SourceKind, load_config};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{ConfigShowData, InputFile, OutputFile};
use crate::pipeline::report::REPORT_LAYOUTS;

#[derive(Debug, Default)]
pub struct ConfigShowOptions<'a> {
    pub config_path: Option<&'a Path>,
    pub year: Option<i32>,
}

/// Resolves the configuration without reading any exports.
pub fn show(options: ConfigShowOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let config_path = options
        .config_path
        .unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
    let config = load_config(
        config_path,
        ConfigOverrides {
            year: options.year,
            extra_splits: Vec::new(),
        },
    )?;

    let inputs = SourceKind::ALL
        .iter()
        .map(|kind| {
            let path = config.input_path(*kind);
            InputFile {
                source: *kind,
                exists: path.is_file(),
                path: path.display().to_string(),
            }
        })
        .collect();

    let outputs = REPORT_LAYOUTS
        .iter()
        .map(|layout| OutputFile {
            category: layout.kind,
            path: config.output_path(layout.file_name).display().to_string(),
            columns: layout.headers(),
        })
        .collect();

    let data = ConfigShowData {
        config_path: config.config_path.display().to_string(),
        year: config.year,
        currency: config.currency.clone(),
        stock_splits: config.stock_splits.clone(),
        transactions_dir: config.transactions_dir.display().to_string(),
        reports_dir: config.reports_dir.display().to_string(),
        inputs,
        outputs,
    };

    success("config show", data)
}
