/// Runs the tidal aquifer analysis once over the configured dataset.
///
/// Usage: `tidemon_analysis [config.toml]`. Without an argument the built-in
/// defaults are used.

use std::path::PathBuf;
use std::process::ExitCode;

use tidemon_analysis::config::{AnalysisConfig, load_config};
use tidemon_analysis::logging::{self, Stage, init_logger};
use tidemon_analysis::model::AnalysisError;
use tidemon_analysis::pipeline;
use tidemon_analysis::report::{plots, tables};

fn main() -> ExitCode {
    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => match load_config(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => AnalysisConfig::default(),
    };

    let log = &config.logging;
    init_logger(log.level, log.file.as_deref(), log.console_timestamps);

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logging::error(Stage::System, None, &format!("analysis aborted: {}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(config: &AnalysisConfig) -> Result<(), AnalysisError> {
    let report = pipeline::run(config)?;

    println!("{}", tables::format_tables(&report));

    let summary = tables::write_summary_json(&report, &config.output.directory)?;
    logging::info(Stage::System, None, &format!("summary written to {}", summary.display()));

    if config.output.render_plots {
        plots::render_all(&report, &config.output, config.analysis.period_band_minutes)?;
    }
    Ok(())
}
