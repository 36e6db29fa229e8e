//! pkgen CLI: generate files into Go packages from templates.
//!
//! Runs standalone against `./...`, or as a `//go:generate pkgen ...`
//! directive, in which case only the current package is generated.

mod cli;
mod commands;
mod logging;
mod output;

use std::process::ExitCode;

use pkgen_core::config::RunningMode;

#[tokio::main]
async fn main() -> ExitCode {
    let invocation = cli::parse_from(std::env::args_os()).unwrap_or_else(|e| e.exit());
    let log_filter = logging::init(invocation.cli.verbose);

    let mode = RunningMode::detect();
    let working_dir = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            output::print_error(&format!("cannot determine working directory: {e}"));
            return ExitCode::FAILURE;
        }
    };
    let config =
        match commands::generate::load_config(invocation.config_request(), &working_dir, mode) {
            Ok(config) => config,
            Err(e) => {
                output::print_error(&format!("{e:#}"));
                return ExitCode::FAILURE;
            }
        };
    if config.verbose() && !invocation.cli.verbose {
        logging::raise_to_debug(&log_filter);
    }

    match commands::generate::run(&config, mode).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            output::print_error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
