//! Main application entry point and high-level flow coordination.
//!
//! This module dispatches the parsed command line:
//!
//! - `args`: Command-line argument parsing and help/version display
//! - `config`: Configuration directory selection (`--config`)
//! - `commands`: One-shot commands (`status`, `next`, `help`) and simulation setup
//! - `Adhanr`: The long-running scheduler with lock, signals and hot reload
//!
//! Errors are reported through the logger and turn into a non-zero exit code.

use anyhow::Result;

use adhanr::Adhanr;
use adhanr::args::{self, CliAction, ParsedArgs};
use adhanr::commands;
use adhanr::common::constants::{EXIT_FAILURE, EXIT_SUCCESS};
use adhanr::common::logger::Log;
use adhanr::config;
use adhanr::{log_end, log_error_exit};

fn main() {
    let parsed_args = ParsedArgs::from_env();

    let code = match dispatch(parsed_args.action) {
        Ok(code) => code,
        Err(e) => {
            // JSON consumers still need to see why we failed
            Log::set_enabled(true);
            log_error_exit!("{e:#}");
            EXIT_FAILURE
        }
    };

    std::process::exit(code);
}

fn dispatch(action: CliAction) -> Result<i32> {
    match action {
        CliAction::ShowVersion => {
            args::display_version_info();
        }
        CliAction::ShowHelp => {
            args::display_help();
        }
        CliAction::ShowHelpDueToError => {
            args::display_help();
            return Ok(EXIT_FAILURE);
        }
        CliAction::Help { command } => {
            commands::help::run_help_command(command.as_deref());
        }
        CliAction::Run {
            debug_enabled,
            config_dir,
            json,
        } => {
            config::set_config_dir(config_dir)?;
            let runner = Adhanr::new(debug_enabled);
            if json {
                // stdout carries only JSON lines
                Log::set_enabled(false);
                runner.with_json_events().run()?;
            } else {
                runner.run()?;
            }
        }
        CliAction::Status {
            debug_enabled: _,
            config_dir,
            json,
        } => {
            config::set_config_dir(config_dir)?;
            // Keep default-config creation notices out of the output
            Log::set_enabled(false);
            commands::status::handle_status_command(json)?;
        }
        CliAction::Next {
            debug_enabled: _,
            config_dir,
            json,
        } => {
            config::set_config_dir(config_dir)?;
            Log::set_enabled(false);
            commands::next::handle_next_command(json)?;
        }
        CliAction::Simulate {
            debug_enabled,
            start_time,
            end_time,
            multiplier,
            log_to_file,
            config_dir,
            json,
        } => {
            config::set_config_dir(config_dir)?;

            // Keep the guard alive for the duration of the simulation
            let _log_guard = commands::simulate::handle_simulate_command(
                &start_time,
                &end_time,
                multiplier,
                debug_enabled,
                log_to_file,
            )?;

            let runner = Adhanr::new(debug_enabled)
                .without_lock() // Don't interfere with real instances
                .without_headers(); // Headers already shown by simulate command

            if json {
                Log::set_enabled(false);
                runner.with_json_events().run()?;
            } else {
                runner.run()?;
                log_end!();
            }
        }
    }

    Ok(EXIT_SUCCESS)
}
