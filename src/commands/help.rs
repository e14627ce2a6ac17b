//! Help command implementation for adhanr.
//!
//! This module provides a dispatcher for the help command that shows
//! command-specific help or general help based on the arguments provided.

/// Run the help command (dispatcher)
///
/// # Arguments
/// * `command` - Optional command name to get help for (None = general help)
pub fn run_help_command(command: Option<&str>) {
    match command {
        None => crate::args::display_help(),
        Some("run") => display_run_help(),
        Some("status") | Some("s") => display_status_help(),
        Some("next") | Some("n") => display_next_help(),
        Some("simulate") | Some("S") => display_simulate_help(),
        Some("help") | Some("h") => display_help_help(),
        Some(unknown) => {
            log_warning_standalone!("Unknown command: {}", unknown);
            crate::args::display_help();
        }
    }
}

fn display_run_help() {
    log_version!();
    log_block_start!("run - Drive the display (default command)");
    log_block_start!("Usage: adhanr [run] [OPTIONS]");
    log_block_start!("Options:");
    log_indented!("-c, --config <dir>  Use custom configuration directory");
    log_indented!("-d, --debug         Log every scheduler wake-up");
    log_indented!("-j, --json          Print display events as JSON lines");
    log_block_start!("Signals:");
    log_indented!("SIGUSR2             Reload adhanr.toml");
    log_indented!("SIGINT, SIGTERM     Stop");
    log_end!();
}

fn display_status_help() {
    log_version!();
    log_block_start!("status - Show the current mode and countdowns");
    log_block_start!("Usage: adhanr status [--json]");
    log_block_start!("Output:");
    log_indented!("Mode, active prayer, next prayer and iqama countdowns,");
    log_indented!("the next mode change and whether a scheduler is running");
    log_end!();
}

fn display_next_help() {
    log_version!();
    log_block_start!("next - List today's remaining mode changes");
    log_block_start!("Usage: adhanr next [--json]");
    log_block_start!("Output:");
    log_indented!("One line per pre-prayer start, adhan start and post-prayer end");
    log_end!();
}

fn display_simulate_help() {
    log_version!();
    log_block_start!("simulate - Replay a time range with an accelerated clock");
    log_block_start!("Usage: adhanr simulate <start> <end> [multiplier | --fast-forward] [--log]");
    log_block_start!("Arguments:");
    log_indented!("start, end      \"YYYY-MM-DD HH:MM:SS\" in local time");
    log_indented!("multiplier      0.1 to 3600 (default 3600, one hour per second)");
    log_indented!("--fast-forward  Skip sleeping entirely");
    log_indented!("--log           Write the log to adhanr-simulation-<time>.log");
    log_block_start!("Examples:");
    log_indented!("adhanr simulate \"2026-10-18 04:00:00\" \"2026-10-18 21:00:00\"");
    log_indented!("adhanr simulate \"2026-10-18 12:20:00\" \"2026-10-18 12:45:00\" 60");
    log_end!();
}

/// Display help for the help command itself
fn display_help_help() {
    log_version!();
    log_block_start!("help - Display help information");
    log_block_start!("Usage: adhanr help [COMMAND]");
    log_block_start!("Arguments:");
    log_indented!("COMMAND  Optional command to get help for");
    log_indented!("         If omitted, shows general help");
    log_block_start!("Examples:");
    log_indented!("adhanr help");
    log_indented!("adhanr help simulate");
    log_end!();
}
