//! Implementation of the simulate command for replaying a prayer day.
//!
//! This command sets up a simulated time source, allowing the scheduler to
//! run with accelerated time so that pre-prayer, adhan and post-prayer
//! transitions can be checked without waiting for real prayers.

use anyhow::{Context, Result};
use chrono::Local;
use std::sync::Arc;

use crate::common::logger::{Log, LoggerGuard};
use crate::time::source::{self, SimulatedTimeSource};

/// Handle the simulate command by installing a simulated time source.
///
/// Returns control to the caller, which then runs the application normally
/// on the simulated clock. The returned guard (present with `--log`) must be
/// kept alive until the run finishes.
///
/// # Arguments
/// * `start_time` - Start time in format "YYYY-MM-DD HH:MM:SS"
/// * `end_time` - End time in format "YYYY-MM-DD HH:MM:SS"
/// * `multiplier` - Time acceleration factor (0 = fast-forward)
/// * `debug_enabled` - Whether debug mode is enabled
/// * `log_to_file` - Write the log to a file instead of stdout
pub fn handle_simulate_command(
    start_time: &str,
    end_time: &str,
    multiplier: f64,
    debug_enabled: bool,
    log_to_file: bool,
) -> Result<Option<LoggerGuard>> {
    let start = source::parse_datetime(start_time).context("Invalid start time")?;
    let end = source::parse_datetime(end_time).context("Invalid end time")?;

    if end <= start {
        anyhow::bail!("End time must be after start time");
    }

    // Initialize the simulated time source BEFORE any logging so every line
    // carries a simulated timestamp
    source::init_time_source(Arc::new(SimulatedTimeSource::new(start, end, multiplier)));

    let guard = if log_to_file {
        let log_filename = format!(
            "adhanr-simulation-{}.log",
            Local::now().format("%Y%m%d-%H%M%S")
        );
        println!("Writing simulation log to {log_filename}");
        Some(Log::start_file_logging(log_filename)?)
    } else {
        None
    };

    log_version!();
    log_block_start!("Simulation Mode");

    let duration = end.signed_duration_since(start);
    log_decorated!(
        "Simulating from {} to {}",
        start.format("%Y-%m-%d %H:%M:%S"),
        end.format("%Y-%m-%d %H:%M:%S")
    );
    log_indented!(
        "Total simulated time: {} hours {} minutes",
        duration.num_hours(),
        duration.num_minutes() % 60
    );

    if multiplier == 0.0 {
        log_indented!("Time acceleration: fast-forward (instant execution)");
    } else {
        let real_duration_secs = duration.num_seconds() as f64 / multiplier;
        log_indented!(
            "Time acceleration: {}x (will complete in ~{:.1} seconds)",
            multiplier,
            real_duration_secs
        );
    }

    if debug_enabled {
        log_pipe!();
        log_debug!("Simulated time source initialized");
    }

    Ok(guard)
}
