//! Next command - list the display changes still ahead today.

use anyhow::Result;
use chrono::NaiveDateTime;
use std::fmt::Write as _;

use crate::common::utils::format_duration_short;
use crate::core::mode::{ModeTransitionForecast, upcoming_mode_transitions};

/// Handle the next command.
pub fn handle_next_command(json: bool) -> Result<()> {
    let now = crate::time::source::now().naive_local();
    let (config, schedule) = super::load_schedule_for(now)?;

    let upcoming = upcoming_mode_transitions(schedule.slots(), now, &config.mode_windows());

    if json {
        println!("{}", serde_json::to_string_pretty(&upcoming)?);
    } else {
        print!("{}", format_forecast(&upcoming, now));
    }
    Ok(())
}

/// One line per upcoming change: time, entered mode, prayer, time remaining.
pub fn format_forecast(upcoming: &[ModeTransitionForecast], now: NaiveDateTime) -> String {
    if upcoming.is_empty() {
        return "No more mode changes today\n".to_string();
    }

    let mut out = String::new();
    for entry in upcoming {
        let remaining = (entry.time - now).num_seconds().max(0) as u64;
        let _ = writeln!(
            out,
            "{}  {} {:<12} {:<8} in {}",
            entry.time.format("%H:%M:%S"),
            entry.mode.symbol(),
            entry.mode,
            entry.prayer,
            format_duration_short(remaining)
        );
    }
    out
}
