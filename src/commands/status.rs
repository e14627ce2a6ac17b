//! Status command - display the current mode and countdowns.
//!
//! The answer is computed from the configuration and the clock, the same
//! way the running scheduler computes it, so it works whether or not an
//! instance is running. Supports JSON and human-readable output.

use anyhow::Result;
use std::fmt::Write as _;

use crate::common::utils::format_duration_short;
use crate::io::lock;
use crate::state::DisplayState;

/// Handle the status command.
///
/// # Arguments
/// * `json` - Output the full `DisplayState` as JSON
pub fn handle_status_command(json: bool) -> Result<()> {
    let now = crate::time::source::now().naive_local();
    let (config, schedule) = super::load_schedule_for(now)?;

    let state = DisplayState::compute(
        &schedule,
        now,
        &config.mode_windows(),
        config.language(),
        config.numerals(),
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        let running = lock::running_instance().map(|owner| owner.pid);
        print!("{}", format_status(&state, running));
    }
    Ok(())
}

/// Human-readable status block.
pub fn format_status(state: &DisplayState, running_pid: Option<u32>) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "          Date: {}{}",
        state.date.format("%A %Y-%m-%d"),
        if state.is_friday { " (Jumu'a)" } else { "" }
    );
    let _ = writeln!(out, "          Time: {}", state.time.format("%H:%M:%S"));

    match state.active_prayer {
        Some(prayer) => {
            let _ = writeln!(
                out,
                "  Current mode: {} {} ({} / {})",
                state.mode.symbol(),
                state.mode,
                prayer,
                prayer.arabic_name_for_day(state.is_friday)
            );
        }
        None => {
            let _ = writeln!(out, "  Current mode: {} {}", state.mode.symbol(), state.mode);
        }
    }
    let _ = writeln!(out, "        Reason: {}", state.reason);

    if let Some(prayer) = state.countdowns.current_prayer {
        let _ = writeln!(out, "Current prayer: {prayer} (before iqama)");
    }

    if let (Some(prayer), Some(at)) = (
        state.countdowns.next_prayer,
        state.countdowns.next_prayer_at,
    ) {
        let _ = writeln!(
            out,
            "   Next prayer: {} at {} (in {}, {})",
            prayer,
            at.format("%H:%M"),
            state.next_countdown,
            state.next_countdown_words
        );
        let _ = writeln!(out, "         Iqama: in {}", state.iqama_countdown);
    }

    match &state.next_transition {
        Some(next) => {
            let remaining = (next.time - state.date.and_time(state.time))
                .num_seconds()
                .max(0) as u64;
            let _ = writeln!(
                out,
                "   Next change: {} for {} at {} (in {})",
                next.mode,
                next.prayer,
                next.time.format("%H:%M:%S"),
                format_duration_short(remaining)
            );
        }
        None => {
            let _ = writeln!(out, "   Next change: none today");
        }
    }

    match running_pid {
        Some(pid) => {
            let _ = writeln!(out, "     Scheduler: running (PID {pid})");
        }
        None => {
            let _ = writeln!(out, "     Scheduler: not running");
        }
    }

    out
}
