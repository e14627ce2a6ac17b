//! Classification and logging of committed mode changes.

use super::DisplayMode;
use crate::prayer::PrayerName;

/// The kind of change between two displayed modes.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ModeChange {
    /// No change occurred
    None,
    /// Regular move into a timed mode
    Entered { from: DisplayMode, to: DisplayMode },
    /// Regular fall back to the default screen
    Returned { from: DisplayMode },
    /// A change the state machine does not allow, e.g. starting up inside a
    /// post-prayer window. Still committed.
    UnexpectedJump { from: DisplayMode, to: DisplayMode },
}

/// Classify a change from `from` to `to` against the mode state machine.
pub fn detect_mode_change(from: DisplayMode, to: DisplayMode) -> ModeChange {
    if from == to {
        return ModeChange::None;
    }

    if !from.can_transition_to(to) {
        return ModeChange::UnexpectedJump { from, to };
    }

    match to {
        DisplayMode::Default => ModeChange::Returned { from },
        _ => ModeChange::Entered { from, to },
    }
}

/// Log a committed change in the block log style.
pub fn log_mode_change(change: &ModeChange, active_prayer: Option<PrayerName>) {
    match change {
        ModeChange::None => {}
        ModeChange::Entered { to, .. } => log_mode_announcement(*to, active_prayer),
        ModeChange::Returned { from } => {
            log_block_start!(
                "Completed {} {}",
                from.display_name().to_lowercase(),
                from.symbol()
            );
            log_mode_announcement(DisplayMode::Default, None);
        }
        ModeChange::UnexpectedJump { from, to } => {
            log_pipe!();
            log_warning!("Unexpected mode jump from {from} to {to}");
            log_indented!("This may indicate a clock change or a mid-window start");
            log_mode_announcement(*to, active_prayer);
        }
    }
}

/// Announce the mode the display is entering.
pub fn log_mode_announcement(mode: DisplayMode, active_prayer: Option<PrayerName>) {
    match (mode, active_prayer) {
        (DisplayMode::Default, _) | (_, None) => {
            log_block_start!(
                "Entering {} mode {}",
                mode.display_name().to_lowercase(),
                mode.symbol()
            );
        }
        (_, Some(prayer)) => {
            log_block_start!(
                "Entering {} mode for {} {}",
                mode.display_name().to_lowercase(),
                prayer,
                mode.symbol()
            );
        }
    }
}
