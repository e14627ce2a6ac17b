//! Typed events emitted by the session manager.
//!
//! Events are serialized one per line when adhanr runs with `--json`, so a
//! display front end can follow mode changes without polling.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::core::mode::DisplayMode;
use crate::prayer::{PrayerName, PrayerSlot};

/// Everything the display side can be told about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum DisplayEvent {
    /// The calculator moved the display to a new mode.
    ModeChanged {
        from: DisplayMode,
        to: DisplayMode,
        active_prayer: Option<PrayerName>,
        /// Diagnostic text from the calculator
        reason: String,
        at: NaiveDateTime,
    },

    /// A timed mode outlived its nominal duration and fell back to default.
    ModeExpired {
        mode: DisplayMode,
        active_prayer: Option<PrayerName>,
        at: NaiveDateTime,
    },

    /// A mode was forced by hand (or a manual override was cleared).
    OverrideApplied {
        mode: DisplayMode,
        active_prayer: Option<PrayerName>,
        at: NaiveDateTime,
    },

    /// A new day's prayer times were loaded.
    ScheduleLoaded {
        date: NaiveDate,
        prayers: Vec<PrayerSlot>,
    },
}

impl DisplayEvent {
    /// The mode the display is in after this event, if it changes one.
    pub fn resulting_mode(&self) -> Option<DisplayMode> {
        match self {
            Self::ModeChanged { to, .. } => Some(*to),
            Self::ModeExpired { .. } => Some(DisplayMode::Default),
            Self::OverrideApplied { mode, .. } => Some(*mode),
            Self::ScheduleLoaded { .. } => None,
        }
    }

    /// One-line JSON for `--json` output.
    pub fn to_json_line(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
