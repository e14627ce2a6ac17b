//! Display-mode calculation for the prayer day.
//!
//! This module decides which of the four display modes the screen should be in
//! at a given instant. Everything here is pure: callers pass in today's
//! prayers, the current time and the window configuration, and receive a
//! recommendation. Committing that recommendation is the job of
//! [`crate::core::session::SessionManager`].
//!
//! ## Key Functionality
//! - **Window predicates**: pre-prayer, adhan and post-prayer membership ([`windows`])
//! - **Mode calculation**: first-match scan over prayers in chronological order
//! - **Transition detection**: comparing a recommendation against the displayed mode
//! - **Expiration**: force-expiring a stuck non-default mode ([`expiration`])
//! - **Forecasting**: the ordered list of upcoming mode changes ([`forecast`])

pub mod expiration;
pub mod forecast;
pub mod state_detection;
pub mod windows;

pub use expiration::{has_mode_expired, mode_duration};
pub use forecast::{
    ModeTransitionForecast, TransitionKind, get_next_mode_transition, next_wake_after,
    upcoming_mode_transitions,
};
pub use state_detection::{ModeChange, detect_mode_change, log_mode_change};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::common::constants::{
    DEFAULT_ADHAN_DURATION, DEFAULT_POST_PRAYER_DURATION, DEFAULT_PRE_PRAYER_WINDOW,
};
use crate::prayer::{PrayerName, PrayerSlot};
use windows::{is_in_adhan_window, is_in_post_prayer_window, is_in_pre_prayer_window};

/// The single visual state of the display.
#[derive(Debug, Default, PartialEq, Eq, Hash, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayMode {
    /// Clock, date and prayer table
    #[default]
    Default,

    /// Anticipation screen shortly before a prayer
    PrePrayer,

    /// Call to prayer in progress
    Adhan,

    /// Dhikr and reminders after the adhan
    PostPrayer,
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.display_name())
    }
}

impl FromStr for DisplayMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "default" | "normal" => Ok(Self::Default),
            "pre-prayer" | "preprayer" => Ok(Self::PrePrayer),
            "adhan" => Ok(Self::Adhan),
            "post-prayer" | "postprayer" => Ok(Self::PostPrayer),
            other => anyhow::bail!(
                "Unknown display mode '{other}' (expected default, pre-prayer, adhan or post-prayer)"
            ),
        }
    }
}

impl DisplayMode {
    pub const ALL: [DisplayMode; 4] = [
        DisplayMode::Default,
        DisplayMode::PrePrayer,
        DisplayMode::Adhan,
        DisplayMode::PostPrayer,
    ];

    /// Returns the display name for this mode (without icon).
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::PrePrayer => "Pre-prayer",
            Self::Adhan => "Adhan",
            Self::PostPrayer => "Post-prayer",
        }
    }

    /// Returns the icon/symbol for this mode.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Default => "󰥔 ",
            Self::PrePrayer => "󰔛 ",
            Self::Adhan => "󰂞 ",
            Self::PostPrayer => "󰽥 ",
        }
    }

    /// Returns true for every mode except [`DisplayMode::Default`].
    pub fn is_timed(&self) -> bool {
        !matches!(self, Self::Default)
    }

    /// Whether `next` is a regular successor of this mode.
    ///
    /// ```text
    /// Default    -> PrePrayer | Adhan
    /// PrePrayer  -> Adhan | Default
    /// Adhan      -> PostPrayer | Default
    /// PostPrayer -> Default
    /// ```
    pub fn can_transition_to(&self, next: DisplayMode) -> bool {
        matches!(
            (self, next),
            (Self::Default, Self::PrePrayer | Self::Adhan)
                | (Self::PrePrayer, Self::Adhan | Self::Default)
                | (Self::Adhan, Self::PostPrayer | Self::Default)
                | (Self::PostPrayer, Self::Default)
        )
    }
}

/// Window sizes in minutes.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub struct ModeWindowConfig {
    pub pre_prayer_window_minutes: u32,
    pub adhan_duration_minutes: u32,
    pub post_prayer_duration_minutes: u32,
}

impl Default for ModeWindowConfig {
    fn default() -> Self {
        Self {
            pre_prayer_window_minutes: DEFAULT_PRE_PRAYER_WINDOW,
            adhan_duration_minutes: DEFAULT_ADHAN_DURATION,
            post_prayer_duration_minutes: DEFAULT_POST_PRAYER_DURATION,
        }
    }
}

impl ModeWindowConfig {
    pub fn new(pre_prayer: u32, adhan: u32, post_prayer: u32) -> Self {
        Self {
            pre_prayer_window_minutes: pre_prayer,
            adhan_duration_minutes: adhan,
            post_prayer_duration_minutes: post_prayer,
        }
    }
}

/// Result of [`calculate_display_mode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModeCalculation {
    pub mode: DisplayMode,
    pub active_prayer: Option<PrayerName>,
    /// Diagnostic text, not meant to be parsed.
    pub reason: String,
}

impl ModeCalculation {
    fn matched(mode: DisplayMode, prayer: PrayerName, window: &str) -> Self {
        Self {
            mode,
            active_prayer: Some(prayer),
            reason: format!("In {window} window for {prayer}"),
        }
    }

    fn normal() -> Self {
        Self {
            mode: DisplayMode::Default,
            active_prayer: None,
            reason: "Normal operation".to_string(),
        }
    }
}

/// Decide the display mode for `now`.
///
/// Prayers are scanned in the given order. For each prayer the adhan window is
/// tested first, then pre-prayer, then post-prayer, and the first match wins.
/// With overlapping windows the earlier prayer therefore takes precedence.
/// An empty list always yields [`DisplayMode::Default`].
pub fn calculate_display_mode(
    prayers: &[PrayerSlot],
    now: NaiveDateTime,
    config: &ModeWindowConfig,
) -> ModeCalculation {
    for prayer in prayers {
        if is_in_adhan_window(prayer.time, now, config.adhan_duration_minutes) {
            return ModeCalculation::matched(DisplayMode::Adhan, prayer.name, "adhan");
        }

        if is_in_pre_prayer_window(prayer.time, now, config.pre_prayer_window_minutes) {
            return ModeCalculation::matched(DisplayMode::PrePrayer, prayer.name, "pre-prayer");
        }

        if is_in_post_prayer_window(
            prayer.time,
            now,
            config.adhan_duration_minutes,
            config.post_prayer_duration_minutes,
        ) {
            return ModeCalculation::matched(DisplayMode::PostPrayer, prayer.name, "post-prayer");
        }
    }

    ModeCalculation::normal()
}

/// Outcome of [`should_transition_mode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionDecision {
    pub should_transition: bool,
    pub new_mode: Option<DisplayMode>,
    pub active_prayer: Option<PrayerName>,
}

impl TransitionDecision {
    pub fn stay() -> Self {
        Self {
            should_transition: false,
            new_mode: None,
            active_prayer: None,
        }
    }
}

/// Compare the calculated mode against the displayed one.
///
/// Pure: the caller commits the change and records the new session start.
pub fn should_transition_mode(
    current_mode: DisplayMode,
    prayers: &[PrayerSlot],
    now: NaiveDateTime,
    config: &ModeWindowConfig,
) -> TransitionDecision {
    let calculation = calculate_display_mode(prayers, now, config);

    if calculation.mode == current_mode {
        return TransitionDecision::stay();
    }

    TransitionDecision {
        should_transition: true,
        new_mode: Some(calculation.mode),
        active_prayer: calculation.active_prayer,
    }
}

#[cfg(test)]
mod tests;
