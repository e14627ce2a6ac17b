//! Immutable views of the display state handed to readers.
//!
//! [`SessionSnapshot`] is what observers of the session manager receive on
//! every committed change. [`DisplayState`] is the one-shot status view
//! printed by `adhanr status`, computed from scratch for a given instant.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::core::mode::{
    DisplayMode, ModeTransitionForecast, ModeWindowConfig, calculate_display_mode,
    get_next_mode_transition,
};
use crate::core::session::{ModeSession, SessionOrigin};
use crate::countdown::{
    CountdownLanguage, NumeralSystem, PrayerCountdowns, calculate_countdown, format_countdown,
    localize_numerals,
};
use crate::prayer::{PrayerName, PrayerSchedule};

/// Copy of the current session, sent to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub mode: DisplayMode,
    pub previous_mode: Option<DisplayMode>,
    pub active_prayer: Option<PrayerName>,
    pub started_at: Option<NaiveDateTime>,
    /// Nominal length of the mode; `None` for default.
    pub duration_seconds: Option<i64>,
    pub origin: SessionOrigin,
}

impl From<&ModeSession> for SessionSnapshot {
    fn from(session: &ModeSession) -> Self {
        Self {
            mode: session.mode,
            previous_mode: session.previous_mode,
            active_prayer: session.active_prayer,
            started_at: session.started_at,
            duration_seconds: session.duration.map(|d| d.num_seconds()),
            origin: session.origin,
        }
    }
}

/// Everything the screen shows at one instant.
#[derive(Debug, Clone, Serialize)]
pub struct DisplayState {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub is_friday: bool,

    pub mode: DisplayMode,
    pub active_prayer: Option<PrayerName>,
    pub reason: String,

    #[serde(flatten)]
    pub countdowns: PrayerCountdowns,

    /// Clock-style countdown to the next adhan, in the configured numerals
    pub next_countdown: String,
    /// Word-style countdown to the next adhan
    pub next_countdown_words: String,
    /// Clock-style countdown to the next iqama
    pub iqama_countdown: String,

    pub next_transition: Option<ModeTransitionForecast>,
}

impl DisplayState {
    pub fn compute(
        schedule: &PrayerSchedule,
        now: NaiveDateTime,
        windows: &ModeWindowConfig,
        language: CountdownLanguage,
        numerals: NumeralSystem,
    ) -> Self {
        let calculation = calculate_display_mode(schedule.slots(), now, windows);
        let countdowns = PrayerCountdowns::compute(schedule, now);

        let next_countdown_words = match countdowns.next_prayer_at {
            Some(at) => calculate_countdown(at, now, language).formatted_words,
            None => String::new(),
        };

        Self {
            date: now.date(),
            time: now.time(),
            is_friday: schedule.is_friday(),
            mode: calculation.mode,
            active_prayer: calculation.active_prayer,
            reason: calculation.reason,
            next_countdown: localize_numerals(
                &format_countdown(countdowns.time_until_next),
                numerals,
            ),
            next_countdown_words,
            iqama_countdown: localize_numerals(
                &format_countdown(countdowns.time_until_iqama),
                numerals,
            ),
            countdowns,
            next_transition: get_next_mode_transition(schedule.slots(), now, windows),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prayer::IqamaAdjustments;

    fn schedule() -> PrayerSchedule {
        PrayerSchedule::from_strings(
            NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            &[
                (PrayerName::Fajr, "05:00"),
                (PrayerName::Dhuhr, "12:30"),
                (PrayerName::Asr, "15:45"),
                (PrayerName::Maghrib, "18:30"),
                (PrayerName::Isha, "19:45"),
            ],
            IqamaAdjustments::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_status_during_pre_prayer() {
        let now = schedule().date.and_hms_opt(12, 29, 0).unwrap();
        let state = DisplayState::compute(
            &schedule(),
            now,
            &ModeWindowConfig::default(),
            CountdownLanguage::English,
            NumeralSystem::Western,
        );
        assert_eq!(state.mode, DisplayMode::PrePrayer);
        assert_eq!(state.active_prayer, Some(PrayerName::Dhuhr));
        assert_eq!(state.next_countdown, "01:00");
        assert_eq!(state.iqama_countdown, "11:00");
        assert_eq!(state.next_countdown_words, "1 minute");
        assert!(state.is_friday);
        assert_eq!(
            state.next_transition.map(|t| t.mode),
            Some(DisplayMode::Adhan)
        );
    }

    #[test]
    fn test_status_json_flattens_countdowns() {
        let now = schedule().date.and_hms_opt(9, 0, 0).unwrap();
        let state = DisplayState::compute(
            &schedule(),
            now,
            &ModeWindowConfig::default(),
            CountdownLanguage::Arabic,
            NumeralSystem::ArabicIndic,
        );
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["mode"], "default");
        assert_eq!(json["next_prayer"], "dhuhr");
        assert_eq!(json["time_until_next"], 12_600);
        assert_eq!(json["next_countdown"], "٠٣:٣٠:٠٠");
    }
}
