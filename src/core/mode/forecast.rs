//! Lookahead over today's mode changes.
//!
//! The forecast is a read-only query over the same prayer list the calculator
//! uses. `adhanr next` prints it, and the event-driven scheduler uses
//! [`next_wake_after`] to sleep until the next instant that can change the
//! display.

use chrono::{Duration as ChronoDuration, NaiveDateTime};
use serde::Serialize;

use super::{DisplayMode, ModeWindowConfig};
use crate::common::constants::BOUNDARY_SETTLE_MILLIS;
use crate::prayer::{PrayerName, PrayerSlot};

/// Which window edge a forecast entry marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    PrePrayerStart,
    AdhanStart,
    PostPrayerEnd,
}

/// A future mode change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModeTransitionForecast {
    pub time: NaiveDateTime,
    pub kind: TransitionKind,
    /// Mode the display enters at `time`.
    pub mode: DisplayMode,
    pub prayer: PrayerName,
}

fn minutes(value: u32) -> ChronoDuration {
    ChronoDuration::minutes(i64::from(value))
}

/// Every pre-prayer start, adhan start and post-prayer end strictly after
/// `now`, in ascending order.
///
/// Equal instants keep list order, then kind order.
pub fn upcoming_mode_transitions(
    prayers: &[PrayerSlot],
    now: NaiveDateTime,
    config: &ModeWindowConfig,
) -> Vec<ModeTransitionForecast> {
    let today = now.date();

    let mut candidates: Vec<ModeTransitionForecast> = prayers
        .iter()
        .flat_map(|prayer| {
            let at = prayer.on(today);
            [
                ModeTransitionForecast {
                    time: at - minutes(config.pre_prayer_window_minutes),
                    kind: TransitionKind::PrePrayerStart,
                    mode: DisplayMode::PrePrayer,
                    prayer: prayer.name,
                },
                ModeTransitionForecast {
                    time: at,
                    kind: TransitionKind::AdhanStart,
                    mode: DisplayMode::Adhan,
                    prayer: prayer.name,
                },
                ModeTransitionForecast {
                    time: at
                        + minutes(config.adhan_duration_minutes)
                        + minutes(config.post_prayer_duration_minutes),
                    kind: TransitionKind::PostPrayerEnd,
                    mode: DisplayMode::Default,
                    prayer: prayer.name,
                },
            ]
        })
        .filter(|candidate| candidate.time > now)
        .collect();

    candidates.sort_by_key(|candidate| candidate.time);
    candidates
}

/// The earliest upcoming transition, or `None` once every prayer of the day
/// has finished its post-prayer window.
pub fn get_next_mode_transition(
    prayers: &[PrayerSlot],
    now: NaiveDateTime,
    config: &ModeWindowConfig,
) -> Option<ModeTransitionForecast> {
    upcoming_mode_transitions(prayers, now, config)
        .into_iter()
        .next()
}

/// Earliest instant after `now` at which a tick can change the display.
///
/// Window ends are inclusive, so instants that only take effect *after* an
/// edge (adhan end, post-prayer end, session expiry) are pushed out by a
/// short settle margin.
pub fn next_wake_after(
    prayers: &[PrayerSlot],
    now: NaiveDateTime,
    config: &ModeWindowConfig,
    session_expires_at: Option<NaiveDateTime>,
) -> Option<NaiveDateTime> {
    let today = now.date();
    let settle = ChronoDuration::milliseconds(BOUNDARY_SETTLE_MILLIS);
    let adhan = minutes(config.adhan_duration_minutes);
    let post = minutes(config.post_prayer_duration_minutes);

    prayers
        .iter()
        .flat_map(|prayer| {
            let at = prayer.on(today);
            [
                at - minutes(config.pre_prayer_window_minutes),
                at,
                at + adhan + settle,
                at + adhan + post + settle,
            ]
        })
        .chain(session_expires_at.map(|expiry| expiry + settle))
        .filter(|instant| *instant > now)
        .min()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mode::calculate_display_mode;
    use crate::prayer::{IqamaAdjustments, PrayerSchedule};
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn prayers() -> Vec<PrayerSlot> {
        PrayerSchedule::from_strings(
            at(0, 0, 0).date(),
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
        .slots()
        .to_vec()
    }

    #[test]
    fn test_next_transition_before_dhuhr() {
        let config = ModeWindowConfig::default();
        let next = get_next_mode_transition(&prayers(), at(12, 0, 0), &config).unwrap();
        assert_eq!(next.time, at(12, 28, 0));
        assert_eq!(next.kind, TransitionKind::PrePrayerStart);
        assert_eq!(next.mode, DisplayMode::PrePrayer);
        assert_eq!(next.prayer, PrayerName::Dhuhr);
    }

    #[test]
    fn test_transition_at_now_is_excluded() {
        let config = ModeWindowConfig::default();
        let next = get_next_mode_transition(&prayers(), at(12, 28, 0), &config).unwrap();
        assert_eq!(next.kind, TransitionKind::AdhanStart);
        assert_eq!(next.time, at(12, 30, 0));
    }

    #[test]
    fn test_full_day_list_is_ascending() {
        let config = ModeWindowConfig::default();
        let all = upcoming_mode_transitions(&prayers(), at(0, 0, 0), &config);
        assert_eq!(all.len(), 15);
        assert!(all.windows(2).all(|pair| pair[0].time < pair[1].time));
    }

    #[test]
    fn test_nothing_left_after_isha() {
        let config = ModeWindowConfig::default();
        assert!(get_next_mode_transition(&prayers(), at(19, 52, 0), &config).is_none());
        assert_eq!(
            get_next_mode_transition(&prayers(), at(19, 51, 59), &config).map(|t| t.kind),
            Some(TransitionKind::PostPrayerEnd)
        );
    }

    #[test]
    fn test_post_prayer_end_enters_default() {
        let config = ModeWindowConfig::default();
        let end = upcoming_mode_transitions(&prayers(), at(12, 31, 0), &config)
            .into_iter()
            .find(|t| t.kind == TransitionKind::PostPrayerEnd)
            .unwrap();
        assert_eq!(end.time, at(12, 37, 0));
        assert_eq!(end.mode, DisplayMode::Default);
    }

    #[test]
    fn test_next_wake_lands_on_mode_changes() {
        let config = ModeWindowConfig::default();
        let list = prayers();

        // Walk Dhuhr's windows by wake times only and check each wake changes mode
        let mut now = at(12, 0, 0);
        let mut seen = vec![calculate_display_mode(&list, now, &config).mode];
        while now < at(12, 40, 0) {
            now = next_wake_after(&list, now, &config, None).unwrap();
            let mode = calculate_display_mode(&list, now, &config).mode;
            if seen.last() != Some(&mode) {
                seen.push(mode);
            }
        }
        assert_eq!(
            seen,
            vec![
                DisplayMode::Default,
                DisplayMode::PrePrayer,
                DisplayMode::Adhan,
                DisplayMode::PostPrayer,
                DisplayMode::Default,
            ]
        );
    }

    #[test]
    fn test_next_wake_includes_session_expiry() {
        let config = ModeWindowConfig::default();
        let expiry = at(13, 0, 0);
        let wake = next_wake_after(&prayers(), at(12, 50, 0), &config, Some(expiry)).unwrap();
        assert_eq!(wake, expiry + ChronoDuration::milliseconds(BOUNDARY_SETTLE_MILLIS));
    }

    #[test]
    fn test_next_wake_none_at_end_of_day() {
        let config = ModeWindowConfig::default();
        assert!(next_wake_after(&prayers(), at(23, 0, 0), &config, None).is_none());
    }
}
