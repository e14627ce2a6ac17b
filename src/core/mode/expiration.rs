//! Safety-net expiry for timed display modes.

use chrono::{Duration as ChronoDuration, NaiveDateTime};

use super::{DisplayMode, ModeWindowConfig};

/// Nominal duration of a mode; `None` for [`DisplayMode::Default`].
pub fn mode_duration(mode: DisplayMode, config: &ModeWindowConfig) -> Option<ChronoDuration> {
    let minutes = match mode {
        DisplayMode::Default => return None,
        DisplayMode::PrePrayer => config.pre_prayer_window_minutes,
        DisplayMode::Adhan => config.adhan_duration_minutes,
        DisplayMode::PostPrayer => config.post_prayer_duration_minutes,
    };
    Some(ChronoDuration::minutes(i64::from(minutes)))
}

/// True iff a timed mode has been displayed for strictly longer than its
/// nominal duration.
///
/// Default never expires, and a missing start time never expires.
pub fn has_mode_expired(
    mode: DisplayMode,
    mode_start_time: Option<NaiveDateTime>,
    now: NaiveDateTime,
    config: &ModeWindowConfig,
) -> bool {
    let (Some(duration), Some(started)) = (mode_duration(mode, config), mode_start_time) else {
        return false;
    };
    now - started > duration
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_default_never_expires() {
        let config = ModeWindowConfig::default();
        let later = start() + ChronoDuration::days(2);
        assert!(!has_mode_expired(DisplayMode::Default, Some(start()), later, &config));
        assert!(!has_mode_expired(DisplayMode::Default, None, later, &config));
    }

    #[test]
    fn test_missing_start_never_expires() {
        let config = ModeWindowConfig::default();
        let later = start() + ChronoDuration::hours(1);
        assert!(!has_mode_expired(DisplayMode::Adhan, None, later, &config));
    }

    #[test]
    fn test_expiry_is_strict() {
        let config = ModeWindowConfig::default();
        let edge = start() + ChronoDuration::seconds(180);
        assert!(!has_mode_expired(DisplayMode::Adhan, Some(start()), edge, &config));
        assert!(has_mode_expired(
            DisplayMode::Adhan,
            Some(start()),
            edge + ChronoDuration::seconds(1),
            &config
        ));
    }

    #[test]
    fn test_each_mode_uses_its_own_duration() {
        let config = ModeWindowConfig::new(2, 3, 4);
        assert_eq!(
            mode_duration(DisplayMode::PrePrayer, &config),
            Some(ChronoDuration::minutes(2))
        );
        assert_eq!(
            mode_duration(DisplayMode::PostPrayer, &config),
            Some(ChronoDuration::minutes(4))
        );

        let after_three = start() + ChronoDuration::seconds(181);
        assert!(has_mode_expired(DisplayMode::PrePrayer, Some(start()), after_three, &config));
        assert!(!has_mode_expired(DisplayMode::PostPrayer, Some(start()), after_three, &config));
    }
}
