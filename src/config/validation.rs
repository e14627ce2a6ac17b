//! Configuration validation.
//!
//! Rejects values the scheduling core must never see (out-of-range windows,
//! unparseable or unordered prayer times, a missing prayer-times file) and
//! warns about configurations that are legal but surprising, such as windows
//! of neighbouring prayers that overlap.

use anyhow::{Context, Result};
use chrono::{Duration as ChronoDuration, NaiveDate};
use std::path::Path;

use super::{Config, resolve_path};
use crate::common::constants::*;
use crate::common::utils::private_path;
use crate::core::mode::ModeWindowConfig;
use crate::prayer::{PrayerName, PrayerSchedule};

/// Validate a parsed configuration.
///
/// `base_dir` is the directory of the configuration file, used to resolve a
/// relative `prayer_times_file`.
pub fn validate_config(config: &Config, base_dir: Option<&Path>) -> Result<()> {
    for (name, value) in [
        ("pre_prayer_window", config.pre_prayer_window),
        ("adhan_duration", config.adhan_duration),
        ("post_prayer_duration", config.post_prayer_duration),
    ] {
        if let Some(minutes) = value
            && !(MINIMUM_WINDOW_MINUTES..=MAXIMUM_WINDOW_MINUTES).contains(&minutes)
        {
            anyhow::bail!(
                "{} ({} minutes) must be between {} and {} minutes",
                name,
                minutes,
                MINIMUM_WINDOW_MINUTES,
                MAXIMUM_WINDOW_MINUTES
            );
        }
    }

    if let Some(interval) = config.update_interval
        && !(MINIMUM_UPDATE_INTERVAL..=MAXIMUM_UPDATE_INTERVAL).contains(&interval)
    {
        anyhow::bail!(
            "update_interval ({} seconds) must be between {} and {} seconds",
            interval,
            MINIMUM_UPDATE_INTERVAL,
            MAXIMUM_UPDATE_INTERVAL
        );
    }

    let iqama = config.iqama_adjustments();
    for name in PrayerName::ALL {
        let minutes = iqama.minutes_for(name);
        if minutes > MAXIMUM_IQAMA_ADJUSTMENT {
            anyhow::bail!(
                "iqama.{} ({} minutes) must be at most {} minutes",
                name.display_name().to_lowercase(),
                minutes,
                MAXIMUM_IQAMA_ADJUSTMENT
            );
        }
    }

    if let Some(raw) = config.prayer_times_file.as_deref() {
        let path = resolve_path(raw, base_dir);
        if !path.is_file() {
            anyhow::bail!("prayer_times_file not found: {}", private_path(&path));
        }
    }

    // The fixed times double as the fallback schedule, so they are always checked
    let schedule = config
        .fixed_schedule(NaiveDate::MIN)
        .context("Prayer times must be HH:MM and strictly increasing from Fajr to Isha")?;

    if config.prayer_times_file.is_none() {
        let overlaps = find_window_overlaps(&schedule, &config.mode_windows());
        if !overlaps.is_empty() {
            log_pipe!();
            for (earlier, later) in &overlaps {
                log_warning!("Display windows of {} and {} overlap", earlier, later);
            }
            log_indented!("The earlier prayer takes precedence while they overlap");
        }
    }

    Ok(())
}

/// Consecutive prayer pairs whose display windows overlap: the earlier
/// prayer's post-prayer window reaches into the later one's pre-prayer window.
pub fn find_window_overlaps(
    schedule: &PrayerSchedule,
    windows: &ModeWindowConfig,
) -> Vec<(PrayerName, PrayerName)> {
    let after = ChronoDuration::minutes(i64::from(
        windows.adhan_duration_minutes + windows.post_prayer_duration_minutes,
    ));
    let before = ChronoDuration::minutes(i64::from(windows.pre_prayer_window_minutes));

    schedule
        .slots()
        .windows(2)
        .filter(|pair| {
            let gap = pair[1].time - pair[0].time;
            gap <= after + before
        })
        .map(|pair| (pair[0].name, pair[1].name))
        .collect()
}
