//! Configuration for adhanr.
//!
//! Settings live in a TOML file, `adhanr.toml`, found in
//! `$XDG_CONFIG_HOME/adhanr/` or in the directory passed with `--config`. A
//! commented default file is written on first run.
//!
//! ```toml
//! #[Display windows]
//! pre_prayer_window = 2       # Minutes of anticipation before each adhan (0-60)
//! adhan_duration = 3          # Minutes the adhan screen is shown (0-60)
//! post_prayer_duration = 4    # Minutes of post-prayer screen after the adhan (0-60)
//!
//! #[Scheduler]
//! scheduler = "polling"       # "polling" (tick every update_interval) or "event"
//! update_interval = 1         # Polling interval in seconds (1-60)
//!
//! #[Countdown]
//! language = "en"             # Word countdowns: "en" or "ar"
//! numerals = "western"        # Digits: "western" or "arabic-indic"
//!
//! #[Prayer times]
//! fajr = "05:00"              # Fixed daily times (HH:MM), used without a file
//! dhuhr = "12:30"
//! asr = "15:45"
//! maghrib = "18:30"
//! isha = "19:45"
//! #prayer_times_file = "times.json"  # Manual list or saved API response
//!
//! [iqama]                     # Minutes from adhan to iqama (0-120)
//! fajr = 10
//! dhuhr = 10
//! asr = 10
//! maghrib = 5
//! isha = 10
//! ```
//!
//! Every field is optional; missing values fall back to the defaults in
//! [`crate::common::constants`]. Values are range-checked by
//! [`validation::validate_config`] before anything else sees them.

pub mod builder;
pub mod loading;
pub mod validation;
pub mod watcher;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;

use crate::common::constants::*;
use crate::common::utils::private_path;
use crate::core::mode::ModeWindowConfig;
use crate::core::scheduler::ScheduleStrategy;
use crate::countdown::{CountdownLanguage, NumeralSystem};
use crate::prayer::sources::load_provider_from_file;
use crate::prayer::{
    FixedScheduleProvider, IqamaAdjustments, PrayerName, PrayerSchedule, ScheduleProvider,
};

pub use builder::create_default_config;
pub use loading::{get_config_base_dir, get_config_path, get_custom_config_dir, load, load_from_path, set_config_dir};
pub use watcher::start_config_watcher;

/// Scheduler selection.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerKind {
    /// Tick every `update_interval` seconds.
    Polling,
    /// Sleep until the next instant that can change the display.
    Event,
}

impl SchedulerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchedulerKind::Polling => "polling",
            SchedulerKind::Event => "event",
        }
    }
}

/// Contents of `adhanr.toml`.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub pre_prayer_window: Option<u32>, // minutes
    pub adhan_duration: Option<u32>,    // minutes
    pub post_prayer_duration: Option<u32>, // minutes

    pub scheduler: Option<SchedulerKind>,
    pub update_interval: Option<u64>, // seconds, polling only

    pub language: Option<CountdownLanguage>,
    pub numerals: Option<NumeralSystem>,

    pub fajr: Option<String>,
    pub dhuhr: Option<String>,
    pub asr: Option<String>,
    pub maghrib: Option<String>,
    pub isha: Option<String>,

    /// JSON file with per-date times or a saved API response. Relative
    /// paths are resolved against the configuration directory.
    pub prayer_times_file: Option<String>,

    pub iqama: Option<IqamaAdjustments>,
}

impl Config {
    /// Load configuration using the module's load function
    pub fn load() -> Result<Self> {
        load()
    }

    /// Load from path using the module's load_from_path function
    pub fn load_from_path(path: &Path) -> Result<Self> {
        load_from_path(path)
    }

    pub fn get_config_path() -> Result<PathBuf> {
        get_config_path()
    }

    pub fn mode_windows(&self) -> ModeWindowConfig {
        ModeWindowConfig::new(
            self.pre_prayer_window.unwrap_or(DEFAULT_PRE_PRAYER_WINDOW),
            self.adhan_duration.unwrap_or(DEFAULT_ADHAN_DURATION),
            self.post_prayer_duration
                .unwrap_or(DEFAULT_POST_PRAYER_DURATION),
        )
    }

    pub fn schedule_strategy(&self) -> ScheduleStrategy {
        match self.scheduler.unwrap_or(SchedulerKind::Polling) {
            SchedulerKind::Polling => ScheduleStrategy::Polling {
                interval: StdDuration::from_secs(
                    self.update_interval.unwrap_or(DEFAULT_UPDATE_INTERVAL),
                ),
            },
            SchedulerKind::Event => ScheduleStrategy::EventDriven,
        }
    }

    pub fn language(&self) -> CountdownLanguage {
        self.language.unwrap_or_default()
    }

    pub fn numerals(&self) -> NumeralSystem {
        self.numerals.unwrap_or_default()
    }

    pub fn iqama_adjustments(&self) -> IqamaAdjustments {
        self.iqama.unwrap_or_default()
    }

    /// Configured daily times as `(prayer, "HH:MM")` pairs.
    pub fn fixed_times(&self) -> [(PrayerName, &str); 5] {
        [
            (PrayerName::Fajr, self.fajr.as_deref().unwrap_or(DEFAULT_FAJR)),
            (PrayerName::Dhuhr, self.dhuhr.as_deref().unwrap_or(DEFAULT_DHUHR)),
            (PrayerName::Asr, self.asr.as_deref().unwrap_or(DEFAULT_ASR)),
            (
                PrayerName::Maghrib,
                self.maghrib.as_deref().unwrap_or(DEFAULT_MAGHRIB),
            ),
            (PrayerName::Isha, self.isha.as_deref().unwrap_or(DEFAULT_ISHA)),
        ]
    }

    /// The fixed daily schedule on `date`.
    pub fn fixed_schedule(&self, date: NaiveDate) -> Result<PrayerSchedule> {
        PrayerSchedule::from_strings(date, &self.fixed_times(), self.iqama_adjustments())
            .context("Invalid prayer times in configuration")
    }

    /// Resolved path of `prayer_times_file`, if configured.
    pub fn prayer_times_path(&self) -> Option<PathBuf> {
        let raw = self.prayer_times_file.as_deref()?;
        Some(resolve_path(raw, get_config_base_dir().ok().as_deref()))
    }

    /// Where prayer times come from under this configuration.
    pub fn schedule_provider(&self) -> Result<Box<dyn ScheduleProvider>> {
        match self.prayer_times_path() {
            Some(path) => load_provider_from_file(&path, self.iqama_adjustments()),
            None => {
                // Any date; the provider rebinds it per request
                let template = self.fixed_schedule(NaiveDate::MIN)?;
                Ok(Box::new(FixedScheduleProvider::new(template)))
            }
        }
    }

    pub fn log_config(&self) {
        match Self::get_config_path() {
            Ok(path) => log_block_start!("Loaded configuration from {}", private_path(&path)),
            Err(_) => log_block_start!("Loaded configuration"),
        }

        let windows = self.mode_windows();
        log_indented!(
            "Windows: pre-prayer {}m, adhan {}m, post-prayer {}m",
            windows.pre_prayer_window_minutes,
            windows.adhan_duration_minutes,
            windows.post_prayer_duration_minutes
        );

        match self.schedule_strategy() {
            ScheduleStrategy::Polling { interval } => {
                log_indented!("Scheduler: polling every {}s", interval.as_secs())
            }
            ScheduleStrategy::EventDriven => log_indented!("Scheduler: event-driven"),
        }

        match self.prayer_times_path() {
            Some(path) => log_indented!("Prayer times: {}", private_path(&path)),
            None => {
                let times = self
                    .fixed_times()
                    .iter()
                    .map(|(name, time)| format!("{name} {time}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                log_indented!("Prayer times: {}", times);
            }
        }

        let iqama = self.iqama_adjustments();
        log_indented!(
            "Iqama: {}",
            PrayerName::ALL
                .iter()
                .map(|name| format!("{name} +{}m", iqama.minutes_for(*name)))
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
}

/// Expand `~/` and resolve relative paths against `base`.
pub(crate) fn resolve_path(raw: &str, base: Option<&Path>) -> PathBuf {
    if let Some(rest) = raw.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }

    let path = PathBuf::from(raw);
    match base {
        Some(base) if path.is_relative() => base.join(path),
        _ => path,
    }
}
