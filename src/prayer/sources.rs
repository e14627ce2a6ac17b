//! Where a day's prayer times come from.
//!
//! Prayer-time *calculation* lives outside adhanr. Times arrive either as fixed
//! daily times in the configuration, as a per-date JSON list maintained by the
//! mosque, or as a saved response body from a prayer-time calculation API.
//! All of them are parsed and validated here, before anything reaches the
//! scheduling core.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::{IqamaAdjustments, PrayerName, PrayerSchedule};
use crate::common::utils::private_path;

/// Supplies the prayer schedule for a given local date.
#[cfg_attr(test, mockall::automock)]
pub trait ScheduleProvider: Send {
    /// Prayer schedule for `date`.
    fn prayers_for(&self, date: NaiveDate) -> Result<PrayerSchedule>;

    /// Short description used in logs.
    fn describe(&self) -> String;
}

/// Five prayer times as they appear in JSON (`"Fajr": "05:00"`).
#[derive(Debug, Clone, Deserialize)]
pub struct PrayerTimings {
    #[serde(rename = "Fajr")]
    pub fajr: String,
    #[serde(rename = "Dhuhr")]
    pub dhuhr: String,
    #[serde(rename = "Asr")]
    pub asr: String,
    #[serde(rename = "Maghrib")]
    pub maghrib: String,
    #[serde(rename = "Isha")]
    pub isha: String,
}

impl PrayerTimings {
    pub fn to_schedule(&self, date: NaiveDate, iqama: IqamaAdjustments) -> Result<PrayerSchedule> {
        PrayerSchedule::from_strings(
            date,
            &[
                (PrayerName::Fajr, self.fajr.as_str()),
                (PrayerName::Dhuhr, self.dhuhr.as_str()),
                (PrayerName::Asr, self.asr.as_str()),
                (PrayerName::Maghrib, self.maghrib.as_str()),
                (PrayerName::Isha, self.isha.as_str()),
            ],
            iqama,
        )
    }
}

/// One entry of a manually maintained prayer-time list.
#[derive(Debug, Clone, Deserialize)]
pub struct ManualPrayerTimes {
    pub date: NaiveDate,
    pub prayers: PrayerTimings,
}

/// Body of a prayer-time calculation API response (`/timings`).
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    pub code: u16,
    pub status: String,
    pub data: ApiData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiData {
    pub timings: PrayerTimings,
}

/// Same prayer times every day.
pub struct FixedScheduleProvider {
    template: PrayerSchedule,
}

impl FixedScheduleProvider {
    pub fn new(template: PrayerSchedule) -> Self {
        Self { template }
    }
}

impl ScheduleProvider for FixedScheduleProvider {
    fn prayers_for(&self, date: NaiveDate) -> Result<PrayerSchedule> {
        Ok(self.template.for_date(date))
    }

    fn describe(&self) -> String {
        "fixed daily times from configuration".to_string()
    }
}

/// Per-date prayer times, looked up by date.
pub struct ManualScheduleProvider {
    entries: Vec<ManualPrayerTimes>,
    iqama: IqamaAdjustments,
}

impl ManualScheduleProvider {
    pub fn from_json(json: &str, iqama: IqamaAdjustments) -> Result<Self> {
        let entries: Vec<ManualPrayerTimes> =
            serde_json::from_str(json).context("Manual prayer times must be a JSON array")?;

        // Validate every entry up front so bad data fails at load, not at midnight
        for entry in &entries {
            entry
                .prayers
                .to_schedule(entry.date, iqama)
                .with_context(|| format!("Invalid prayer times for {}", entry.date))?;
        }

        Ok(Self { entries, iqama })
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.entries.iter().map(|entry| entry.date)
    }
}

impl ScheduleProvider for ManualScheduleProvider {
    fn prayers_for(&self, date: NaiveDate) -> Result<PrayerSchedule> {
        let entry = self
            .entries
            .iter()
            .find(|entry| entry.date == date)
            .with_context(|| format!("No manual prayer times for {date}"))?;
        entry.prayers.to_schedule(date, self.iqama)
    }

    fn describe(&self) -> String {
        format!("manual prayer times ({} days)", self.entries.len())
    }
}

/// A single saved API response, applied to whichever date is asked for.
pub struct ApiResponseProvider {
    timings: PrayerTimings,
    iqama: IqamaAdjustments,
}

impl ApiResponseProvider {
    pub fn from_json(json: &str, iqama: IqamaAdjustments) -> Result<Self> {
        let response: ApiResponse =
            serde_json::from_str(json).context("Failed to parse prayer-time API response")?;

        if response.code != 200 {
            anyhow::bail!(
                "Prayer-time API returned error {}: {}",
                response.code,
                response.status
            );
        }

        let timings = response.data.timings;
        // Any date works for validation; times are the same for every day
        timings.to_schedule(NaiveDate::MIN, iqama)?;

        Ok(Self { timings, iqama })
    }
}

impl ScheduleProvider for ApiResponseProvider {
    fn prayers_for(&self, date: NaiveDate) -> Result<PrayerSchedule> {
        self.timings.to_schedule(date, self.iqama)
    }

    fn describe(&self) -> String {
        "saved prayer-time API response".to_string()
    }
}

/// Load a prayer-times JSON file, detecting whether it is a manual list or an
/// API response.
pub fn load_provider_from_file(
    path: &Path,
    iqama: IqamaAdjustments,
) -> Result<Box<dyn ScheduleProvider>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read prayer times from {}", private_path(path)))?;

    let provider: Box<dyn ScheduleProvider> = if content.trim_start().starts_with('[') {
        Box::new(ManualScheduleProvider::from_json(&content, iqama)?)
    } else {
        Box::new(ApiResponseProvider::from_json(&content, iqama)?)
    };

    Ok(provider)
}
