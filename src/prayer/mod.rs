//! Prayer identifiers, time slots and the daily schedule.
//!
//! A [`PrayerSchedule`] is the only prayer data the scheduling core consumes:
//! five [`PrayerSlot`]s in strictly increasing time-of-day order for one local
//! calendar date. Everything that produces schedules (configuration, JSON
//! files) validates at this boundary so that the core can assume well-formed
//! input.

pub mod sources;

pub use sources::{
    ApiResponseProvider, FixedScheduleProvider, ManualScheduleProvider, ScheduleProvider,
};

use anyhow::{Context, Result};
use chrono::{Datelike, Duration as ChronoDuration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::common::constants::*;

/// One of the five daily prayers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrayerName {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl PrayerName {
    /// All prayers in chronological order.
    pub const ALL: [PrayerName; 5] = [
        PrayerName::Fajr,
        PrayerName::Dhuhr,
        PrayerName::Asr,
        PrayerName::Maghrib,
        PrayerName::Isha,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Fajr => "Fajr",
            Self::Dhuhr => "Dhuhr",
            Self::Asr => "Asr",
            Self::Maghrib => "Maghrib",
            Self::Isha => "Isha",
        }
    }

    pub fn arabic_name(&self) -> &'static str {
        match self {
            Self::Fajr => "الفجر",
            Self::Dhuhr => "الظهر",
            Self::Asr => "العصر",
            Self::Maghrib => "المغرب",
            Self::Isha => "العشاء",
        }
    }

    /// Arabic name, using Jumu'a for Dhuhr on Fridays.
    pub fn arabic_name_for_day(&self, is_friday: bool) -> &'static str {
        if is_friday && *self == Self::Dhuhr {
            "الجمعة"
        } else {
            self.arabic_name()
        }
    }
}

impl fmt::Display for PrayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.display_name())
    }
}

impl FromStr for PrayerName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        PrayerName::ALL
            .into_iter()
            .find(|name| name.display_name().eq_ignore_ascii_case(s.trim()))
            .with_context(|| {
                format!("Unknown prayer '{s}' (expected Fajr, Dhuhr, Asr, Maghrib or Isha)")
            })
    }
}

/// A prayer and its time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrayerSlot {
    pub name: PrayerName,
    pub time: NaiveTime,
}

impl PrayerSlot {
    pub fn new(name: PrayerName, time: NaiveTime) -> Self {
        Self { name, time }
    }

    /// The prayer instant on the given calendar date.
    pub fn on(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.time)
    }
}

/// Minutes between adhan and iqama for each prayer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IqamaAdjustments {
    pub fajr: u32,
    pub dhuhr: u32,
    pub asr: u32,
    pub maghrib: u32,
    pub isha: u32,
}

impl Default for IqamaAdjustments {
    fn default() -> Self {
        Self {
            fajr: DEFAULT_IQAMA_FAJR,
            dhuhr: DEFAULT_IQAMA_DHUHR,
            asr: DEFAULT_IQAMA_ASR,
            maghrib: DEFAULT_IQAMA_MAGHRIB,
            isha: DEFAULT_IQAMA_ISHA,
        }
    }
}

impl IqamaAdjustments {
    pub fn minutes_for(&self, name: PrayerName) -> u32 {
        match name {
            PrayerName::Fajr => self.fajr,
            PrayerName::Dhuhr => self.dhuhr,
            PrayerName::Asr => self.asr,
            PrayerName::Maghrib => self.maghrib,
            PrayerName::Isha => self.isha,
        }
    }
}

/// Today's prayers, validated and ordered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrayerSchedule {
    pub date: NaiveDate,
    slots: Vec<PrayerSlot>,
    iqama: IqamaAdjustments,
}

impl PrayerSchedule {
    /// Build a schedule of all five prayers in order, with strictly
    /// increasing times.
    pub fn new(date: NaiveDate, slots: Vec<PrayerSlot>, iqama: IqamaAdjustments) -> Result<Self> {
        if slots.len() != PrayerName::ALL.len() {
            anyhow::bail!(
                "A schedule needs all {} prayers, got {}",
                PrayerName::ALL.len(),
                slots.len()
            );
        }
        for (slot, expected) in slots.iter().zip(PrayerName::ALL) {
            if slot.name != expected {
                anyhow::bail!("Expected {expected} in the schedule, found {}", slot.name);
            }
        }
        for pair in slots.windows(2) {
            if pair[1].time <= pair[0].time {
                anyhow::bail!(
                    "Prayer times must be strictly increasing: {} ({}) is not after {} ({})",
                    pair[1].name,
                    pair[1].time.format("%H:%M"),
                    pair[0].name,
                    pair[0].time.format("%H:%M")
                );
            }
        }
        Ok(Self { date, slots, iqama })
    }

    /// Build a schedule from `HH:MM` strings keyed by prayer.
    pub fn from_strings(
        date: NaiveDate,
        times: &[(PrayerName, &str)],
        iqama: IqamaAdjustments,
    ) -> Result<Self> {
        let slots = times
            .iter()
            .map(|(name, time)| {
                parse_time_of_day(time)
                    .with_context(|| format!("Invalid time for {name}"))
                    .map(|time| PrayerSlot::new(*name, time))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(date, slots, iqama)
    }

    /// The same prayer times applied to another date.
    pub fn for_date(&self, date: NaiveDate) -> Self {
        Self {
            date,
            slots: self.slots.clone(),
            iqama: self.iqama,
        }
    }

    pub fn slots(&self) -> &[PrayerSlot] {
        &self.slots
    }

    pub fn get(&self, name: PrayerName) -> Option<&PrayerSlot> {
        self.slots.iter().find(|slot| slot.name == name)
    }

    pub fn iqama_adjustments(&self) -> &IqamaAdjustments {
        &self.iqama
    }

    /// Iqama time of day for a prayer, wrapping within the day.
    pub fn iqama_time(&self, name: PrayerName) -> Option<NaiveTime> {
        let slot = self.get(name)?;
        let minutes = i64::from(self.iqama.minutes_for(name));
        Some(slot.time.overflowing_add_signed(ChronoDuration::minutes(minutes)).0)
    }

    pub fn is_friday(&self) -> bool {
        self.date.weekday() == Weekday::Fri
    }
}

fn timezone_tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s*\([^)]*\)\s*$").expect("static regex is valid"))
}

/// Strip a trailing `(EST)`-style timezone tag as returned by calculation APIs.
pub fn strip_timezone_tag(time: &str) -> String {
    timezone_tag_pattern().replace(time, "").trim().to_string()
}

/// Parse an `HH:MM` 24-hour time of day, tolerating a trailing timezone tag.
pub fn parse_time_of_day(time: &str) -> Result<NaiveTime> {
    let cleaned = strip_timezone_tag(time);
    NaiveTime::parse_from_str(&cleaned, "%H:%M")
        .with_context(|| format!("Invalid time of day '{time}' (expected HH:MM)"))
}
