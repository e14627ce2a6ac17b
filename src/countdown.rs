//! Countdowns to the next prayer and their text rendering.
//!
//! Arithmetic and formatting are kept apart: [`calculate_countdown`] works out
//! the signed distance to a target, the `format_*` functions render already
//! clamped values, and [`localize_numerals`] is a final glyph substitution on
//! the rendered string.

use chrono::{Duration as ChronoDuration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::prayer::{PrayerName, PrayerSchedule};

const ARABIC_INDIC_DIGITS: [char; 10] = ['٠', '١', '٢', '٣', '٤', '٥', '٦', '٧', '٨', '٩'];

/// Language of word-based countdowns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountdownLanguage {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "ar")]
    Arabic,
}

impl FromStr for CountdownLanguage {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Self::English),
            "ar" | "arabic" => Ok(Self::Arabic),
            other => anyhow::bail!("Unknown language '{other}' (expected \"en\" or \"ar\")"),
        }
    }
}

/// Digit glyphs used for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NumeralSystem {
    #[default]
    Western,
    ArabicIndic,
}

impl FromStr for NumeralSystem {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "western" => Ok(Self::Western),
            "arabic-indic" | "arabic" => Ok(Self::ArabicIndic),
            other => anyhow::bail!(
                "Unknown numeral system '{other}' (expected \"western\" or \"arabic-indic\")"
            ),
        }
    }
}

/// Replace Western digits with the glyphs of `system`.
pub fn localize_numerals(text: &str, system: NumeralSystem) -> String {
    match system {
        NumeralSystem::Western => text.to_string(),
        NumeralSystem::ArabicIndic => text
            .chars()
            .map(|c| match c.to_digit(10) {
                Some(digit) => ARABIC_INDIC_DIGITS[digit as usize],
                None => c,
            })
            .collect(),
    }
}

/// `MM:SS`, or `HH:MM:SS` from one hour up.
pub fn format_countdown(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format_clock(hours, minutes, seconds)
}

fn format_clock(hours: u64, minutes: u64, seconds: u64) -> String {
    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

/// "1 hour and 5 minutes" style text.
///
/// Seconds only matter when there are no whole minutes left. Arabic output
/// uses Arabic-Indic digits.
pub fn format_countdown_words(
    hours: u64,
    minutes: u64,
    seconds: u64,
    is_past: bool,
    language: CountdownLanguage,
) -> String {
    match language {
        CountdownLanguage::English => english_words(hours, minutes, seconds, is_past),
        CountdownLanguage::Arabic => arabic_words(hours, minutes, seconds, is_past),
    }
}

fn english_words(hours: u64, minutes: u64, seconds: u64, is_past: bool) -> String {
    let unit = |n: u64, singular: &str| {
        if n == 1 {
            format!("1 {singular}")
        } else {
            format!("{n} {singular}s")
        }
    };

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(unit(hours, "hour"));
    }
    if minutes > 0 {
        parts.push(unit(minutes, "minute"));
    }

    if parts.is_empty() {
        return if seconds > 0 {
            "less than a minute".to_string()
        } else {
            "now".to_string()
        };
    }

    let text = parts.join(" and ");
    if is_past { format!("{text} ago") } else { text }
}

fn arabic_words(hours: u64, minutes: u64, seconds: u64, is_past: bool) -> String {
    let arabic = |n: u64| localize_numerals(&n.to_string(), NumeralSystem::ArabicIndic);

    let mut parts = Vec::new();
    if hours > 0 {
        let word = if hours == 1 { "ساعة" } else { "ساعات" };
        parts.push(format!("{} {word}", arabic(hours)));
    }
    if minutes > 0 {
        let word = if minutes == 1 { "دقيقة" } else { "دقائق" };
        parts.push(format!("{} {word}", arabic(minutes)));
    }

    if parts.is_empty() {
        return if seconds > 0 {
            "أقل من دقيقة".to_string()
        } else {
            "الآن".to_string()
        };
    }

    let text = parts.join(" و ");
    if is_past { format!("منذ {text}") } else { text }
}

/// Distance from now to a target instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Countdown {
    /// Signed; negative once the target has passed.
    pub total_seconds: i64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub is_past: bool,
    pub formatted: String,
    pub formatted_words: String,
}

/// Whole seconds from `now` to `target`, rounded down.
fn whole_seconds(target: NaiveDateTime, now: NaiveDateTime) -> i64 {
    (target - now).num_milliseconds().div_euclid(1000)
}

pub fn calculate_countdown(
    target: NaiveDateTime,
    now: NaiveDateTime,
    language: CountdownLanguage,
) -> Countdown {
    let total_seconds = whole_seconds(target, now);
    let is_past = total_seconds < 0;
    let magnitude = total_seconds.unsigned_abs();

    let hours = magnitude / 3600;
    let minutes = (magnitude % 3600) / 60;
    let seconds = magnitude % 60;

    Countdown {
        total_seconds,
        hours,
        minutes,
        seconds,
        is_past,
        formatted: format_clock(hours, minutes, seconds),
        formatted_words: format_countdown_words(hours, minutes, seconds, is_past, language),
    }
}

/// The first prayer strictly after `now`.
///
/// Once Isha has passed this is Fajr on the following day, using today's
/// Fajr time. `None` only for an empty schedule.
pub fn next_prayer(schedule: &PrayerSchedule, now: NaiveDateTime) -> Option<(PrayerName, NaiveDateTime)> {
    let today = now.date();

    if let Some(slot) = schedule.slots().iter().find(|slot| slot.on(today) > now) {
        return Some((slot.name, slot.on(today)));
    }

    let first = schedule.slots().first()?;
    let tomorrow = today.succ_opt()?;
    Some((first.name, first.on(tomorrow)))
}

/// Iqama instant for a prayer held at `prayer_at`.
fn iqama_at(schedule: &PrayerSchedule, name: PrayerName, prayer_at: NaiveDateTime) -> NaiveDateTime {
    let minutes = schedule.iqama_adjustments().minutes_for(name);
    prayer_at + ChronoDuration::minutes(i64::from(minutes))
}

/// The prayer whose adhan has been called and whose iqama has not.
pub fn current_prayer(schedule: &PrayerSchedule, now: NaiveDateTime) -> Option<PrayerName> {
    let today = now.date();
    schedule
        .slots()
        .iter()
        .find(|slot| {
            let adhan = slot.on(today);
            now >= adhan && now < iqama_at(schedule, slot.name, adhan)
        })
        .map(|slot| slot.name)
}

/// Countdown figures shown next to the clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrayerCountdowns {
    pub next_prayer: Option<PrayerName>,
    pub next_prayer_at: Option<NaiveDateTime>,
    /// Seconds until the next adhan, never negative.
    pub time_until_next: u64,
    /// Seconds until the next prayer's iqama, never negative.
    pub time_until_iqama: u64,
    pub current_prayer: Option<PrayerName>,
}

impl PrayerCountdowns {
    pub fn compute(schedule: &PrayerSchedule, now: NaiveDateTime) -> Self {
        let clamp = |target: NaiveDateTime| whole_seconds(target, now).max(0).unsigned_abs();

        let next = next_prayer(schedule, now);
        let (time_until_next, time_until_iqama) = match next {
            Some((name, at)) => (clamp(at), clamp(iqama_at(schedule, name, at))),
            None => (0, 0),
        };

        Self {
            next_prayer: next.map(|(name, _)| name),
            next_prayer_at: next.map(|(_, at)| at),
            time_until_next,
            time_until_iqama,
            current_prayer: current_prayer(schedule, now),
        }
    }
}
