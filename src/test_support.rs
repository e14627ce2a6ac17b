//! Fixtures shared by the integration tests.

use chrono::{Local, NaiveDate, NaiveDateTime, TimeZone};
use std::sync::Arc;

use crate::prayer::{IqamaAdjustments, PrayerName, PrayerSchedule};
use crate::time::source::{SimulatedTimeSource, TimeSource};

/// Fixed times used throughout the tests.
pub const STANDARD_TIMES: [(PrayerName, &str); 5] = [
    (PrayerName::Fajr, "05:00"),
    (PrayerName::Dhuhr, "12:30"),
    (PrayerName::Asr, "15:45"),
    (PrayerName::Maghrib, "18:30"),
    (PrayerName::Isha, "19:45"),
];

/// A Sunday without DST changes in common timezones.
pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).expect("valid date")
}

pub fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    test_date().and_hms_opt(h, m, s).expect("valid time")
}

pub fn standard_schedule(date: NaiveDate) -> PrayerSchedule {
    PrayerSchedule::from_strings(date, &STANDARD_TIMES, IqamaAdjustments::default())
        .expect("standard schedule is valid")
}

/// Fast-forward clock over `[start, end]` in local time.
pub fn fast_forward_clock(start: NaiveDateTime, end: NaiveDateTime) -> Arc<dyn TimeSource> {
    let local = |naive: NaiveDateTime| {
        Local
            .from_local_datetime(&naive)
            .earliest()
            .expect("instant exists in the local timezone")
    };
    Arc::new(SimulatedTimeSource::fast_forward(local(start), local(end)))
}
