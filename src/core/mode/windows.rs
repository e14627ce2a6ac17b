//! Time-window predicates relative to a single prayer.
//!
//! Each predicate interprets the prayer's time of day on the calendar date of
//! `now`. Windows never span midnight: a post-prayer window that would run
//! past 24:00 simply stops matching once the date changes.

use chrono::{Duration as ChronoDuration, NaiveDateTime, NaiveTime};

/// Signed time from `now` until the prayer on `now`'s date, at full precision.
fn time_until(prayer_time: NaiveTime, now: NaiveDateTime) -> ChronoDuration {
    now.date().and_time(prayer_time) - now
}

fn window(minutes: u32) -> ChronoDuration {
    ChronoDuration::minutes(i64::from(minutes))
}

/// True iff `0 < prayer - now <= window_minutes`.
///
/// The prayer instant itself is excluded; it belongs to the adhan window.
pub fn is_in_pre_prayer_window(prayer_time: NaiveTime, now: NaiveDateTime, window_minutes: u32) -> bool {
    let until = time_until(prayer_time, now);
    until > ChronoDuration::zero() && until <= window(window_minutes)
}

/// True iff `0 <= now - prayer <= duration_minutes`.
pub fn is_in_adhan_window(prayer_time: NaiveTime, now: NaiveDateTime, duration_minutes: u32) -> bool {
    let since = -time_until(prayer_time, now);
    since >= ChronoDuration::zero() && since <= window(duration_minutes)
}

/// True iff `adhan <= now - prayer <= adhan + post`.
///
/// The starting edge is shared with the adhan window; callers that test the
/// adhan window first resolve the tie in its favour.
pub fn is_in_post_prayer_window(
    prayer_time: NaiveTime,
    now: NaiveDateTime,
    adhan_duration_minutes: u32,
    post_prayer_duration_minutes: u32,
) -> bool {
    let since = -time_until(prayer_time, now);
    let start = window(adhan_duration_minutes);
    let end = start + window(post_prayer_duration_minutes);
    since >= start && since <= end
}
