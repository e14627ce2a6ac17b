//! Command-line command handlers for adhanr.
//!
//! One-shot commands (`status`, `next`, `help`) compute their answer from the
//! configuration and the clock and exit. `simulate` prepares a simulated clock
//! and then hands over to the normal runner.

pub mod help;
pub mod next;
pub mod simulate;
pub mod status;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;

use crate::config::Config;
use crate::prayer::PrayerSchedule;

/// Load the configuration and today's prayer times for `now`.
pub(crate) fn load_schedule_for(now: NaiveDateTime) -> Result<(Config, PrayerSchedule)> {
    let config = Config::load()?;
    let provider = config.schedule_provider()?;
    let schedule = provider
        .prayers_for(now.date())
        .with_context(|| format!("No prayer times for {} from {}", now.date(), provider.describe()))?;
    Ok((config, schedule))
}
