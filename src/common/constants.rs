//! Application-wide defaults, limits and exit codes.

// # Display windows (minutes)

pub const DEFAULT_PRE_PRAYER_WINDOW: u32 = 2;
pub const DEFAULT_ADHAN_DURATION: u32 = 3;
pub const DEFAULT_POST_PRAYER_DURATION: u32 = 4;

pub const MINIMUM_WINDOW_MINUTES: u32 = 0;
pub const MAXIMUM_WINDOW_MINUTES: u32 = 60;

// # Scheduler

/// Polling cadence in seconds.
pub const DEFAULT_UPDATE_INTERVAL: u64 = 1;
pub const MINIMUM_UPDATE_INTERVAL: u64 = 1;
pub const MAXIMUM_UPDATE_INTERVAL: u64 = 60;

pub const DEFAULT_SCHEDULER: &str = "polling";

/// Longest single sleep of the event-driven scheduler, so that wall-clock
/// changes are picked up within the hour.
pub const MAXIMUM_EVENT_SLEEP_SECS: u64 = 3600;

/// How long to wait before asking a failed schedule provider again.
pub const PROVIDER_RETRY_SECS: u64 = 60;

/// Real-time poll interval for control messages during simulated sleeps.
pub const SIMULATION_POLL_MILLIS: u64 = 10;

/// Inclusive window ends only change the mode strictly after the boundary.
pub const BOUNDARY_SETTLE_MILLIS: i64 = 1000;

// # Iqama adjustments (minutes after adhan)

pub const DEFAULT_IQAMA_FAJR: u32 = 10;
pub const DEFAULT_IQAMA_DHUHR: u32 = 10;
pub const DEFAULT_IQAMA_ASR: u32 = 10;
pub const DEFAULT_IQAMA_MAGHRIB: u32 = 5;
pub const DEFAULT_IQAMA_ISHA: u32 = 10;
pub const MAXIMUM_IQAMA_ADJUSTMENT: u32 = 120;

// # Default prayer times (HH:MM), used until real times are configured

pub const DEFAULT_FAJR: &str = "05:00";
pub const DEFAULT_DHUHR: &str = "12:30";
pub const DEFAULT_ASR: &str = "15:45";
pub const DEFAULT_MAGHRIB: &str = "18:30";
pub const DEFAULT_ISHA: &str = "19:45";

// # Countdown presentation

pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_NUMERALS: &str = "western";

// # Files

pub const CONFIG_DIR_NAME: &str = "adhanr";
pub const CONFIG_FILE_NAME: &str = "adhanr.toml";
pub const LOCK_FILE_NAME: &str = "adhanr.lock";

// # Exit codes

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
