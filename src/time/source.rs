//! Time source abstraction for real and simulated time.
//!
//! The scheduling core never reads the clock itself; the driver asks a
//! [`TimeSource`] for "now" and for sleeps. Swapping in a
//! [`SimulatedTimeSource`] lets a whole prayer day play out in seconds, which
//! is what `adhanr simulate` and the scheduler tests rely on.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveDateTime, TimeZone};
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use crate::common::constants::SIMULATION_POLL_MILLIS;

/// Global time source instance, defaults to [`RealTimeSource`].
static TIME_SOURCE: OnceCell<Arc<dyn TimeSource>> = OnceCell::new();

/// Trait for abstracting time operations.
pub trait TimeSource: Send + Sync {
    /// Get the current time.
    fn now(&self) -> DateTime<Local>;

    /// Sleep for the specified duration (or simulate it).
    fn sleep(&self, duration: StdDuration);

    /// Like [`TimeSource::sleep`], but stops early once `cancel` is set.
    ///
    /// Only the time actually slept is counted. Sources that cannot be
    /// interrupted sleep the full duration.
    fn sleep_cancellable(&self, duration: StdDuration, cancel: &AtomicBool) {
        let _ = cancel;
        self.sleep(duration);
    }

    /// Check if this is a simulated time source.
    fn is_simulated(&self) -> bool;

    /// Check if simulation has ended (always false for real time).
    fn is_ended(&self) -> bool {
        false
    }
}

/// Real-time implementation backed by the system clock.
pub struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn sleep(&self, duration: StdDuration) {
        std::thread::sleep(duration);
    }

    fn is_simulated(&self) -> bool {
        false
    }
}

/// Simulated time source for accelerated runs.
///
/// Two modes are supported:
/// - linear acceleration, where every simulated sleep takes
///   `duration / multiplier` of real time;
/// - fast-forward (`multiplier == 0.0`), where sleeps complete instantly.
///
/// Simulated time never passes `end_time`.
pub struct SimulatedTimeSource {
    start_time: DateTime<Local>,
    end_time: DateTime<Local>,
    time_multiplier: f64,
    elapsed: Mutex<ChronoDuration>,
}

impl SimulatedTimeSource {
    /// Create a new simulated time source.
    ///
    /// Negative multipliers fall back to 3600x (one simulated hour per second).
    pub fn new(start_time: DateTime<Local>, end_time: DateTime<Local>, multiplier: f64) -> Self {
        let time_multiplier = if multiplier < 0.0 { 3600.0 } else { multiplier };
        Self {
            start_time,
            end_time,
            time_multiplier,
            elapsed: Mutex::new(ChronoDuration::zero()),
        }
    }

    /// Fast-forward source: sleeps return immediately after advancing the clock.
    pub fn fast_forward(start_time: DateTime<Local>, end_time: DateTime<Local>) -> Self {
        Self::new(start_time, end_time, 0.0)
    }

    fn is_fast_forward(&self) -> bool {
        self.time_multiplier == 0.0
    }

    fn current_time(&self) -> DateTime<Local> {
        let elapsed = *self.elapsed.lock().unwrap_or_else(|e| e.into_inner());
        (self.start_time + elapsed).min(self.end_time)
    }

    fn remaining(&self) -> ChronoDuration {
        self.end_time - self.current_time()
    }

    fn advance(&self, step: ChronoDuration) {
        let mut elapsed = self.elapsed.lock().unwrap_or_else(|e| e.into_inner());
        *elapsed += step;
    }
}

impl TimeSource for SimulatedTimeSource {
    fn now(&self) -> DateTime<Local> {
        self.current_time()
    }

    fn sleep(&self, duration: StdDuration) {
        self.sleep_cancellable(duration, &AtomicBool::new(false));
    }

    fn sleep_cancellable(&self, duration: StdDuration, cancel: &AtomicBool) {
        let remaining = self.remaining();
        let requested = ChronoDuration::from_std(duration).unwrap_or(remaining);
        let step = requested.min(remaining).max(ChronoDuration::zero());

        if self.is_fast_forward() {
            // Yield so other threads (log writer, subscribers) can keep up
            std::thread::sleep(StdDuration::from_millis(1));
            if !cancel.load(Ordering::SeqCst) {
                self.advance(step);
            }
            return;
        }

        // Advance in short real-time slices so a cancel lands between them
        let poll = StdDuration::from_millis(SIMULATION_POLL_MILLIS);
        let mut left = step;
        while left > ChronoDuration::zero() && !cancel.load(Ordering::SeqCst) {
            let real_left = left
                .to_std()
                .unwrap_or_default()
                .div_f64(self.time_multiplier);

            let slice = if real_left > poll {
                std::thread::sleep(poll);
                ChronoDuration::from_std(poll.mul_f64(self.time_multiplier))
                    .unwrap_or(left)
                    .min(left)
            } else {
                std::thread::sleep(real_left);
                left
            };

            self.advance(slice);
            left -= slice;
        }
    }

    fn is_simulated(&self) -> bool {
        true
    }

    fn is_ended(&self) -> bool {
        self.current_time() >= self.end_time
    }
}

/// Initialize the global time source (call once at startup).
pub fn init_time_source(source: Arc<dyn TimeSource>) {
    TIME_SOURCE.set(source).ok();
}

/// Check if the global time source has been initialized.
pub fn is_initialized() -> bool {
    TIME_SOURCE.get().is_some()
}

/// Shared handle to the global time source.
pub fn shared() -> Arc<dyn TimeSource> {
    TIME_SOURCE
        .get_or_init(|| Arc::new(RealTimeSource))
        .clone()
}

/// Current time from the global time source.
pub fn now() -> DateTime<Local> {
    TIME_SOURCE.get_or_init(|| Arc::new(RealTimeSource)).now()
}

/// Check if we're running in simulation mode.
pub fn is_simulated() -> bool {
    TIME_SOURCE
        .get_or_init(|| Arc::new(RealTimeSource))
        .is_simulated()
}

/// Parse a local datetime in the format `YYYY-MM-DD HH:MM:SS`.
pub fn parse_datetime(s: &str) -> Result<DateTime<Local>> {
    let naive = NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M:%S")
        .with_context(|| format!("Invalid datetime '{s}'. Use YYYY-MM-DD HH:MM:SS"))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .with_context(|| format!("'{s}' does not exist in the local timezone"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(s: &str) -> DateTime<Local> {
        parse_datetime(s).unwrap()
    }

    #[test]
    fn test_parse_datetime() {
        let dt = local("2026-03-01 12:30:00");
        assert_eq!(dt.format("%H:%M:%S").to_string(), "12:30:00");
        assert!(parse_datetime("12:30").is_err());
        assert!(parse_datetime("2026-13-01 00:00:00").is_err());
    }

    #[test]
    fn test_fast_forward_advances_by_requested_duration() {
        let source = SimulatedTimeSource::fast_forward(
            local("2026-03-01 12:00:00"),
            local("2026-03-01 13:00:00"),
        );
        source.sleep(StdDuration::from_secs(90));
        assert_eq!(source.now(), local("2026-03-01 12:01:30"));
        assert!(!source.is_ended());
    }

    #[test]
    fn test_simulation_is_capped_at_end_time() {
        let source = SimulatedTimeSource::fast_forward(
            local("2026-03-01 12:00:00"),
            local("2026-03-01 12:05:00"),
        );
        source.sleep(StdDuration::from_secs(3600));
        assert_eq!(source.now(), local("2026-03-01 12:05:00"));
        assert!(source.is_ended());
    }

    #[test]
    fn test_linear_acceleration_advances_time() {
        let source = SimulatedTimeSource::new(
            local("2026-03-01 12:00:00"),
            local("2026-03-01 12:10:00"),
            6000.0,
        );
        // 60 simulated seconds at 6000x is 10ms of real time
        source.sleep(StdDuration::from_secs(60));
        assert_eq!(source.now(), local("2026-03-01 12:01:00"));
        assert!(source.is_simulated());
    }

    #[test]
    fn test_cancelled_sleep_counts_only_time_slept() {
        let source = Arc::new(SimulatedTimeSource::new(
            local("2026-03-01 12:00:00"),
            local("2026-03-01 14:00:00"),
            60.0,
        ));
        let cancel = Arc::new(AtomicBool::new(false));

        // Ten simulated minutes at 60x would take ten real seconds
        let sleeper = std::thread::spawn({
            let source = Arc::clone(&source);
            let cancel = Arc::clone(&cancel);
            move || source.sleep_cancellable(StdDuration::from_secs(600), &cancel)
        });
        std::thread::sleep(StdDuration::from_millis(50));
        cancel.store(true, Ordering::SeqCst);
        sleeper.join().unwrap();

        let elapsed = source.now() - local("2026-03-01 12:00:00");
        assert!(elapsed > ChronoDuration::zero());
        assert!(elapsed < ChronoDuration::minutes(2), "advanced {elapsed}");

        // Nothing keeps running in the background
        std::thread::sleep(StdDuration::from_millis(100));
        assert_eq!(source.now() - local("2026-03-01 12:00:00"), elapsed);
    }

    #[test]
    fn test_cancelled_fast_forward_does_not_advance() {
        let source = SimulatedTimeSource::fast_forward(
            local("2026-03-01 12:00:00"),
            local("2026-03-01 13:00:00"),
        );
        source.sleep_cancellable(StdDuration::from_secs(600), &AtomicBool::new(true));
        assert_eq!(source.now(), local("2026-03-01 12:00:00"));
    }
}
