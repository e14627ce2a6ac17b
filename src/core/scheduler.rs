//! The driver that keeps the session manager in step with the clock.
//!
//! A [`Scheduler`] runs on its own thread. Each iteration it makes sure
//! today's prayer times are loaded, ticks the [`SessionManager`], forwards the
//! resulting events and then sleeps. How long it sleeps depends on the
//! [`ScheduleStrategy`]:
//!
//! - `Polling` wakes every `update_interval` seconds;
//! - `EventDriven` sleeps until the next instant that can change the display
//!   (a window edge, a session expiry or midnight).
//!
//! Sleeps are interruptible: every [`ControlMessage`] sent through the
//! [`SchedulerHandle`] wakes the driver immediately. Dropping or cancelling
//! the handle stops the thread.

use anyhow::{Context, Result};
use chrono::{Duration as ChronoDuration, NaiveDate, NaiveDateTime, NaiveTime};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::thread::{self, JoinHandle};
use std::time::Duration as StdDuration;

use crate::common::constants::*;
use crate::config::Config;
use crate::core::mode::{DisplayMode, ModeWindowConfig, next_wake_after};
use crate::core::session::SessionManager;
use crate::prayer::{PrayerName, PrayerSchedule, PrayerSlot, ScheduleProvider};
use crate::state::{DisplayEvent, SessionSnapshot};
use crate::time::source::TimeSource;

/// How the driver decides when to tick next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleStrategy {
    Polling { interval: StdDuration },
    EventDriven,
}

/// Everything the driver needs that can change at runtime.
pub struct SchedulerSettings {
    pub windows: ModeWindowConfig,
    pub strategy: ScheduleStrategy,
    pub provider: Box<dyn ScheduleProvider>,
}

impl SchedulerSettings {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            windows: config.mode_windows(),
            strategy: config.schedule_strategy(),
            provider: config.schedule_provider()?,
        })
    }
}

/// Requests delivered to the running driver.
pub enum ControlMessage {
    /// Finish the current iteration and exit.
    Stop,
    /// Re-read `adhanr.toml` from disk.
    Reload,
    /// Swap in settings built by the caller.
    Reconfigure(Box<SchedulerSettings>),
    /// Force a mode until it expires or is cleared.
    Override {
        mode: DisplayMode,
        prayer: Option<PrayerName>,
    },
    /// Clear any override and show the default screen.
    ForceDefault,
    /// Start sending session snapshots to this channel.
    Subscribe(Sender<SessionSnapshot>),
}

/// Parameters for starting a [`Scheduler`].
pub struct SchedulerParams {
    pub settings: SchedulerSettings,
    pub time_source: Arc<dyn TimeSource>,
    /// Optional sink for every [`DisplayEvent`] the session produces.
    pub events: Option<Sender<DisplayEvent>>,
    pub debug_enabled: bool,
}

pub struct Scheduler;

impl Scheduler {
    /// Start the driver thread.
    pub fn spawn(params: SchedulerParams) -> Result<SchedulerHandle> {
        let (sender, receiver) = channel();

        let driver = Driver {
            manager: SessionManager::new(params.settings.windows),
            settings: params.settings,
            time_source: params.time_source,
            control: receiver,
            events: params.events,
            schedule: None,
            fetch_failed_at: None,
            debug_enabled: params.debug_enabled,
        };

        let thread = thread::Builder::new()
            .name("adhanr-scheduler".to_string())
            .spawn(move || driver.run())
            .context("Failed to start scheduler thread")?;

        Ok(SchedulerHandle {
            sender,
            thread: Some(thread),
        })
    }
}

/// Control side of a running [`Scheduler`].
///
/// Dropping the handle stops the driver and waits for it.
pub struct SchedulerHandle {
    sender: Sender<ControlMessage>,
    thread: Option<JoinHandle<Result<()>>>,
}

impl SchedulerHandle {
    /// Stop the driver and wait for it to exit.
    pub fn cancel(mut self) -> Result<()> {
        let _ = self.sender.send(ControlMessage::Stop);
        self.join()
    }

    /// Wait for the driver to exit on its own (end of a simulation, or a
    /// `Stop` sent through [`SchedulerHandle::sender`]).
    pub fn wait(mut self) -> Result<()> {
        self.join()
    }

    /// Replace the running settings.
    pub fn reload(&self, settings: SchedulerSettings) -> Result<()> {
        self.send(ControlMessage::Reconfigure(Box::new(settings)))
    }

    /// Ask the driver to re-read the configuration file.
    pub fn request_reload(&self) -> Result<()> {
        self.send(ControlMessage::Reload)
    }

    pub fn override_mode(&self, mode: DisplayMode, prayer: Option<PrayerName>) -> Result<()> {
        self.send(ControlMessage::Override { mode, prayer })
    }

    pub fn force_default(&self) -> Result<()> {
        self.send(ControlMessage::ForceDefault)
    }

    /// Receive the current session snapshot and every later change.
    pub fn subscribe(&self) -> Result<Receiver<SessionSnapshot>> {
        let (sender, receiver) = channel();
        self.send(ControlMessage::Subscribe(sender))?;
        Ok(receiver)
    }

    /// A sender for other threads (signal handler, config watcher).
    pub fn sender(&self) -> Sender<ControlMessage> {
        self.sender.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(|thread| thread.is_finished())
    }

    fn send(&self, message: ControlMessage) -> Result<()> {
        self.sender
            .send(message)
            .map_err(|_| anyhow::anyhow!("Scheduler is not running"))
    }

    fn join(&mut self) -> Result<()> {
        match self.thread.take() {
            Some(thread) => thread
                .join()
                .map_err(|_| anyhow::anyhow!("Scheduler thread panicked"))?,
            None => Ok(()),
        }
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        if self.thread.is_some() {
            let _ = self.sender.send(ControlMessage::Stop);
            let _ = self.join();
        }
    }
}

/// How long to sleep before the next tick.
///
/// Event-driven sleeps never cross midnight (the next day needs new prayer
/// times) and never exceed [`MAXIMUM_EVENT_SLEEP_SECS`]. Without a schedule
/// the driver retries after [`PROVIDER_RETRY_SECS`].
pub fn determine_sleep_duration(
    strategy: ScheduleStrategy,
    prayers: Option<&[PrayerSlot]>,
    now: NaiveDateTime,
    windows: &ModeWindowConfig,
    session_expires_at: Option<NaiveDateTime>,
) -> StdDuration {
    let sleep = match strategy {
        ScheduleStrategy::Polling { interval } => return interval,
        ScheduleStrategy::EventDriven => {
            let midnight = next_midnight(now.date());
            let wake = match prayers {
                Some(prayers) => next_wake_after(prayers, now, windows, session_expires_at)
                    .map_or(midnight, |wake| wake.min(midnight)),
                None => {
                    let retry = now + ChronoDuration::seconds(PROVIDER_RETRY_SECS as i64);
                    session_expires_at
                        .map(|expiry| expiry + ChronoDuration::milliseconds(BOUNDARY_SETTLE_MILLIS))
                        .filter(|expiry| *expiry > now)
                        .map_or(retry, |expiry| expiry.min(retry))
                }
            };
            (wake - now).to_std().unwrap_or(StdDuration::ZERO)
        }
    };

    sleep.clamp(
        StdDuration::from_millis(1),
        StdDuration::from_secs(MAXIMUM_EVENT_SLEEP_SECS),
    )
}

fn next_midnight(date: NaiveDate) -> NaiveDateTime {
    date.succ_opt()
        .unwrap_or(date)
        .and_time(NaiveTime::MIN)
}

struct Driver {
    manager: SessionManager,
    settings: SchedulerSettings,
    time_source: Arc<dyn TimeSource>,
    control: Receiver<ControlMessage>,
    events: Option<Sender<DisplayEvent>>,
    schedule: Option<PrayerSchedule>,
    fetch_failed_at: Option<NaiveDateTime>,
    debug_enabled: bool,
}

impl Driver {
    fn run(mut self) -> Result<()> {
        loop {
            let now = self.now();
            self.refresh_schedule(now);

            let prayers = self
                .schedule
                .as_ref()
                .map(|schedule| schedule.slots())
                .unwrap_or(&[]);
            let events = self.manager.tick(prayers, now);
            self.emit(events);

            if self.time_source.is_ended() {
                log_block_start!("Simulation reached its end time");
                return Ok(());
            }

            let sleep = determine_sleep_duration(
                self.settings.strategy,
                self.schedule.as_ref().map(|schedule| schedule.slots()),
                now,
                self.manager.config(),
                self.manager.session().expires_at(),
            );
            let sleep = if self.fetch_failed_at.is_some() {
                sleep.min(StdDuration::from_secs(PROVIDER_RETRY_SECS))
            } else {
                sleep
            };

            if self.debug_enabled {
                log_pipe!();
                log_debug!("Next tick in {}", format_sleep(sleep));
            }

            match self.wait(sleep) {
                Ok(message) => {
                    if !self.handle_message(message) {
                        return Ok(());
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    // Every handle is gone; nobody can stop us any more
                    return Ok(());
                }
            }
        }
    }

    fn now(&self) -> NaiveDateTime {
        self.time_source.now().naive_local()
    }

    /// Load prayer times when the date changes. A failed fetch keeps the
    /// previous day's times and is retried after [`PROVIDER_RETRY_SECS`].
    fn refresh_schedule(&mut self, now: NaiveDateTime) {
        let date = now.date();
        if self.schedule.as_ref().is_some_and(|s| s.date == date) {
            return;
        }
        if let Some(failed_at) = self.fetch_failed_at
            && now - failed_at < ChronoDuration::seconds(PROVIDER_RETRY_SECS as i64)
            && failed_at.date() == date
        {
            return;
        }

        match self.settings.provider.prayers_for(date) {
            Ok(schedule) => {
                self.fetch_failed_at = None;
                log_prayer_times(&schedule);
                self.emit(vec![DisplayEvent::ScheduleLoaded {
                    date,
                    prayers: schedule.slots().to_vec(),
                }]);
                self.schedule = Some(schedule);
            }
            Err(e) => {
                if self.fetch_failed_at.is_none() {
                    log_pipe!();
                    log_warning!(
                        "Could not load prayer times for {} from {}: {e}",
                        date,
                        self.settings.provider.describe()
                    );
                    if self.schedule.is_some() {
                        log_indented!("Keeping the previous day's times until it succeeds");
                    }
                }
                self.fetch_failed_at = Some(now);
            }
        }
    }

    fn emit(&mut self, events: Vec<DisplayEvent>) {
        let Some(sink) = &self.events else {
            return;
        };
        let delivered = events.into_iter().all(|event| sink.send(event).is_ok());
        if !delivered {
            self.events = None;
        }
    }

    /// Sleep for `duration`, returning early with the first control message.
    fn wait(&self, duration: StdDuration) -> Result<ControlMessage, RecvTimeoutError> {
        if !self.time_source.is_simulated() {
            return self.control.recv_timeout(duration);
        }

        // Simulated sleeps are scaled by the time source, so they run on a
        // helper thread while this one keeps listening
        let cancel = Arc::new(AtomicBool::new(false));
        let sleep_handle = thread::spawn({
            let time_source = Arc::clone(&self.time_source);
            let cancel = Arc::clone(&cancel);
            move || time_source.sleep_cancellable(duration, &cancel)
        });

        let outcome = loop {
            match self
                .control
                .recv_timeout(StdDuration::from_millis(SIMULATION_POLL_MILLIS))
            {
                Err(RecvTimeoutError::Timeout) if !sleep_handle.is_finished() => {}
                other => break other,
            }
        };

        // The clock must stop where the message arrived before the next tick
        cancel.store(true, Ordering::SeqCst);
        let _ = sleep_handle.join();
        outcome
    }

    /// Returns `false` when the driver should exit.
    fn handle_message(&mut self, message: ControlMessage) -> bool {
        match message {
            ControlMessage::Stop => {
                log_block_start!("Scheduler stopping");
                return false;
            }
            ControlMessage::Reload => {
                log_block_start!("Reloading configuration");
                match Config::load().and_then(|config| SchedulerSettings::from_config(&config)) {
                    Ok(settings) => self.apply_settings(settings),
                    Err(e) => {
                        log_warning!("Reload failed, keeping current settings: {e:#}");
                    }
                }
            }
            ControlMessage::Reconfigure(settings) => self.apply_settings(*settings),
            ControlMessage::Override { mode, prayer } => {
                let now = self.now();
                let events = self.manager.override_mode(mode, prayer, now);
                self.emit(events);
            }
            ControlMessage::ForceDefault => {
                let now = self.now();
                let events = self.manager.force_default(now);
                self.emit(events);
            }
            ControlMessage::Subscribe(sender) => self.manager.add_subscriber(sender),
        }
        true
    }

    fn apply_settings(&mut self, settings: SchedulerSettings) {
        self.manager.reconfigure(settings.windows);
        self.settings = settings;
        // The provider may have changed; fetch again on the next iteration
        self.schedule = None;
        self.fetch_failed_at = None;

        log_indented!(
            "Windows: pre-prayer {}m, adhan {}m, post-prayer {}m",
            self.settings.windows.pre_prayer_window_minutes,
            self.settings.windows.adhan_duration_minutes,
            self.settings.windows.post_prayer_duration_minutes
        );
        log_indented!("Prayer times: {}", self.settings.provider.describe());
    }
}

fn log_prayer_times(schedule: &PrayerSchedule) {
    log_block_start!(
        "Prayer times for {}{}",
        schedule.date.format("%A %Y-%m-%d"),
        if schedule.is_friday() { " (Jumu'a)" } else { "" }
    );
    for slot in schedule.slots() {
        let iqama = schedule
            .iqama_time(slot.name)
            .map(|time| format!(", iqama {}", time.format("%H:%M")))
            .unwrap_or_default();
        log_indented!("{:<8} {}{}", slot.name, slot.time.format("%H:%M"), iqama);
    }
}

fn format_sleep(duration: StdDuration) -> String {
    if duration.as_secs() == 0 {
        format!("{}ms", duration.as_millis())
    } else {
        crate::common::utils::format_duration_short(duration.as_secs())
    }
}
