//! Application coordinator that manages the complete lifecycle of adhanr.
//!
//! This module handles resource acquisition, initialization, and orchestration
//! of the scheduler. It manages:
//! - Lock file management for single-instance enforcement
//! - Configuration loading
//! - Signal handler setup
//! - Config watcher for hot reload
//! - Event output (`--json`)
//!
//! The `Adhanr` struct uses a builder pattern to support different startup contexts:
//! - Normal startup: `Adhanr::new(debug_enabled).run()`
//! - JSON event stream: `Adhanr::new(debug_enabled).with_json_events().run()`
//! - Simulation mode: `Adhanr::new(debug_enabled).without_lock().without_headers().run()`

use anyhow::{Context, Result};
use std::sync::mpsc::channel;

use crate::{
    config::{self, Config},
    core::scheduler::{Scheduler, SchedulerParams, SchedulerSettings},
    io::lock,
    io::signals::setup_signal_handler,
    state::DisplayEvent,
};

/// Builder for configuring and running the adhanr scheduler.
///
/// # Examples
///
/// ```no_run
/// use adhanr::Adhanr;
///
/// # fn main() -> anyhow::Result<()> {
/// // Normal application startup
/// Adhanr::new(false).run()?;
///
/// // Simulation mode
/// Adhanr::new(true).without_lock().without_headers().run()?;
/// # Ok(())
/// # }
/// ```
pub struct Adhanr {
    debug_enabled: bool,
    create_lock: bool,
    show_headers: bool,
    json_events: bool,
}

impl Adhanr {
    /// Create a new runner with defaults matching normal run
    pub fn new(debug_enabled: bool) -> Self {
        Self {
            debug_enabled,
            create_lock: true,
            show_headers: true,
            json_events: false,
        }
    }

    /// Skip lock file creation (simulations must not block a real instance)
    pub fn without_lock(mut self) -> Self {
        self.create_lock = false;
        self
    }

    /// Skip header display (already shown by the caller)
    pub fn without_headers(mut self) -> Self {
        self.show_headers = false;
        self
    }

    /// Print every display event as a JSON line on stdout
    pub fn with_json_events(mut self) -> Self {
        self.json_events = true;
        self
    }

    /// Execute the application with the configured settings.
    ///
    /// Blocks until the scheduler stops: on a shutdown signal, or when a
    /// simulated clock reaches its end time.
    pub fn run(self) -> Result<()> {
        if self.show_headers {
            log_version!();

            if self.debug_enabled {
                log_pipe!();
                log_debug!("Debug mode enabled - showing scheduler timing");
            }
        }

        let _lock = if self.create_lock {
            match lock::acquire_lock()? {
                Some(lock) => {
                    log_block_start!("Lock acquired, starting adhanr...");
                    Some(lock)
                }
                None => {
                    log_pipe!();
                    match lock::running_instance() {
                        Some(owner) => log_error!("adhanr is already running (PID: {})", owner.pid),
                        None => log_error!("adhanr is already running"),
                    }
                    log_block_start!("Did you mean to:");
                    log_indented!("• Check the current mode: adhanr status");
                    log_indented!("• Reload configuration: kill -USR2 <pid>");
                    anyhow::bail!("Cannot start - another adhanr instance is running");
                }
            }
        } else {
            None
        };

        let config = Config::load()?;
        config.log_config();

        let settings =
            SchedulerSettings::from_config(&config).context("Failed to set up prayer times")?;

        let (events_tx, events_rx) = channel::<DisplayEvent>();
        let handle = Scheduler::spawn(SchedulerParams {
            settings,
            time_source: crate::time::source::shared(),
            events: self.json_events.then_some(events_tx),
            debug_enabled: self.debug_enabled,
        })?;

        let signal_state = setup_signal_handler(handle.sender(), self.debug_enabled)?;

        if !crate::time::source::is_simulated()
            && let Err(e) = config::start_config_watcher(handle.sender(), &config, self.debug_enabled)
        {
            log_pipe!();
            log_warning!("Hot reload disabled: {e}");
        }

        if self.json_events {
            // Ends when the scheduler drops its sender
            for event in events_rx {
                println!("{}", event.to_json_line()?);
            }
        }

        handle.wait()?;

        if !signal_state.is_running() {
            log_block_start!("Shutdown complete");
        }
        log_end!();

        Ok(())
    }
}
