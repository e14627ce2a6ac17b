//! Unix signal handling.
//!
//! Signals are turned into [`ControlMessage`]s on the scheduler's channel:
//!
//! - `SIGINT`, `SIGTERM`, `SIGHUP`: stop the scheduler;
//! - `SIGUSR2`: reload `adhanr.toml`.
//!
//! A second shutdown signal while the first is still being handled exits
//! immediately.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM, SIGUSR2},
    iterator::Signals,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread;

use crate::common::constants::EXIT_FAILURE;
use crate::core::scheduler::ControlMessage;

/// What a received signal asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    Shutdown,
    Reload,
    Ignore,
}

/// Map a raw signal number to an action.
pub fn classify_signal(signal: i32) -> SignalAction {
    match signal {
        SIGINT | SIGTERM | SIGHUP => SignalAction::Shutdown,
        SIGUSR2 => SignalAction::Reload,
        _ => SignalAction::Ignore,
    }
}

/// Shared flag cleared once shutdown has been requested.
#[derive(Clone)]
pub struct SignalState {
    pub running: Arc<AtomicBool>,
}

impl SignalState {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Spawn the signal thread, forwarding to `control`.
pub fn setup_signal_handler(
    control: Sender<ControlMessage>,
    debug_enabled: bool,
) -> Result<SignalState> {
    let running = Arc::new(AtomicBool::new(true));
    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP, SIGUSR2])
        .context("failed to register signal handlers")?;

    let running_clone = Arc::clone(&running);
    thread::spawn(move || {
        for sig in signals.forever() {
            let message = match classify_signal(sig) {
                SignalAction::Shutdown => {
                    if !running_clone.swap(false, Ordering::SeqCst) {
                        // Second request: the scheduler is stuck, leave now
                        log_pipe!();
                        log_warning!("Forced exit");
                        log_end!();
                        std::process::exit(EXIT_FAILURE);
                    }
                    log_pipe!();
                    log_info!("Received shutdown signal");
                    ControlMessage::Stop
                }
                SignalAction::Reload => {
                    log_pipe!();
                    log_info!("Received reload signal");
                    ControlMessage::Reload
                }
                SignalAction::Ignore => {
                    if debug_enabled {
                        log_debug!("Ignoring signal {}", sig);
                    }
                    continue;
                }
            };

            if control.send(message).is_err() {
                // Scheduler already gone
                break;
            }
        }
    });

    Ok(SignalState { running })
}

#[cfg(test)]
mod tests {
    use super::*;
    use signal_hook::consts::signal::SIGUSR1;

    #[test]
    fn test_classify_signal() {
        assert_eq!(classify_signal(SIGINT), SignalAction::Shutdown);
        assert_eq!(classify_signal(SIGTERM), SignalAction::Shutdown);
        assert_eq!(classify_signal(SIGHUP), SignalAction::Shutdown);
        assert_eq!(classify_signal(SIGUSR2), SignalAction::Reload);
        assert_eq!(classify_signal(SIGUSR1), SignalAction::Ignore);
    }
}
