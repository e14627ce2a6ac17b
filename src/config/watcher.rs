//! Hot reload of `adhanr.toml` and the prayer-times file.
//!
//! Parent directories are watched rather than the files themselves, because
//! most editors save by writing a temporary file and renaming it over the
//! original. Matching events are debounced and forwarded to the scheduler as
//! [`ControlMessage::Reload`].

use anyhow::{Context, Result};
use notify::{
    Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::thread;
use std::time::{Duration, Instant};

use super::Config;
use crate::common::utils::private_path;
use crate::core::scheduler::ControlMessage;

/// Editors often write a file in several steps; one reload per burst.
const DEBOUNCE_MS: u64 = 500;

/// Watches configuration inputs and asks the scheduler to reload.
pub struct ConfigWatcher {
    control: Sender<ControlMessage>,
    debug_enabled: bool,
    watched_files: Vec<PathBuf>,
}

impl ConfigWatcher {
    pub fn new(control: Sender<ControlMessage>, config: &Config, debug_enabled: bool) -> Result<Self> {
        let mut watched_files = vec![Config::get_config_path()?];
        if let Some(path) = config.prayer_times_path() {
            watched_files.push(path);
        }

        Ok(Self {
            control,
            debug_enabled,
            watched_files,
        })
    }

    /// Spawn the watcher thread.
    pub fn start(self) -> Result<()> {
        let (tx, rx) = std::sync::mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res
                    && matches!(
                        event.kind,
                        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                    )
                {
                    let _ = tx.send(event);
                }
            },
            NotifyConfig::default(),
        )
        .context("Failed to create file watcher")?;

        let mut watched_dirs = HashSet::new();
        for file in &self.watched_files {
            if let Some(parent) = file.parent()
                && parent.is_dir()
                && watched_dirs.insert(parent.to_path_buf())
            {
                watcher
                    .watch(parent, RecursiveMode::NonRecursive)
                    .with_context(|| format!("Failed to watch directory: {}", private_path(parent)))?;
            }
        }

        if self.debug_enabled {
            log_pipe!();
            log_debug!("Watching for configuration changes:");
            for file in &self.watched_files {
                log_indented!("{}", private_path(file));
            }
        }

        let Self {
            control,
            debug_enabled,
            watched_files,
        } = self;

        thread::spawn(move || {
            // The watcher stops when dropped, so it lives in this thread
            let _watcher = watcher;
            let mut last_reload: Option<Instant> = None;

            for event in rx {
                if !event_affects(&event.paths, &watched_files) {
                    continue;
                }

                if last_reload.is_some_and(|at| at.elapsed() < Duration::from_millis(DEBOUNCE_MS)) {
                    continue;
                }

                if debug_enabled {
                    log_pipe!();
                    log_info!("Configuration change detected");
                }

                if control.send(ControlMessage::Reload).is_err() {
                    // Scheduler is gone
                    break;
                }
                last_reload = Some(Instant::now());
            }
        });

        Ok(())
    }
}

/// Whether any changed path refers to one of the watched files, including
/// editor temporaries such as `adhanr.toml~` or `adhanr.toml.swp`.
pub fn event_affects(changed: &[PathBuf], watched: &[PathBuf]) -> bool {
    changed.iter().any(|changed_path| {
        watched.iter().any(|watched_path| same_file_or_temp(changed_path, watched_path))
    })
}

fn same_file_or_temp(changed: &Path, watched: &Path) -> bool {
    if changed == watched {
        return true;
    }
    if changed.parent() != watched.parent() {
        return false;
    }
    match (
        changed.file_name().and_then(|n| n.to_str()),
        watched.file_name().and_then(|n| n.to_str()),
    ) {
        (Some(changed_name), Some(watched_name)) => {
            changed_name.trim_start_matches('.').starts_with(watched_name)
        }
        _ => false,
    }
}

/// Start watching the active configuration for changes.
pub fn start_config_watcher(
    control: Sender<ControlMessage>,
    config: &Config,
    debug_enabled: bool,
) -> Result<()> {
    ConfigWatcher::new(control, config, debug_enabled)?.start()
}
