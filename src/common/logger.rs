//! Structured terminal logging with box-drawing decoration.
//!
//! Every line adhanr prints goes through the macros in this module so the
//! output keeps one visual language:
//!
//! ```text
//! ┏ adhanr v0.3.0 ━━╸
//! ┃
//! ┣ Loaded prayer schedule for 2026-10-18
//! ┃   Fajr     05:00
//! ┃   Dhuhr    12:30
//! ┣[INFO] Scheduler running (polling every 1s)
//! ╹
//! ```
//!
//! ## Conventions
//!
//! - `log_block_start!` opens a new conceptual block (blank pipe, then `┣ message`).
//!   Use it for mode changes, configuration loads and other notable events.
//! - `log_decorated!` continues the current block with `┣ message`.
//! - `log_indented!` prints nested detail under the previous line (`┃   message`).
//! - `log_pipe!` inserts a lone `┃`, mostly before a `log_warning!`/`log_error!`
//!   that starts its own block.
//! - `log_version!` / `log_end!` frame the whole session.
//! - `log_info!`, `log_warning!`, `log_error!`, `log_debug!`, `log_critical!` carry a
//!   coloured `[LEVEL]` tag and no other decoration.
//! - `log_error_exit!` closes the log with a terminal `┗[ERROR]` line.
//!
//! Logging can be switched off globally (tests, `--json` output) with
//! [`Log::set_enabled`]. While time is simulated each line is prefixed with the
//! simulated wall-clock time so that a run can be read back like a real day.

use std::io::Write;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Sender, channel};

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);

// Set once when `--log` style file capture is requested (simulation runs).
static LOG_CHANNEL: OnceLock<Sender<LogMessage>> = OnceLock::new();

enum LogMessage {
    Line(String),
    Shutdown,
}

/// Entry point for runtime control of the logger.
pub struct Log;

impl Log {
    /// Enable or disable all log output.
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    /// Check if logging is currently enabled.
    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Route all further output into `file_path` instead of stdout.
    ///
    /// The returned guard flushes and closes the file when dropped.
    pub fn start_file_logging(file_path: String) -> anyhow::Result<LoggerGuard> {
        let (tx, rx) = channel();

        LOG_CHANNEL
            .set(tx.clone())
            .map_err(|_| anyhow::anyhow!("Logger channel already initialized"))?;

        let handle = std::thread::spawn(move || {
            let mut file = std::fs::File::create(&file_path)?;
            loop {
                match rx.recv() {
                    Ok(LogMessage::Line(text)) => file.write_all(text.as_bytes())?,
                    Ok(LogMessage::Shutdown) | Err(_) => {
                        file.flush()?;
                        break;
                    }
                }
            }
            Ok::<(), anyhow::Error>(())
        });

        Ok(LoggerGuard {
            tx,
            handle: Some(handle),
        })
    }

    /// Timestamp prefix shown only while the time source is simulated.
    pub fn timestamp_prefix() -> String {
        if crate::time::source::is_initialized() && crate::time::source::is_simulated() {
            format!("[{}] ", crate::time::source::now().format("%H:%M:%S"))
        } else {
            String::new()
        }
    }
}

/// Guard for file logging that flushes on drop.
pub struct LoggerGuard {
    tx: Sender<LogMessage>,
    handle: Option<std::thread::JoinHandle<anyhow::Result<()>>>,
}

impl Drop for LoggerGuard {
    fn drop(&mut self) {
        let _ = self.tx.send(LogMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Remove ANSI colour sequences (`ESC [ ... m`) for file output.
fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == 'm' {
                    break;
                }
            }
        } else {
            result.push(ch);
        }
    }

    result
}

/// Write one already formatted line to the active sink.
pub fn write_output(text: &str) {
    if let Some(tx) = LOG_CHANNEL.get() {
        let _ = tx.send(LogMessage::Line(strip_ansi_codes(text)));
    } else {
        print!("{text}");
        let _ = std::io::stdout().flush();
    }
}

/// Format `body` with the simulation prefix applied to each physical line.
///
/// `lead` is emitted before the first line (for example `"┃\n"` for block starts).
pub fn emit(lead: &str, marker: &str, body: &str) {
    if !Log::is_enabled() {
        return;
    }
    let prefix = Log::timestamp_prefix();
    let mut out = String::new();
    for lead_line in lead.lines() {
        out.push_str(&prefix);
        out.push_str(lead_line);
        out.push('\n');
    }
    out.push_str(&prefix);
    out.push_str(marker);
    out.push_str(body);
    out.push('\n');
    write_output(&out);
}

// # Logging Macros

#[doc(hidden)]
#[macro_export]
macro_rules! __log_line {
    ($lead:expr, $marker:expr, $fmt:literal $($arg:tt)*) => {{
        if $crate::common::logger::Log::is_enabled() {
            let message = format!($fmt $($arg)*);
            $crate::common::logger::emit($lead, $marker, &message);
        }
    }};
    ($lead:expr, $marker:expr, $expr:expr) => {{
        if $crate::common::logger::Log::is_enabled() {
            let message = format!("{}", $expr);
            $crate::common::logger::emit($lead, $marker, &message);
        }
    }};
}

/// Continue the current block: `┣ message`.
#[macro_export]
macro_rules! log_decorated {
    ($($t:tt)*) => { $crate::__log_line!("", "┣ ", $($t)*) };
}

/// Nested detail: `┃   message`.
#[macro_export]
macro_rules! log_indented {
    ($($t:tt)*) => { $crate::__log_line!("", "┃   ", $($t)*) };
}

/// Start a new block: `┃` then `┣ message`.
#[macro_export]
macro_rules! log_block_start {
    ($($t:tt)*) => { $crate::__log_line!("┃", "┣ ", $($t)*) };
}

/// Empty pipe line for vertical spacing.
#[macro_export]
macro_rules! log_pipe {
    () => {
        $crate::__log_line!("", "┃", "")
    };
}

/// Application header.
#[macro_export]
macro_rules! log_version {
    () => {
        $crate::__log_line!("", "┏ ", "adhanr v{} ━━╸", env!("CARGO_PKG_VERSION"))
    };
}

/// Final termination marker.
#[macro_export]
macro_rules! log_end {
    () => {
        $crate::__log_line!("", "╹", "")
    };
}

#[macro_export]
macro_rules! log_info {
    ($($t:tt)*) => { $crate::__log_line!("", "┣[\x1b[32mINFO\x1b[0m] ", $($t)*) };
}

#[macro_export]
macro_rules! log_warning {
    ($($t:tt)*) => { $crate::__log_line!("", "┣[\x1b[33mWARNING\x1b[0m] ", $($t)*) };
}

/// Warning without the pipe decoration, for output before the header.
#[macro_export]
macro_rules! log_warning_standalone {
    ($($t:tt)*) => { $crate::__log_line!("", "[\x1b[33mWARNING\x1b[0m] ", $($t)*) };
}

#[macro_export]
macro_rules! log_error {
    ($($t:tt)*) => { $crate::__log_line!("", "┣[\x1b[31mERROR\x1b[0m] ", $($t)*) };
}

/// Error that terminates the log: `┃` then `┗[ERROR] message`.
#[macro_export]
macro_rules! log_error_exit {
    ($($t:tt)*) => { $crate::__log_line!("┃", "┗[\x1b[31mERROR\x1b[0m] ", $($t)*) };
}

#[macro_export]
macro_rules! log_debug {
    ($($t:tt)*) => { $crate::__log_line!("", "┣[\x1b[32mDEBUG\x1b[0m] ", $($t)*) };
}

#[macro_export]
macro_rules! log_critical {
    ($($t:tt)*) => { $crate::__log_line!("", "┣[\x1b[31mCRITICAL\x1b[0m] ", $($t)*) };
}
