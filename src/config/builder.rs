//! Default configuration file generation.
//!
//! The default file lists every setting with its default value and an
//! aligned comment describing its range, so users can edit in place.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::common::constants::*;
use crate::common::utils::private_path;

/// Write a commented default `adhanr.toml` to `path`.
pub fn create_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    fs::write(path, default_config_content())
        .with_context(|| format!("Failed to write default config to {}", private_path(path)))?;

    log_block_start!("Created default configuration at {}", private_path(path));
    log_indented!("Edit the prayer times to match your mosque");

    Ok(())
}

/// Text of the default configuration file.
pub fn default_config_content() -> String {
    let content = ConfigBuilder::new()
        .add_section("Display windows")
        .add_setting(
            "pre_prayer_window",
            &DEFAULT_PRE_PRAYER_WINDOW.to_string(),
            "Minutes of anticipation before each adhan (0-60)",
        )
        .add_setting(
            "adhan_duration",
            &DEFAULT_ADHAN_DURATION.to_string(),
            "Minutes the adhan screen is shown (0-60)",
        )
        .add_setting(
            "post_prayer_duration",
            &DEFAULT_POST_PRAYER_DURATION.to_string(),
            "Minutes of post-prayer screen after the adhan (0-60)",
        )
        .add_section("Scheduler")
        .add_setting(
            "scheduler",
            &format!("\"{DEFAULT_SCHEDULER}\""),
            "\"polling\" or \"event\" (wake only when the mode can change)",
        )
        .add_setting(
            "update_interval",
            &DEFAULT_UPDATE_INTERVAL.to_string(),
            "Polling interval in seconds (1-60)",
        )
        .add_section("Countdown")
        .add_setting(
            "language",
            &format!("\"{DEFAULT_LANGUAGE}\""),
            "Word countdowns: \"en\" or \"ar\"",
        )
        .add_setting(
            "numerals",
            &format!("\"{DEFAULT_NUMERALS}\""),
            "Digits: \"western\" or \"arabic-indic\"",
        )
        .add_section("Prayer times")
        .add_setting("fajr", &format!("\"{DEFAULT_FAJR}\""), "Daily prayer times (HH:MM, 24h)")
        .add_setting("dhuhr", &format!("\"{DEFAULT_DHUHR}\""), "")
        .add_setting("asr", &format!("\"{DEFAULT_ASR}\""), "")
        .add_setting("maghrib", &format!("\"{DEFAULT_MAGHRIB}\""), "")
        .add_setting("isha", &format!("\"{DEFAULT_ISHA}\""), "")
        .add_comment("prayer_times_file = \"times.json\"  # Per-date list or saved API response")
        .add_table("iqama", "Minutes from adhan to iqama (0-120)")
        .add_setting("fajr", &DEFAULT_IQAMA_FAJR.to_string(), "")
        .add_setting("dhuhr", &DEFAULT_IQAMA_DHUHR.to_string(), "")
        .add_setting("asr", &DEFAULT_IQAMA_ASR.to_string(), "")
        .add_setting("maghrib", &DEFAULT_IQAMA_MAGHRIB.to_string(), "")
        .add_setting("isha", &DEFAULT_IQAMA_ISHA.to_string(), "")
        .build();

    format!("{content}\n")
}

struct ConfigBuilder {
    entries: Vec<ConfigEntry>,
}

enum ConfigEntry {
    Section(String),
    Table { header: String, comment: String },
    Setting { line: String, comment: String },
    Comment(String),
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(ConfigEntry::Section(format!("#[{title}]")));
        self
    }

    /// A real TOML table. Everything added after it belongs to the table.
    fn add_table(mut self, name: &str, comment: &str) -> Self {
        self.entries.push(ConfigEntry::Table {
            header: format!("[{name}]"),
            comment: format!("# {comment}"),
        });
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        let comment = if comment.is_empty() {
            String::new()
        } else {
            format!("# {comment}")
        };
        self.entries.push(ConfigEntry::Setting {
            line: format!("{key} = {value}"),
            comment,
        });
        self
    }

    /// A commented-out example line.
    fn add_comment(mut self, text: &str) -> Self {
        self.entries.push(ConfigEntry::Comment(format!("#{text}")));
        self
    }

    fn build(self) -> String {
        let max_width = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                ConfigEntry::Setting { line, .. } => Some(line.len()),
                ConfigEntry::Table { header, .. } => Some(header.len()),
                _ => None,
            })
            .max()
            .unwrap_or(0)
            + 1;

        let aligned = |line: &str, comment: &str| {
            if comment.is_empty() {
                line.to_string()
            } else {
                let padding = " ".repeat(max_width - line.len());
                format!("{line}{padding}{comment}")
            }
        };

        let mut result = Vec::new();
        for entry in self.entries {
            match entry {
                ConfigEntry::Section(title) => {
                    if !result.is_empty() {
                        result.push(String::new());
                    }
                    result.push(title);
                }
                ConfigEntry::Table { header, comment } => {
                    result.push(String::new());
                    result.push(aligned(&header, &comment));
                }
                ConfigEntry::Setting { line, comment } => result.push(aligned(&line, &comment)),
                ConfigEntry::Comment(text) => result.push(text),
            }
        }

        result.join("\n")
    }
}
