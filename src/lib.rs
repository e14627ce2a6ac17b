//! # Adhanr Library
//!
//! Internal library for the adhanr binary application
//!
//! This library exists to enable testing of complex internals and provide clean separation
//! between CLI dispatch (main.rs) and application logic.
//!
//! ## Architecture
//!
//! The library is organized into several layers:
//!
//! - **Entry Point**: `Adhanr` struct runs the scheduler with resource management
//! - **Core Logic**: `core::mode` decides the display mode for an instant, `core::session`
//!   owns the displayed session, `core::scheduler` ticks it against a clock
//! - **Prayer data**: `prayer` module with the daily schedule and its JSON sources
//! - **Countdowns**: `countdown` module for clock and word countdowns in English and Arabic
//! - **Configuration**: `config` module for TOML-based settings with hot-reload
//! - **Commands**: `commands` module for CLI subcommands (status, next, simulate, help)
//! - **State**: `state` module with the snapshots and events handed to readers
//! - **Infrastructure**: Signal handling, lock file, time source, logging, and utilities

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod common;

// Public API modules
pub mod args;
pub mod commands;
pub mod config;
pub mod core;
pub mod countdown;
pub mod io;
pub mod prayer;
pub mod state;
pub mod time;

#[cfg(feature = "testing-support")]
pub mod test_support;

// Internal modules
mod adhanr;

// Re-export for binary
pub use self::adhanr::Adhanr;
