//! Scheduling core.
//!
//! - [`mode`]: pure functions that decide which screen a prayer schedule calls
//!   for at a given instant, when that will change, and when a session has
//!   outlived its window;
//! - [`session`]: the single owner of the current display session;
//! - [`scheduler`]: the thread that ticks the session against a clock.
//!
//! Nothing in `mode` reads the clock or holds state, so the same functions
//! serve the live scheduler, `adhanr status`, `adhanr next` and the tests.

pub mod mode;
pub mod scheduler;
pub mod session;
