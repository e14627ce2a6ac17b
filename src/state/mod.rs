//! Outbound state: snapshots for observers, events for `--json` consumers and
//! the status view.

pub mod display;
pub mod events;

pub use display::{DisplayState, SessionSnapshot};
pub use events::DisplayEvent;
