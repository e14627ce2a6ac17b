//! Time handling: the clock abstraction used by the driver.

pub mod source;
