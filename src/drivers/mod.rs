//! Peripheral drivers used by the firmware binary.

pub mod status_led;
pub mod watchdog;
