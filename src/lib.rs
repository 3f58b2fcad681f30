//! NetClock firmware library.
//!
//! Keeps a hardware real-time clock in sync with an HTTP time service over
//! WiFi.  The application core in [`app`] is pure logic behind port traits;
//! [`adapters`] and [`drivers`] supply the ESP-IDF implementations and the
//! host simulations used by the tests.  All ESP-IDF-specific code is guarded
//! by `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod calendar;
pub mod config;
pub mod drivers;
pub mod error;

pub use error::{Error, Result};
