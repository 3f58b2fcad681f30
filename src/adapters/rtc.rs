//! Real-time clock adapter.
//!
//! Implements [`HardwareClock`].  The clock keeps UTC; `is_dst` is carried
//! along as reported by the time service.
//!
//! - **`target_os = "espidf"`**: sets the system clock with
//!   `settimeofday()` and reads it back with `gettimeofday()` + `gmtime_r()`.
//! - **`not(target_os = "espidf")`**: keeps the last value set plus the
//!   `std::time::Instant` it was set at, and advances it on read.  Reads
//!   start at 1970-01-01 until the first set, like an RTC after power-on.

use log::debug;

use crate::app::ports::HardwareClock;
use crate::app::reading::TimeReading;
use crate::calendar;
use crate::error::ClockError;

pub struct RtcAdapter {
    #[cfg(target_os = "espidf")]
    is_dst: bool,

    #[cfg(not(target_os = "espidf"))]
    base: TimeReading,
    #[cfg(not(target_os = "espidf"))]
    set_at: std::time::Instant,
    #[cfg(not(target_os = "espidf"))]
    set_counter: u32,
}

impl Default for RtcAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl RtcAdapter {
    pub fn new() -> Self {
        Self {
            #[cfg(target_os = "espidf")]
            is_dst: false,
            #[cfg(not(target_os = "espidf"))]
            base: calendar::from_epoch_seconds(0, false),
            #[cfg(not(target_os = "espidf"))]
            set_at: std::time::Instant::now(),
            #[cfg(not(target_os = "espidf"))]
            set_counter: 0,
        }
    }

    /// Number of successful `set_datetime` calls (simulation only).
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_count(&self) -> u32 {
        self.set_counter
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
impl HardwareClock for RtcAdapter {
    fn set_datetime(&mut self, reading: &TimeReading) -> Result<(), ClockError> {
        let secs = calendar::to_epoch_seconds(reading);
        if secs < 0 {
            return Err(ClockError::Unsupported);
        }
        let tv = esp_idf_svc::sys::timeval {
            tv_sec: secs as esp_idf_svc::sys::time_t,
            tv_usec: 0,
        };
        if unsafe { esp_idf_svc::sys::settimeofday(&tv, core::ptr::null()) } != 0 {
            return Err(ClockError::Platform);
        }
        self.is_dst = reading.is_dst;
        debug!("RTC(espidf): set to {} ({}s)", reading, secs);
        Ok(())
    }

    fn datetime(&self) -> Result<TimeReading, ClockError> {
        let mut tv = esp_idf_svc::sys::timeval {
            tv_sec: 0,
            tv_usec: 0,
        };
        if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, core::ptr::null_mut()) } != 0 {
            return Err(ClockError::Platform);
        }
        let secs = tv.tv_sec as esp_idf_svc::sys::time_t;
        let mut tm: esp_idf_svc::sys::tm = unsafe { core::mem::zeroed() };
        if unsafe { esp_idf_svc::sys::gmtime_r(&secs, &mut tm) }.is_null() {
            return Err(ClockError::Platform);
        }
        let field = |v: i32| u8::try_from(v).map_err(|_| ClockError::Platform);
        Ok(TimeReading {
            year: u16::try_from(tm.tm_year + 1900).map_err(|_| ClockError::Platform)?,
            month: field(tm.tm_mon + 1)?,
            day: field(tm.tm_mday)?,
            hour: field(tm.tm_hour)?,
            minute: field(tm.tm_min)?,
            second: field(tm.tm_sec)?,
            day_of_week: field(tm.tm_wday)?,
            day_of_year: u16::try_from(tm.tm_yday + 1).map_err(|_| ClockError::Platform)?,
            is_dst: self.is_dst,
        })
    }
}

// ───────────────────────────────────────────────────────────────
// Host (simulation)
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
impl HardwareClock for RtcAdapter {
    fn set_datetime(&mut self, reading: &TimeReading) -> Result<(), ClockError> {
        if reading.year < 1970 {
            return Err(ClockError::Unsupported);
        }
        self.base = *reading;
        self.set_at = std::time::Instant::now();
        self.set_counter += 1;
        debug!("RTC(sim): set to {}", reading);
        Ok(())
    }

    fn datetime(&self) -> Result<TimeReading, ClockError> {
        Ok(calendar::advance(&self.base, self.set_at.elapsed().as_secs()))
    }
}
