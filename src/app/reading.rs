//! Time-service payload parsing.
//!
//! The service returns JSON of the form
//!
//! ```json
//! {"datetime": "2023-06-15T08:30:45.123456+00:00",
//!  "day_of_year": 166, "day_of_week": 4, "dst": false}
//! ```
//!
//! Only those four fields are read.  Date and time components are taken
//! positionally from `datetime`; the fraction and zone suffix are dropped
//! without applying the offset.  `day_of_year`, `day_of_week` and `dst` are
//! passed through as the service sent them.
//!
//! Malformed payloads fail closed: a missing field, a non-numeric
//! component or a value outside its calendar range is an error and the
//! clock is left untouched.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::calendar;
use crate::error::PayloadError;

/// Broken-down wall-clock time, as produced by the time service and stored
/// by the hardware clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeReading {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    /// Day of week as reported upstream (Sunday = 0 for worldtimeapi).
    pub day_of_week: u8,
    /// Ordinal day, 1-based.
    pub day_of_year: u16,
    pub is_dst: bool,
}

#[derive(Debug, Deserialize)]
struct TimePayload {
    datetime: Option<String>,
    day_of_year: Option<i64>,
    day_of_week: Option<i64>,
    dst: Option<bool>,
}

impl TimeReading {
    /// Parse a time-service response body.
    pub fn from_json(body: &[u8]) -> Result<Self, PayloadError> {
        let payload: TimePayload = serde_json::from_slice(body).map_err(|_| PayloadError::Json)?;
        Self::from_payload(payload)
    }

    fn from_payload(p: TimePayload) -> Result<Self, PayloadError> {
        let datetime = p.datetime.ok_or(PayloadError::MissingField("datetime"))?;
        let day_of_year = p.day_of_year.ok_or(PayloadError::MissingField("day_of_year"))?;
        let day_of_week = p.day_of_week.ok_or(PayloadError::MissingField("day_of_week"))?;
        let is_dst = p.dst.ok_or(PayloadError::MissingField("dst"))?;

        let mut reading = parse_datetime(&datetime)?;
        reading.day_of_year =
            u16::try_from(day_of_year).map_err(|_| PayloadError::OutOfRange("day_of_year"))?;
        reading.day_of_week =
            u8::try_from(day_of_week).map_err(|_| PayloadError::OutOfRange("day_of_week"))?;
        reading.is_dst = is_dst;
        reading.validate()?;
        Ok(reading)
    }

    /// Range-check every field.
    pub fn validate(&self) -> Result<(), PayloadError> {
        fn check(ok: bool, name: &'static str) -> Result<(), PayloadError> {
            if ok {
                Ok(())
            } else {
                Err(PayloadError::OutOfRange(name))
            }
        }
        check((1..=12).contains(&self.month), "month")?;
        check(
            self.day >= 1 && self.day <= calendar::days_in_month(i32::from(self.year), self.month),
            "day",
        )?;
        check(self.hour < 24, "hour")?;
        check(self.minute < 60, "minute")?;
        // 60 admits a leap second
        check(self.second <= 60, "second")?;
        check(self.day_of_week <= 6, "day_of_week")?;
        check((1..=366).contains(&self.day_of_year), "day_of_year")?;
        Ok(())
    }

    /// `Y-M-D H:M:S` without zero padding, the format the console loop prints.
    pub fn display_unpadded(&self) -> Unpadded<'_> {
        Unpadded(self)
    }
}

impl fmt::Display for TimeReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

pub struct Unpadded<'a>(&'a TimeReading);

impl fmt::Display for Unpadded<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.0;
        write!(
            f,
            "{}-{}-{} {}:{}:{}",
            r.year, r.month, r.day, r.hour, r.minute, r.second
        )
    }
}

/// Split `YYYY-MM-DDTHH:MM:SS[.fraction][Z|±HH:MM]` into its six components.
///
/// Weekday, yearday and DST are left zeroed for the caller to fill.
pub fn parse_datetime(s: &str) -> Result<TimeReading, PayloadError> {
    let (date, time) = s.split_once('T').ok_or(PayloadError::MalformedDatetime)?;

    let mut parts = date.split('-');
    let year = component(parts.next(), "year")?;
    let month = component(parts.next(), "month")?;
    let day = component(parts.next(), "day")?;
    if parts.next().is_some() {
        return Err(PayloadError::MalformedDatetime);
    }

    let end = time.find(['.', 'Z', 'z', '+', '-']).unwrap_or(time.len());
    let mut parts = time[..end].split(':');
    let hour = component(parts.next(), "hour")?;
    let minute = component(parts.next(), "minute")?;
    let second = component(parts.next(), "second")?;
    if parts.next().is_some() {
        return Err(PayloadError::MalformedDatetime);
    }

    Ok(TimeReading {
        year,
        month,
        day,
        hour,
        minute,
        second,
        day_of_week: 0,
        day_of_year: 0,
        is_dst: false,
    })
}

fn component<T: FromStr>(part: Option<&str>, name: &'static str) -> Result<T, PayloadError> {
    let part = part.ok_or(PayloadError::MalformedDatetime)?;
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PayloadError::NotNumeric(name));
    }
    // All digits, so the only possible failure is overflow
    part.parse().map_err(|_| PayloadError::OutOfRange(name))
}
