//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ConnectivityManager / TimeSynchronizer
//! ```
//!
//! Driven adapters (radio, HTTP, RTC, status LED) implement these traits.
//! The domain types own their collaborators by value and are generic over
//! them, so nothing in `app` touches hardware or a global socket directly.

use serde::de::DeserializeOwned;

use crate::config::Credentials;
use crate::error::{ClockError, HttpError, LinkError, PayloadError};

use super::reading::TimeReading;
use super::status::PixelStatus;

// ───────────────────────────────────────────────────────────────
// Network driver port (radio / modem)
// ───────────────────────────────────────────────────────────────

/// The radio driver the connectivity manager sits on.
pub trait NetworkDriver {
    /// Associate with the access point described by `credentials`.
    ///
    /// Blocking.  Any failure (timeout, `not-OK` reply, bad passphrase)
    /// comes back as a [`LinkError`].
    fn connect(&mut self, credentials: &Credentials) -> Result<(), LinkError>;

    /// Whether the driver currently holds an association.
    fn is_connected(&self) -> bool;

    /// Force the radio back to its power-on state, dropping any association
    /// and in-flight operation.
    fn hard_reset(&mut self) -> Result<(), LinkError>;
}

// ───────────────────────────────────────────────────────────────
// HTTP client port
// ───────────────────────────────────────────────────────────────

/// Extra request parameters forwarded to the HTTP client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Additional request headers.
    pub headers: Vec<(String, String)>,
    /// Overall request timeout.  `None` leaves the client's default.
    pub timeout_ms: Option<u32>,
}

impl RequestOptions {
    pub fn with_timeout(timeout_ms: u32) -> Self {
        Self {
            headers: Vec::new(),
            timeout_ms: Some(timeout_ms),
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// A fully buffered HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// `true` for any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, PayloadError> {
        serde_json::from_slice(&self.body).map_err(|_| PayloadError::Json)
    }
}

/// Blocking HTTP GET.  Implementations must not retry on their own.
pub trait HttpClient {
    fn get(&mut self, url: &str, options: &RequestOptions) -> Result<Response, HttpError>;
}

// ───────────────────────────────────────────────────────────────
// Hardware clock port
// ───────────────────────────────────────────────────────────────

/// The device's time-keeping peripheral.
pub trait HardwareClock {
    /// Replace the clock value in one write.
    fn set_datetime(&mut self, datetime: &TimeReading) -> Result<(), ClockError>;

    /// Current broken-down time.
    fn datetime(&self) -> Result<TimeReading, ClockError>;
}

// ───────────────────────────────────────────────────────────────
// Status indicator port
// ───────────────────────────────────────────────────────────────

/// Cosmetic status output (RGB pixel, discrete LEDs, nothing at all).
pub trait StatusIndicator {
    fn fill(&mut self, status: PixelStatus);
}
