//! Unified error types for the NetClock firmware.
//!
//! A single `Error` enum that every subsystem converts into, so the startup
//! glue and the retry loops can match on one type.  Subsystem variants are
//! `Copy` and carry no heap data.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The hard reset of the radio itself failed.  Not recoverable.
    Reset(LinkError),
    /// The HTTP layer failed to deliver a response.
    Http(HttpError),
    /// The time-service payload could not be turned into a reading.
    Payload(PayloadError),
    /// The hardware clock rejected the write.
    Clock(ClockError),
    /// A bounded retry policy ran out of attempts.
    RetriesExhausted { operation: Operation, attempts: u32 },
    /// Configuration or secrets are invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reset(e) => write!(f, "radio reset failed: {e}"),
            Self::Http(e) => write!(f, "http: {e}"),
            Self::Payload(e) => write!(f, "payload: {e}"),
            Self::Clock(e) => write!(f, "clock: {e}"),
            Self::RetriesExhausted { operation, attempts } => {
                write!(f, "{operation} gave up after {attempts} attempts")
            }
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

/// Which retry loop gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Connect,
    FetchTime,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => write!(f, "connect"),
            Self::FetchTime => write!(f, "time fetch"),
        }
    }
}

// ---------------------------------------------------------------------------
// Link (radio driver) errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// The driver did not answer in time.
    Timeout,
    /// The module answered with something other than `OK`.
    NotOk,
    /// The access point refused or never completed association.
    AssociationFailed,
    /// The driver itself is in an unusable state.
    Driver,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "driver timeout"),
            Self::NotOk => write!(f, "module did not reply OK"),
            Self::AssociationFailed => write!(f, "association failed"),
            Self::Driver => write!(f, "driver error"),
        }
    }
}

// ---------------------------------------------------------------------------
// HTTP errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpError {
    /// URL could not be parsed.
    InvalidUrl,
    /// Only plain `http://` is supported.
    UnsupportedScheme,
    /// Name resolution or TCP connect failed.
    Connect,
    /// Socket read/write failed mid-request.
    Io,
    /// Request timed out.
    Timeout,
    /// Status line or headers could not be parsed.
    MalformedResponse,
    /// The network stack refused the socket operation (no route, link down).
    NotOk,
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUrl => write!(f, "invalid URL"),
            Self::UnsupportedScheme => write!(f, "unsupported URL scheme"),
            Self::Connect => write!(f, "connect failed"),
            Self::Io => write!(f, "socket I/O error"),
            Self::Timeout => write!(f, "request timed out"),
            Self::MalformedResponse => write!(f, "malformed HTTP response"),
            Self::NotOk => write!(f, "module did not reply OK"),
        }
    }
}

impl From<HttpError> for Error {
    fn from(e: HttpError) -> Self {
        Self::Http(e)
    }
}

// ---------------------------------------------------------------------------
// Payload errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadError {
    /// Body is not valid JSON or a field has the wrong JSON type.
    Json,
    /// A required field is absent.
    MissingField(&'static str),
    /// `datetime` does not have the `DATE T TIME` shape.
    MalformedDatetime,
    /// A component is not a decimal integer.
    NotNumeric(&'static str),
    /// A component is outside its calendar range.
    OutOfRange(&'static str),
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "body is not the expected JSON"),
            Self::MissingField(name) => write!(f, "missing field `{name}`"),
            Self::MalformedDatetime => write!(f, "datetime is not YYYY-MM-DDTHH:MM:SS"),
            Self::NotNumeric(name) => write!(f, "`{name}` is not numeric"),
            Self::OutOfRange(name) => write!(f, "`{name}` out of range"),
        }
    }
}

impl From<PayloadError> for Error {
    fn from(e: PayloadError) -> Self {
        Self::Payload(e)
    }
}

// ---------------------------------------------------------------------------
// Clock errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockError {
    /// The peripheral refused the value (e.g. year before its epoch).
    Unsupported,
    /// The underlying platform call failed.
    Platform,
}

impl fmt::Display for ClockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported => write!(f, "datetime not supported by clock"),
            Self::Platform => write!(f, "platform clock call failed"),
        }
    }
}

impl From<ClockError> for Error {
    fn from(e: ClockError) -> Self {
        Self::Clock(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
