//! System configuration parameters and network secrets.
//!
//! [`SyncConfig`] holds the tunables for connection recovery and time
//! fetching.  [`Credentials`] is loaded once at startup from a JSON secrets
//! document and stays read-only for the life of the process.

use core::fmt;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::app::retry::RetryPolicy;
use crate::error::{Error, Result};

/// Default time-service endpoint (IP-geolocated local time).
pub const DEFAULT_TIME_API_URL: &str = "http://worldtimeapi.org/api/ip";

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    // --- Connectivity ---
    /// Consecutive connect failures tolerated before a radio hard reset.
    pub attempts_threshold: u32,
    /// How many driver connect attempts `connect()` may make.
    pub connect_retry: RetryPolicy,

    // --- Time service ---
    /// Endpoint returning the `datetime` / `day_of_year` / `day_of_week` / `dst` JSON.
    pub time_api_url: String,
    /// How many GETs `get_time()` may issue.
    pub fetch_retry: RetryPolicy,
    /// Per-request timeout handed to the HTTP client (milliseconds).
    pub request_timeout_ms: u32,

    // --- Timing ---
    /// Sleep between clock reads in the main loop (seconds).
    pub poll_interval_secs: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            attempts_threshold: 2,
            connect_retry: RetryPolicy::Forever,

            time_api_url: String::from(DEFAULT_TIME_API_URL),
            fetch_retry: RetryPolicy::Forever,
            request_timeout_ms: 10_000,

            poll_interval_secs: 5,
        }
    }
}

impl SyncConfig {
    /// Reject values that would make the retry loops misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.attempts_threshold == 0 {
            return Err(Error::Config("attempts_threshold must be at least 1"));
        }
        if !self.time_api_url.starts_with("http://") {
            return Err(Error::Config("time_api_url must be a plain http:// URL"));
        }
        if self.poll_interval_secs == 0 {
            return Err(Error::Config("poll_interval_secs must be at least 1"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// WiFi and service credentials.
///
/// Unknown keys in the secrets document are kept in [`extra`](Self::extra)
/// so the startup glue can hand them to other services.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub ssid: heapless::String<32>,
    #[serde(default)]
    pub password: heapless::String<64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aio_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aio_key: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Credentials {
    /// Build validated station credentials.  An empty password means an open network.
    pub fn new(ssid: &str, password: &str) -> Result<Self> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        let mut creds = Self {
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            aio_username: None,
            aio_key: None,
            extra: BTreeMap::new(),
        };
        creds
            .ssid
            .push_str(ssid)
            .map_err(|()| Error::Config("SSID too long"))?;
        creds
            .password
            .push_str(password)
            .map_err(|()| Error::Config("password too long"))?;
        Ok(creds)
    }

    /// Parse and validate a JSON secrets document.
    pub fn from_json(json: &str) -> Result<Self> {
        let creds: Self = serde_json::from_str(json)
            .map_err(|_| Error::Config("secrets are not a valid credentials object"))?;
        validate_ssid(&creds.ssid)?;
        validate_password(&creds.password)?;
        Ok(creds)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("ssid", &self.ssid)
            .field("password", &"<redacted>")
            .field("aio_username", &self.aio_username)
            .field("extra_keys", &self.extra.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<()> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(Error::Config("SSID must be 1-32 printable ASCII bytes"));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(Error::Config("password must be 8-64 bytes for WPA2, or empty for open"));
    }
    Ok(())
}
