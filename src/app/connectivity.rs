//! Connectivity manager: association lifecycle with bounded recovery.
//!
//! ```text
//!   Disconnected ──connect()──▶ Connecting ──driver ok──▶ Connected
//!        ▲                          │                        │
//!        └──── failure / reset ─────┘◀──── link lost ────────┘
//! ```
//!
//! `connect()` keeps calling the driver until it reports an association.
//! Every `attempts_threshold` consecutive failures the radio is hard-reset
//! and the counter starts over.  Retries are immediate; there is no
//! backoff.

use log::{debug, info, warn};

use crate::config::{Credentials, SyncConfig};
use crate::error::{Error, Operation, Result};

use super::ports::{NetworkDriver, StatusIndicator};
use super::retry::RetryPolicy;
use super::status::{NoStatus, PixelStatus};

/// Explicit link state, moved only by [`ConnectivityManager`] transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connecting,
    Connected,
}

/// Owns the radio driver and the consecutive-failure counter.
pub struct ConnectivityManager<D, S = NoStatus> {
    driver: D,
    credentials: Credentials,
    status: S,
    state: LinkState,
    /// Consecutive connect failures since the last success or reset.
    failure_count: u32,
    attempts_threshold: u32,
    retry: RetryPolicy,
    reset_count: u32,
    heartbeat: Box<dyn FnMut()>,
}

impl<D: NetworkDriver> ConnectivityManager<D, NoStatus> {
    /// Manager without a status indicator.
    pub fn new(driver: D, credentials: Credentials, config: &SyncConfig) -> Self {
        Self::with_status(driver, credentials, NoStatus, config)
    }
}

impl<D: NetworkDriver, S: StatusIndicator> ConnectivityManager<D, S> {
    pub fn with_status(driver: D, credentials: Credentials, status: S, config: &SyncConfig) -> Self {
        Self {
            driver,
            credentials,
            status,
            state: LinkState::Disconnected,
            failure_count: 0,
            attempts_threshold: config.attempts_threshold.max(1),
            retry: config.connect_retry,
            reset_count: 0,
            heartbeat: Box::new(|| {}),
        }
    }

    /// Install a callback run once per retry-loop iteration (e.g. to feed
    /// the task watchdog while `connect()` or `get_time()` spin).
    #[must_use]
    pub fn with_heartbeat(mut self, heartbeat: impl FnMut() + 'static) -> Self {
        self.heartbeat = Box::new(heartbeat);
        self
    }

    // ── Operations ────────────────────────────────────────────

    /// Block until the driver reports an association.
    ///
    /// Only returns an error when the retry policy is exhausted or the radio
    /// reset itself fails.
    pub fn connect(&mut self) -> Result<()> {
        if !self.driver.is_connected() && self.state == LinkState::Connected {
            self.link_lost();
        }

        let mut attempts: u32 = 0;
        while !self.driver.is_connected() {
            if !self.retry.allows(attempts) {
                self.transition(LinkState::Disconnected);
                warn!("WiFi: giving up after {} attempts", attempts);
                return Err(Error::RetriesExhausted {
                    operation: Operation::Connect,
                    attempts,
                });
            }
            attempts += 1;
            self.heartbeat();

            self.transition(LinkState::Connecting);
            info!("WiFi: connecting to '{}' (attempt {})", self.credentials.ssid, attempts);
            self.status.fill(PixelStatus::CONNECTING);

            match self.driver.connect(&self.credentials) {
                Ok(()) => {
                    self.failure_count = 0;
                    self.status.fill(PixelStatus::CONNECTED);
                }
                Err(e) => {
                    warn!("WiFi: failed to connect, retrying: {}", e);
                    self.failure_count += 1;
                    if self.failure_count >= self.attempts_threshold {
                        self.reset()?;
                    }
                    self.transition(LinkState::Disconnected);
                }
            }
        }

        self.transition(LinkState::Connected);
        info!("WiFi: connected to '{}'", self.credentials.ssid);
        Ok(())
    }

    /// Hard-reset the radio.  A failure here is not recoverable.
    pub fn reset(&mut self) -> Result<()> {
        info!("WiFi: resetting radio");
        self.failure_count = 0;
        // The association is gone whether or not the reset succeeds
        self.transition(LinkState::Disconnected);
        self.driver.hard_reset().map_err(Error::Reset)?;
        self.reset_count += 1;
        Ok(())
    }

    /// Pass-through query to the driver.
    pub fn is_connected(&self) -> bool {
        self.driver.is_connected()
    }

    /// Record a driver-reported loss of association.
    pub fn link_lost(&mut self) {
        if self.state != LinkState::Disconnected {
            warn!("WiFi: connection lost");
        }
        self.transition(LinkState::Disconnected);
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn failure_count(&self) -> u32 {
        self.failure_count
    }

    pub fn attempts_threshold(&self) -> u32 {
        self.attempts_threshold
    }

    /// Hard resets issued since construction.
    pub fn reset_count(&self) -> u32 {
        self.reset_count
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn status(&self) -> &S {
        &self.status
    }

    pub fn status_mut(&mut self) -> &mut S {
        &mut self.status
    }

    // ── Internal ──────────────────────────────────────────────

    pub(crate) fn heartbeat(&mut self) {
        (self.heartbeat)();
    }

    fn transition(&mut self, next: LinkState) {
        if self.state != next {
            debug!("WiFi: {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }
}
