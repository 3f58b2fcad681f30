//! Time synchronizer: fetch wall-clock time over HTTP and commit it to the RTC.
//!
//! Every request first makes sure the [`ConnectivityManager`] holds an
//! association.  Transport and protocol failures are retried immediately;
//! a payload that does not parse is returned to the caller and the clock is
//! not touched.

use log::{info, warn};

use crate::config::SyncConfig;
use crate::error::{Error, Operation, Result};

use super::connectivity::ConnectivityManager;
use super::ports::{
    HardwareClock, HttpClient, NetworkDriver, RequestOptions, Response, StatusIndicator,
};
use super::reading::TimeReading;
use super::retry::RetryPolicy;
use super::status::{NoStatus, PixelStatus};

pub struct TimeSynchronizer<D, H, C, S = NoStatus> {
    link: ConnectivityManager<D, S>,
    http: H,
    clock: C,
    url: String,
    retry: RetryPolicy,
    request_timeout_ms: u32,
}

impl<D, H, C, S> TimeSynchronizer<D, H, C, S>
where
    D: NetworkDriver,
    H: HttpClient,
    C: HardwareClock,
    S: StatusIndicator,
{
    pub fn new(mut link: ConnectivityManager<D, S>, http: H, clock: C, config: &SyncConfig) -> Self {
        link.status_mut().fill(PixelStatus::IDLE);
        Self {
            link,
            http,
            clock,
            url: config.time_api_url.clone(),
            retry: config.fetch_retry,
            request_timeout_ms: config.request_timeout_ms,
        }
    }

    /// GET `url`, connecting first if the link is down.
    ///
    /// The status indicator shows busy for the duration of the request and
    /// idle afterwards, whether or not the transport succeeded.  The response
    /// is returned as-is, including non-2xx statuses.
    pub fn authenticated_get(&mut self, url: &str, options: &RequestOptions) -> Result<Response> {
        if !self.link.is_connected() {
            self.link.connect()?;
        }
        self.link.status_mut().fill(PixelStatus::BUSY);
        let result = self.http.get(url, options);
        self.link.status_mut().fill(PixelStatus::IDLE);
        result.map_err(Error::from)
    }

    /// Fetch the current time, set the hardware clock, and return what was set.
    pub fn get_time(&mut self) -> Result<TimeReading> {
        let response = self.fetch_time_response()?;
        let reading = TimeReading::from_json(&response.body)?;
        self.clock.set_datetime(&reading)?;
        info!("TimeSync: clock set to {} (dst={})", reading, reading.is_dst);
        Ok(reading)
    }

    fn fetch_time_response(&mut self) -> Result<Response> {
        let url = self.url.clone();
        let options = RequestOptions::with_timeout(self.request_timeout_ms);
        let mut attempts: u32 = 0;
        loop {
            if !self.retry.allows(attempts) {
                warn!("TimeSync: giving up after {} attempts", attempts);
                return Err(Error::RetriesExhausted {
                    operation: Operation::FetchTime,
                    attempts,
                });
            }
            attempts += 1;
            self.link.heartbeat();

            info!("TimeSync: fetching json from {}", url);
            match self.authenticated_get(&url, &options) {
                Ok(response) if response.is_success() => return Ok(response),
                Ok(response) => {
                    warn!("TimeSync: time service answered HTTP {}, retrying", response.status);
                }
                Err(Error::Http(e)) => warn!("TimeSync: failed to get data, retrying: {}", e),
                Err(e) => return Err(e),
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn link(&self) -> &ConnectivityManager<D, S> {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut ConnectivityManager<D, S> {
        &mut self.link
    }

    pub fn http(&self) -> &H {
        &self.http
    }

    /// The hardware clock, holding the last value set by [`get_time`](Self::get_time).
    pub fn clock(&self) -> &C {
        &self.clock
    }
}
