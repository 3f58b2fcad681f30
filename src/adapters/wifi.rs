//! WiFi station-mode adapter.
//!
//! Implements [`NetworkDriver`], the radio primitives the
//! [`ConnectivityManager`](crate::app::ConnectivityManager) drives.
//! The adapter makes one attempt per call; retry and reset policy live in
//! the manager.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via `esp_idf_svc::wifi`.
//! - **all other targets**: scripted simulation for host-side tests.

use log::{info, warn};

use crate::app::ports::NetworkDriver;
use crate::config::Credentials;
use crate::error::LinkError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::modem::Modem,
    nvs::EspDefaultNvsPartition,
    sys::{EspError, ESP_ERR_TIMEOUT},
    wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi},
};

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    #[cfg(target_os = "espidf")]
    wifi: BlockingWifi<EspWifi<'static>>,

    /// Simulation: the radio holds an association.
    #[cfg(not(target_os = "espidf"))]
    sim_associated: bool,
    /// Simulation: counts platform_connect() calls.
    #[cfg(not(target_os = "espidf"))]
    sim_connect_counter: u32,
    /// Simulation: connect attempts still scripted to fail.
    #[cfg(not(target_os = "espidf"))]
    sim_failures_remaining: u32,
    /// Simulation: hard resets issued.
    #[cfg(not(target_os = "espidf"))]
    sim_reset_counter: u32,
}

#[cfg(target_os = "espidf")]
impl WifiAdapter {
    /// Take ownership of the modem and bring the driver up in station mode.
    pub fn new(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: Option<EspDefaultNvsPartition>,
    ) -> Result<Self, EspError> {
        let wifi = BlockingWifi::wrap(EspWifi::new(modem, sysloop.clone(), nvs)?, sysloop)?;
        info!("WiFi(espidf): driver created");
        Ok(Self { wifi })
    }

    fn platform_connect(&mut self, credentials: &Credentials) -> Result<(), LinkError> {
        let auth_method = if credentials.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let config = Configuration::Client(ClientConfiguration {
            ssid: credentials
                .ssid
                .as_str()
                .try_into()
                .map_err(|()| LinkError::Driver)?,
            password: credentials
                .password
                .as_str()
                .try_into()
                .map_err(|()| LinkError::Driver)?,
            auth_method,
            ..Default::default()
        });
        self.wifi.set_configuration(&config).map_err(map_esp_error)?;
        if !self.wifi.is_started().map_err(map_esp_error)? {
            self.wifi.start().map_err(map_esp_error)?;
        }
        self.wifi.connect().map_err(map_esp_error)?;
        self.wifi.wait_netif_up().map_err(map_esp_error)?;
        Ok(())
    }

    fn platform_is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }

    fn platform_hard_reset(&mut self) -> Result<(), LinkError> {
        // Stopping the driver drops the association and any open sockets
        self.wifi.stop().map_err(map_esp_error)?;
        self.wifi.start().map_err(map_esp_error)?;
        Ok(())
    }
}

#[cfg(target_os = "espidf")]
fn map_esp_error(e: EspError) -> LinkError {
    if e.code() == ESP_ERR_TIMEOUT as i32 {
        LinkError::Timeout
    } else {
        warn!("WiFi(espidf): {}", e);
        LinkError::AssociationFailed
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for WifiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_os = "espidf"))]
impl WifiAdapter {
    pub fn new() -> Self {
        Self {
            sim_associated: false,
            sim_connect_counter: 0,
            sim_failures_remaining: 0,
            sim_reset_counter: 0,
        }
    }

    /// Script the next `count` connect attempts to fail with a timeout.
    pub fn sim_fail_next(&mut self, count: u32) {
        self.sim_failures_remaining = count;
    }

    /// Simulate the access point dropping the station.
    pub fn sim_drop_link(&mut self) {
        info!("WiFi(sim): link dropped");
        self.sim_associated = false;
    }

    pub fn sim_connect_count(&self) -> u32 {
        self.sim_connect_counter
    }

    pub fn sim_reset_count(&self) -> u32 {
        self.sim_reset_counter
    }

    fn platform_connect(&mut self, credentials: &Credentials) -> Result<(), LinkError> {
        self.sim_connect_counter = self.sim_connect_counter.wrapping_add(1);
        if self.sim_failures_remaining > 0 {
            self.sim_failures_remaining -= 1;
            warn!("WiFi(sim): simulated timeout (attempt {})", self.sim_connect_counter);
            return Err(LinkError::Timeout);
        }
        self.sim_associated = true;
        info!("WiFi(sim): associated with '{}' (attempt {})", credentials.ssid, self.sim_connect_counter);
        Ok(())
    }

    fn platform_is_connected(&self) -> bool {
        self.sim_associated
    }

    fn platform_hard_reset(&mut self) -> Result<(), LinkError> {
        self.sim_reset_counter += 1;
        self.sim_associated = false;
        info!("WiFi(sim): radio reset");
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// NetworkDriver
// ───────────────────────────────────────────────────────────────

impl NetworkDriver for WifiAdapter {
    fn connect(&mut self, credentials: &Credentials) -> Result<(), LinkError> {
        self.platform_connect(credentials)
    }

    fn is_connected(&self) -> bool {
        self.platform_is_connected()
    }

    fn hard_reset(&mut self) -> Result<(), LinkError> {
        self.platform_hard_reset()
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
