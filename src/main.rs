//! NetClock firmware entry point
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  WifiAdapter      HttpAdapter     RtcAdapter     StatusLed   │
//! │  (NetworkDriver)  (HttpClient)    (HwClock)      (Indicator) │
//! │                                                              │
//! │  ─────────────── Port Trait Boundary ─────────────────       │
//! │                                                              │
//! │  ┌──────────────────────────────────────────────────────┐    │
//! │  │  TimeSynchronizer ─▶ ConnectivityManager (pure logic) │    │
//! │  └──────────────────────────────────────────────────────┘    │
//! │                                                              │
//! │  Poll loop: read RTC every `poll_interval_secs`              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Secrets come from the `NETCLOCK_SECRETS` environment variable at build
//! time (a JSON object with at least `ssid` and `password`).  An optional
//! `NETCLOCK_CONFIG` JSON object overrides [`SyncConfig`] defaults.
#![deny(unused_must_use)]

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use log::{error, info};

use esp_idf_hal::ledc::{config::TimerConfig, LedcDriver, LedcTimerDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::FromValueType;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;

use netclock::adapters::http::HttpAdapter;
use netclock::adapters::rtc::RtcAdapter;
use netclock::adapters::wifi::WifiAdapter;
use netclock::app::ports::HardwareClock;
use netclock::app::{ConnectivityManager, TimeSynchronizer};
use netclock::config::{Credentials, SyncConfig};
use netclock::drivers::status_led::{StatusLed, LED_PWM_FREQ_HZ};
use netclock::drivers::watchdog::Watchdog;

const SECRETS: Option<&str> = option_env!("NETCLOCK_SECRETS");
const CONFIG: Option<&str> = option_env!("NETCLOCK_CONFIG");

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  NetClock v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Secrets and config ─────────────────────────────────
    let secrets = SECRETS.ok_or_else(|| anyhow!("NETCLOCK_SECRETS was not set at build time"))?;
    let credentials = Credentials::from_json(secrets).context("NETCLOCK_SECRETS")?;
    let config = match CONFIG {
        Some(json) => serde_json::from_str::<SyncConfig>(json).context("NETCLOCK_CONFIG")?,
        None => SyncConfig::default(),
    };
    config.validate().context("NETCLOCK_CONFIG")?;
    info!("Config: {:?}", config);

    // ── 3. Peripherals ────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    let watchdog = Watchdog::default();

    let led_timer = LedcTimerDriver::new(
        peripherals.ledc.timer0,
        &TimerConfig::default().frequency(LED_PWM_FREQ_HZ.Hz()),
    )?;
    let status = StatusLed::new(
        LedcDriver::new(peripherals.ledc.channel0, &led_timer, peripherals.pins.gpio11)?,
        LedcDriver::new(peripherals.ledc.channel1, &led_timer, peripherals.pins.gpio12)?,
        LedcDriver::new(peripherals.ledc.channel2, &led_timer, peripherals.pins.gpio13)?,
    );

    // ── 4. Adapters and core ──────────────────────────────────
    let wifi = WifiAdapter::new(peripherals.modem, sysloop, Some(nvs))?;
    let link = ConnectivityManager::with_status(wifi, credentials, status, &config)
        .with_heartbeat(move || watchdog.feed());
    let mut sync = TimeSynchronizer::new(link, HttpAdapter::new(), RtcAdapter::new(), &config);

    // ── 5. Connect and set the clock ──────────────────────────
    sync.link_mut().connect().context("WiFi connect")?;
    let reading = sync.get_time().context("time sync")?;
    info!("Clock set: {}", reading);

    // ── 6. Poll loop ──────────────────────────────────────────
    let interval = Duration::from_secs(u64::from(config.poll_interval_secs));
    loop {
        watchdog.feed();
        match sync.clock().datetime() {
            Ok(now) => info!("{}", now.display_unpadded()),
            Err(e) => error!("RTC: read failed: {}", e),
        }
        std::thread::sleep(interval);
    }
}
