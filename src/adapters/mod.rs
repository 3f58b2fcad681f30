//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter | Implements      | Connects to                    |
//! |---------|-----------------|--------------------------------|
//! | `wifi`  | NetworkDriver   | ESP-IDF WiFi STA               |
//! | `http`  | HttpClient      | ESP-IDF HTTP client / std TCP  |
//! | `rtc`   | HardwareClock   | System clock (settimeofday)    |
//!
//! The status LED lives in [`drivers::status_led`](crate::drivers::status_led)
//! because it is generic over any PWM channel rather than tied to a platform.

pub mod http;
pub mod rtc;
pub mod wifi;
