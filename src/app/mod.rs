//! Application core: connectivity and time-sync logic, zero I/O.
//!
//! All interaction with the radio, the HTTP stack, the RTC and the status
//! pixel goes through the **port traits** in [`ports`], so this layer runs
//! unchanged against simulation adapters and test mocks.

pub mod connectivity;
pub mod ports;
pub mod reading;
pub mod retry;
pub mod status;
pub mod time_sync;

pub use connectivity::{ConnectivityManager, LinkState};
pub use reading::TimeReading;
pub use retry::RetryPolicy;
pub use status::{NoStatus, PixelStatus};
pub use time_sync::TimeSynchronizer;
