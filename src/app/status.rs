//! Status colours and the no-op indicator.

use super::ports::StatusIndicator;

/// Value written to the status indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelStatus {
    Off,
    Rgb(u8, u8, u8),
}

impl PixelStatus {
    /// Red: associating with the access point.
    pub const CONNECTING: Self = Self::Rgb(100, 0, 0);
    /// Green: association succeeded.
    pub const CONNECTED: Self = Self::Rgb(0, 100, 0);
    /// Blue: HTTP request in flight.
    pub const BUSY: Self = Self::Rgb(0, 0, 100);
    pub const IDLE: Self = Self::Off;

    /// Channel values, `(0, 0, 0)` for [`PixelStatus::Off`].
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Off => (0, 0, 0),
            Self::Rgb(r, g, b) => (r, g, b),
        }
    }
}

/// Indicator used when the board has no status pixel.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoStatus;

impl StatusIndicator for NoStatus {
    fn fill(&mut self, _status: PixelStatus) {}
}

impl<T: StatusIndicator + ?Sized> StatusIndicator for &mut T {
    fn fill(&mut self, status: PixelStatus) {
        (**self).fill(status);
    }
}
