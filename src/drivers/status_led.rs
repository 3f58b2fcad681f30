//! RGB status LED driver.
//!
//! Three PWM channels drive discrete R/G/B LEDs (or a common-cathode RGB
//! LED).  Any `embedded_hal::pwm::SetDutyCycle` channel works: LEDC
//! channels on the ESP32, mock channels in tests.

use embedded_hal::pwm::SetDutyCycle;
use log::warn;

use crate::app::ports::StatusIndicator;
use crate::app::status::PixelStatus;

/// PWM frequency for the LED channels.
pub const LED_PWM_FREQ_HZ: u32 = 1_000;

pub struct StatusLed<R, G, B> {
    red: R,
    green: G,
    blue: B,
    current: (u8, u8, u8),
}

impl<R, G, B> StatusLed<R, G, B>
where
    R: SetDutyCycle,
    G: SetDutyCycle,
    B: SetDutyCycle,
{
    /// Wrap the three channels and switch the LED off.
    pub fn new(red: R, green: G, blue: B) -> Self {
        let mut led = Self {
            red,
            green,
            blue,
            current: (0, 0, 0),
        };
        led.off();
        led
    }

    /// Each component is scaled from 0–255 to the channel's duty range.
    pub fn set_colour(&mut self, r: u8, g: u8, b: u8) {
        let ok = set_channel(&mut self.red, r)
            & set_channel(&mut self.green, g)
            & set_channel(&mut self.blue, b);
        if !ok {
            warn!("StatusLed: failed to set colour ({}, {}, {})", r, g, b);
        }
        self.current = (r, g, b);
    }

    pub fn off(&mut self) {
        self.set_colour(0, 0, 0);
    }

    pub fn current_colour(&self) -> (u8, u8, u8) {
        self.current
    }
}

fn set_channel<P: SetDutyCycle>(channel: &mut P, level: u8) -> bool {
    channel.set_duty_cycle_fraction(u16::from(level), u16::from(u8::MAX)).is_ok()
}

impl<R, G, B> StatusIndicator for StatusLed<R, G, B>
where
    R: SetDutyCycle,
    G: SetDutyCycle,
    B: SetDutyCycle,
{
    fn fill(&mut self, status: PixelStatus) {
        let (r, g, b) = status.rgb();
        self.set_colour(r, g, b);
    }
}
