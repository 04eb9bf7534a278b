//! Safe diagnostic state for fatal configuration errors
//!
//! Instead of bringing up Wi-Fi and MQTT with an invalid record, the device
//! parks itself and blinks a status LED: [`ConfigField::code`] short pulses,
//! then a long pause.
//!
//! [`ConfigField::code`]: crate::ConfigField::code

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::DeviceConfig;
use crate::error::ConfigInvalid;
use crate::loader::ConfigLoader;
use crate::source::ConfigSource;

/// On and off time of a single pulse
pub const PULSE_MS: u32 = 200;

/// Gap between two repetitions of the pattern
pub const PAUSE_MS: u32 = 1500;

/// Blinks configuration errors on a status LED
pub struct ErrorBlinker<P, D> {
    pin: P,
    delay: D,
}

impl<P: OutputPin, D: DelayNs> ErrorBlinker<P, D> {
    pub fn new(pin: P, delay: D) -> Self {
        Self { pin, delay }
    }

    /// Blink the pattern for `error` once, leaving the LED off.
    ///
    /// The closing pause is always observed, even when the pin fails.
    pub fn signal(&mut self, error: &ConfigInvalid) -> Result<(), P::Error> {
        let result = self.pulses(error.field.code());
        self.delay.delay_ms(PAUSE_MS);
        result
    }

    fn pulses(&mut self, count: u8) -> Result<(), P::Error> {
        for _ in 0..count {
            self.pin.set_high()?;
            self.delay.delay_ms(PULSE_MS);
            self.pin.set_low()?;
            self.delay.delay_ms(PULSE_MS);
        }
        Ok(())
    }

    /// Repeat the pattern for `error` forever
    pub fn halt(mut self, error: ConfigInvalid) -> ! {
        #[cfg(feature = "log")]
        log::error!(
            "config: halting, {} (blink code {})",
            error,
            error.field.code()
        );
        loop {
            // Keep blinking even if the pin reports an error
            let _ = self.signal(&error);
        }
    }

    pub fn release(self) -> (P, D) {
        (self.pin, self.delay)
    }
}

/// Load the configuration, or enter the diagnostic state and never return.
///
/// Call this before initializing the LED driver, Wi-Fi or MQTT.
pub fn load_or_halt<P: OutputPin, D: DelayNs>(
    loader: &ConfigLoader,
    sources: &[&dyn ConfigSource],
    blinker: ErrorBlinker<P, D>,
) -> DeviceConfig {
    match loader.load(sources) {
        Ok(config) => config,
        Err(error) => blinker.halt(error),
    }
}
