//! DeviceConfig loader
//!
//! Produces the validated [`DeviceConfig`] before any network or hardware
//! subsystem starts. Loading only reads its sources and computes; it never
//! opens sockets or touches pins.

use crate::board::Board;
use crate::config::DeviceConfig;
use crate::error::ConfigInvalid;
use crate::source::{ConfigSource, PartialConfig};
use crate::validate;

/// Layers configuration sources over compiled-in defaults and validates them.
///
/// ```ignore
/// let provisioning = JsonSource::new(document);
/// let overrides = KeyValueSource::new(&[("LED_COUNT", "150")]);
///
/// let config = ConfigLoader::new(Board::Esp32).load(&[&provisioning, &overrides])?;
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ConfigLoader {
    board: Board,
    defaults: PartialConfig<'static>,
}

impl ConfigLoader {
    pub const fn new(board: Board) -> Self {
        Self {
            board,
            defaults: PartialConfig::DEFAULTS,
        }
    }

    /// Replace the compiled-in defaults
    #[must_use]
    pub const fn with_defaults(mut self, defaults: PartialConfig<'static>) -> Self {
        self.defaults = defaults;
        self
    }

    pub const fn board(&self) -> Board {
        self.board
    }

    /// Read `sources` in order on top of the defaults; later sources win.
    ///
    /// The first source that cannot be read, or the first field that fails
    /// validation, aborts the load.
    pub fn load(&self, sources: &[&dyn ConfigSource]) -> Result<DeviceConfig, ConfigInvalid> {
        let mut merged = self.defaults;
        for source in sources {
            merged = merged.overlay(source.read()?);
        }
        self.validate(&merged)
    }

    /// Validate an already merged configuration
    pub fn validate(&self, partial: &PartialConfig<'_>) -> Result<DeviceConfig, ConfigInvalid> {
        match validate::device_config(partial, self.board) {
            Ok(config) => {
                #[cfg(feature = "log")]
                log::info!(
                    "config: loaded for {}: {} LEDs on GPIO{}, broker {}:{}, topic {}",
                    self.board.name(),
                    config.led().led_count(),
                    config.led().data_pin(),
                    config.mqtt().host(),
                    config.mqtt().port(),
                    config.mqtt().command_topic(),
                );
                Ok(config)
            }
            Err(error) => {
                #[cfg(feature = "log")]
                log::error!("config: invalid configuration: {}", error);
                Err(error)
            }
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(Board::default())
    }
}
