#![no_std]

//! Device configuration for an MQTT-controlled addressable LED strip
//!
//! The configuration is loaded once at start-up, validated, and then shared
//! read-only with the LED driver, the Wi-Fi stack and the MQTT client:
//!
//! - `source` - Configuration sources (compiled-in defaults, JSON
//!   provisioning documents, key/value stores)
//! - `storage` - Provisioning record persisted in NOR flash
//! - `loader` - Layers sources and validates them into a [`DeviceConfig`]
//! - `config` - The immutable record and its per-consumer views
//! - `board` - GPIO capabilities of the supported chips
//! - `diagnostic` - Error blink pattern for invalid configurations
//!
//! Any invalid value is reported as a single [`ConfigInvalid`] naming the
//! field and the reason.

#[cfg(feature = "std")]
extern crate std;

pub mod board;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod loader;
pub mod packet;
pub mod source;
pub mod storage;
mod validate;

pub use board::Board;
pub use config::{DeviceConfig, LedConfig, MqttConfig, MqttCredentials, WifiConfig};
pub use diagnostic::{ErrorBlinker, load_or_halt};
pub use error::{ConfigField, ConfigInvalid, InvalidReason};
pub use loader::ConfigLoader;
pub use packet::{BYTES_PER_LED_COMMAND, PACKET_OVERHEAD, max_packet_size};
pub use source::{
    ConfigSource,
    JsonSource,
    KeyValueSource,
    KeyValueStore,
    PartialConfig,
    PartialCredentials,
};
pub use storage::{ConfigRecord, ConfigStorage, StorageError};
