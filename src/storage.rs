//! Provisioning record in NOR flash
//!
//! The record lives at the start of a dedicated, erase-aligned flash region:
//!
//! ```text
//! offset  size  field
//! 0       2     magic (0x4C45, LE)
//! 2       1     layout version
//! 3       1     reserved
//! 4       1     data pin
//! 5       1     flags (bit 0: MQTT credentials present)
//! 6       2     LED count (LE)
//! 8       2     MQTT port (LE)
//! 10      2     reserved
//! 12      32    Wi-Fi SSID
//! 44      64    Wi-Fi password
//! 108     32    hostname
//! 140     64    MQTT broker host
//! 204     32    MQTT username
//! 236     64    MQTT password
//! 300     128   command topic
//! ```
//!
//! Strings are UTF-8, NUL padded. Only validated records are written, and a
//! loaded record goes through validation again before it becomes a
//! [`DeviceConfig`].

use core::mem::size_of;

use bytemuck::{Pod, Zeroable};
use embedded_storage::nor_flash::NorFlash;

use crate::config::{
    COMMAND_TOPIC_MAX_LEN,
    DeviceConfig,
    HOSTNAME_MAX_LEN,
    MQTT_HOST_MAX_LEN,
    MQTT_PASSWORD_MAX_LEN,
    MQTT_USERNAME_MAX_LEN,
    SSID_MAX_LEN,
    WIFI_PASSWORD_MAX_LEN,
};
use crate::error::{ConfigField, ConfigInvalid, InvalidReason};
use crate::source::{ConfigSource, PartialConfig, PartialCredentials};

const MAGIC_HEADER: u16 = 0x4C45;
const LAYOUT_VERSION: u8 = 1;
pub const HEADER_SIZE: usize = 4;

/// Encoded size of the record, header included
pub const RECORD_SIZE: usize = HEADER_SIZE + size_of::<PersistentDeviceConfig>();

/// Scratch buffer for reads and writes, `RECORD_SIZE` rounded up to common
/// flash write granularities
const BUFFER_SIZE: usize = 512;

const FLAG_CREDENTIALS: u8 = 1 << 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// The flash driver reported an error
    DriverError,
    /// Offset or record size does not match the flash geometry
    Misaligned,
    /// The record does not fit into the flash
    OutOfBounds,
    /// No record has been written yet
    InvalidMagicHeader,
    UnsupportedVersion(u8),
    InvalidData,
}

impl From<StorageError> for ConfigInvalid {
    fn from(error: StorageError) -> Self {
        let reason = match error {
            StorageError::DriverError | StorageError::Misaligned | StorageError::OutOfBounds => {
                InvalidReason::Unreadable
            }
            StorageError::InvalidMagicHeader => InvalidReason::Missing,
            StorageError::UnsupportedVersion(_) | StorageError::InvalidData => {
                InvalidReason::Malformed
            }
        };
        ConfigInvalid::new(ConfigField::Source, reason)
    }
}

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
struct PersistentDeviceConfig {
    data_pin: u8,
    flags: u8,
    led_count: [u8; 2],
    mqtt_port: [u8; 2],
    _reserved: [u8; 2],
    ssid: [u8; SSID_MAX_LEN],
    wifi_password: [u8; WIFI_PASSWORD_MAX_LEN],
    hostname: [u8; HOSTNAME_MAX_LEN],
    mqtt_host: [u8; MQTT_HOST_MAX_LEN],
    mqtt_username: [u8; MQTT_USERNAME_MAX_LEN],
    mqtt_password: [u8; MQTT_PASSWORD_MAX_LEN],
    command_topic: [u8; COMMAND_TOPIC_MAX_LEN],
}

/// Provisioning record, as stored in flash.
///
/// Acts as a [`ConfigSource`] so it can be layered like any other source.
#[derive(Clone, Copy)]
pub struct ConfigRecord {
    body: PersistentDeviceConfig,
}

impl ConfigRecord {
    pub fn from_config(config: &DeviceConfig) -> Self {
        let led = config.led();
        let wifi = config.wifi();
        let mqtt = config.mqtt();

        let mut body = PersistentDeviceConfig::zeroed();
        body.data_pin = led.data_pin();
        body.led_count = led.led_count().to_le_bytes();
        body.mqtt_port = mqtt.port().to_le_bytes();
        body.ssid = string_to_array(wifi.ssid());
        body.wifi_password = string_to_array(wifi.password());
        body.hostname = string_to_array(wifi.hostname());
        body.mqtt_host = string_to_array(mqtt.host());
        body.command_topic = string_to_array(mqtt.command_topic());
        if let Some(credentials) = mqtt.credentials() {
            body.flags |= FLAG_CREDENTIALS;
            body.mqtt_username = string_to_array(credentials.username());
            body.mqtt_password = string_to_array(credentials.password());
        }
        Self { body }
    }

    /// Encode the record, header included
    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut data = [0u8; RECORD_SIZE];
        data[0..2].copy_from_slice(&MAGIC_HEADER.to_le_bytes());
        data[2] = LAYOUT_VERSION;
        data[HEADER_SIZE..].copy_from_slice(bytemuck::bytes_of(&self.body));
        data
    }

    /// Decode a record produced by [`ConfigRecord::encode`].
    ///
    /// Trailing bytes past [`RECORD_SIZE`] are ignored.
    pub fn decode(data: &[u8]) -> Result<Self, StorageError> {
        if data.len() < RECORD_SIZE {
            return Err(StorageError::InvalidData);
        }
        let magic = u16::from_le_bytes([data[0], data[1]]);
        if magic != MAGIC_HEADER {
            return Err(StorageError::InvalidMagicHeader);
        }
        if data[2] != LAYOUT_VERSION {
            return Err(StorageError::UnsupportedVersion(data[2]));
        }
        let body: PersistentDeviceConfig =
            bytemuck::pod_read_unaligned(&data[HEADER_SIZE..RECORD_SIZE]);
        if body.flags & !FLAG_CREDENTIALS != 0 {
            return Err(StorageError::InvalidData);
        }
        Ok(Self { body })
    }
}

impl ConfigSource for ConfigRecord {
    fn read(&self) -> Result<PartialConfig<'_>, ConfigInvalid> {
        let body = &self.body;
        let mqtt_credentials = if body.flags & FLAG_CREDENTIALS == 0 {
            None
        } else {
            Some(PartialCredentials {
                username: Some(padded_str(&body.mqtt_username, ConfigField::MqttCredentials)?),
                password: Some(padded_str(&body.mqtt_password, ConfigField::MqttCredentials)?),
            })
        };

        Ok(PartialConfig {
            data_pin: Some(i64::from(body.data_pin)),
            led_count: Some(i64::from(u16::from_le_bytes(body.led_count))),
            wifi_ssid: Some(padded_str(&body.ssid, ConfigField::WifiSsid)?),
            wifi_password: Some(padded_str(&body.wifi_password, ConfigField::WifiPassword)?),
            wifi_hostname: Some(padded_str(&body.hostname, ConfigField::WifiHostname)?),
            mqtt_broker_host: Some(padded_str(&body.mqtt_host, ConfigField::MqttBrokerHost)?),
            mqtt_broker_port: Some(i64::from(u16::from_le_bytes(body.mqtt_port))),
            mqtt_credentials,
            command_topic: Some(padded_str(&body.command_topic, ConfigField::CommandTopic)?),
        })
    }
}

/// Provisioning record storage on a NOR flash region starting at `offset`.
///
/// `offset` must be aligned to the flash erase size.
pub struct ConfigStorage<F> {
    flash: F,
    offset: u32,
}

impl<F: NorFlash> ConfigStorage<F> {
    pub const fn new(flash: F, offset: u32) -> Self {
        Self { flash, offset }
    }

    /// Give the flash back
    pub fn release(self) -> F {
        self.flash
    }

    /// Load the provisioning record
    pub fn load(&mut self) -> Result<ConfigRecord, StorageError> {
        let len = RECORD_SIZE.next_multiple_of(F::READ_SIZE);
        if len > BUFFER_SIZE {
            return Err(StorageError::Misaligned);
        }
        self.check_bounds(len)?;

        let mut buffer = [0u8; BUFFER_SIZE];
        self.flash
            .read(self.offset, &mut buffer[..len])
            .map_err(|_e| {
                #[cfg(feature = "log")]
                log::error!("storage: read failed: {:?}", _e);
                StorageError::DriverError
            })?;
        ConfigRecord::decode(&buffer[..len])
    }

    /// Replace the stored record with `config`
    pub fn save(&mut self, config: &DeviceConfig) -> Result<(), StorageError> {
        let len = RECORD_SIZE.next_multiple_of(F::WRITE_SIZE);
        if len > BUFFER_SIZE {
            return Err(StorageError::Misaligned);
        }
        self.erase_region()?;

        let mut buffer = [0u8; BUFFER_SIZE];
        buffer[..RECORD_SIZE].copy_from_slice(&ConfigRecord::from_config(config).encode());
        self.flash
            .write(self.offset, &buffer[..len])
            .map_err(|_e| {
                #[cfg(feature = "log")]
                log::error!("storage: write failed: {:?}", _e);
                StorageError::DriverError
            })?;

        #[cfg(feature = "log")]
        log::info!("storage: saved provisioning record at {:#x}", self.offset);
        Ok(())
    }

    /// Remove the stored record, returning the device to the unprovisioned state
    pub fn erase(&mut self) -> Result<(), StorageError> {
        self.erase_region()?;
        #[cfg(feature = "log")]
        log::info!("storage: erased provisioning record at {:#x}", self.offset);
        Ok(())
    }

    fn erase_region(&mut self) -> Result<(), StorageError> {
        if self.offset as usize % F::ERASE_SIZE != 0 {
            return Err(StorageError::Misaligned);
        }
        let len = RECORD_SIZE.next_multiple_of(F::ERASE_SIZE);
        self.check_bounds(len)?;

        let end = self.offset + u32::try_from(len).map_err(|_| StorageError::OutOfBounds)?;
        self.flash.erase(self.offset, end).map_err(|_e| {
            #[cfg(feature = "log")]
            log::error!("storage: erase failed: {:?}", _e);
            StorageError::DriverError
        })
    }

    fn check_bounds(&self, len: usize) -> Result<(), StorageError> {
        if self.offset as usize + len > self.flash.capacity() {
            return Err(StorageError::OutOfBounds);
        }
        Ok(())
    }
}

/// Read a NUL padded string field
fn padded_str(bytes: &[u8], field: ConfigField) -> Result<&str, ConfigInvalid> {
    let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    core::str::from_utf8(&bytes[..len]).map_err(|_| ConfigInvalid::malformed(field))
}

/// Copy `s` into a zero padded array, truncating if needed
fn string_to_array<const N: usize>(s: &str) -> [u8; N] {
    let mut arr = [0u8; N];
    let bytes = s.as_bytes();
    let len = bytes.len().min(N);
    arr[..len].copy_from_slice(&bytes[..len]);
    arr
}
