//! The validated device configuration record

use core::fmt;

use heapless::String;
use serde::Serialize;

use crate::error::ConfigInvalid;
use crate::packet::max_packet_size;
use crate::validate;

pub const SSID_MAX_LEN: usize = 32;
pub const WIFI_PASSWORD_MAX_LEN: usize = 64;
pub const HOSTNAME_MAX_LEN: usize = 32;
pub const MQTT_HOST_MAX_LEN: usize = 64;
pub const MQTT_USERNAME_MAX_LEN: usize = 32;
pub const MQTT_PASSWORD_MAX_LEN: usize = 64;
pub const COMMAND_TOPIC_MAX_LEN: usize = 128;

pub type Ssid = String<SSID_MAX_LEN>;
pub type WifiPassword = String<WIFI_PASSWORD_MAX_LEN>;
pub type Hostname = String<HOSTNAME_MAX_LEN>;
pub type MqttHost = String<MQTT_HOST_MAX_LEN>;
pub type MqttUsername = String<MQTT_USERNAME_MAX_LEN>;
pub type MqttPassword = String<MQTT_PASSWORD_MAX_LEN>;
pub type CommandTopic = String<COMMAND_TOPIC_MAX_LEN>;

/// Values consumed by the LED strip driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LedConfig {
    #[serde(rename = "dataPin")]
    pub(crate) data_pin: u8,
    #[serde(rename = "ledCount")]
    pub(crate) led_count: u16,
}

impl LedConfig {
    /// GPIO driving the strip data line
    pub const fn data_pin(&self) -> u8 {
        self.data_pin
    }

    pub const fn led_count(&self) -> u16 {
        self.led_count
    }
}

/// Values consumed by the Wi-Fi stack
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct WifiConfig {
    #[serde(rename = "wifiSSID")]
    pub(crate) ssid: Ssid,
    #[serde(skip_serializing)]
    pub(crate) password: WifiPassword,
    #[serde(rename = "wifiHostname")]
    pub(crate) hostname: Hostname,
}

impl WifiConfig {
    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Hostname advertised over DHCP
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// An empty password selects an open network
    pub fn is_open(&self) -> bool {
        self.password.is_empty()
    }
}

impl fmt::Debug for WifiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WifiConfig")
            .field("ssid", &self.ssid)
            .field("password", &Redacted(self.password.is_empty()))
            .field("hostname", &self.hostname)
            .finish()
    }
}

/// Broker login
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct MqttCredentials {
    pub(crate) username: MqttUsername,
    #[serde(skip_serializing)]
    pub(crate) password: MqttPassword,
}

impl MqttCredentials {
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for MqttCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MqttCredentials")
            .field("username", &self.username)
            .field("password", &Redacted(self.password.is_empty()))
            .finish()
    }
}

/// Values consumed by the MQTT client
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MqttConfig {
    #[serde(rename = "mqttBrokerHost")]
    pub(crate) host: MqttHost,
    #[serde(rename = "mqttBrokerPort")]
    pub(crate) port: u16,
    #[serde(rename = "mqttCredentials")]
    pub(crate) credentials: Option<MqttCredentials>,
    #[serde(rename = "commandTopic")]
    pub(crate) command_topic: CommandTopic,
}

impl MqttConfig {
    /// Broker hostname or IP literal, resolved by the client at connect time
    pub fn host(&self) -> &str {
        &self.host
    }

    pub const fn port(&self) -> u16 {
        self.port
    }

    /// `None` when the broker accepts anonymous connections
    pub const fn credentials(&self) -> Option<&MqttCredentials> {
        self.credentials.as_ref()
    }

    /// Topic the device subscribes to for control messages
    pub fn command_topic(&self) -> &str {
        &self.command_topic
    }
}

/// Process-wide, read-only device configuration.
///
/// Built once at start-up by [`crate::ConfigLoader`] and passed by reference
/// to the LED driver, the Wi-Fi stack and the MQTT client. The record cannot
/// be mutated; [`DeviceConfig::max_packet_size`] is always derived from the
/// LED count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceConfig {
    pub(crate) led: LedConfig,
    pub(crate) wifi: WifiConfig,
    pub(crate) mqtt: MqttConfig,
    #[serde(rename = "maxPacketSize")]
    pub(crate) max_packet_size: usize,
}

impl DeviceConfig {
    pub(crate) fn new(led: LedConfig, wifi: WifiConfig, mqtt: MqttConfig) -> Self {
        Self {
            max_packet_size: max_packet_size(led.led_count),
            led,
            wifi,
            mqtt,
        }
    }

    pub const fn led(&self) -> &LedConfig {
        &self.led
    }

    pub const fn wifi(&self) -> &WifiConfig {
        &self.wifi
    }

    pub const fn mqtt(&self) -> &MqttConfig {
        &self.mqtt
    }

    /// MQTT transport buffer ceiling; a full-strip update fits in one payload
    pub const fn max_packet_size(&self) -> usize {
        self.max_packet_size
    }

    /// Returns a copy of the record with a different LED count.
    ///
    /// The count is validated and the packet size derived again.
    pub fn with_led_count(&self, led_count: i64) -> Result<Self, ConfigInvalid> {
        let led = LedConfig {
            data_pin: self.led.data_pin,
            led_count: validate::led_count(Some(led_count))?,
        };
        Ok(Self::new(led, self.wifi.clone(), self.mqtt.clone()))
    }

    /// Serialize the record as JSON into `buf`, omitting passwords.
    ///
    /// Returns the number of bytes written.
    pub fn write_json(&self, buf: &mut [u8]) -> Result<usize, serde_json_core::ser::Error> {
        serde_json_core::to_slice(self, buf)
    }
}

struct Redacted(bool);

impl fmt::Debug for Redacted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 {
            f.write_str("\"\"")
        } else {
            f.write_str("\"***\"")
        }
    }
}
