//! Configuration sources
//!
//! Every source yields a [`PartialConfig`]: the raw, unvalidated values it
//! knows about. The loader overlays the sources on top of each other and
//! validates the result once.

mod json;
mod key_value;

pub use json::JsonSource;
pub use key_value::{KeyValueSource, KeyValueStore, keys};

use serde::Deserialize;

use crate::error::ConfigInvalid;

/// Anything that can contribute configuration values
pub trait ConfigSource {
    /// Read the values this source provides.
    ///
    /// The values may borrow from the source, so keep it alive for as long
    /// as the result is used. [`JsonSource::parse`] borrows from the
    /// document instead.
    fn read(&self) -> Result<PartialConfig<'_>, ConfigInvalid>;
}

/// Broker login as provided by a source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialCredentials<'a> {
    #[serde(borrow, default)]
    pub username: Option<&'a str>,
    #[serde(borrow, default)]
    pub password: Option<&'a str>,
}

/// Unvalidated configuration values.
///
/// Every field is optional so sources can be layered. Numbers are kept as
/// `i64`, which lets negative counts or out-of-range ports reach validation
/// instead of failing at parse time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig<'a> {
    #[serde(rename = "dataPin", default)]
    pub data_pin: Option<i64>,
    #[serde(rename = "ledCount", default)]
    pub led_count: Option<i64>,
    #[serde(rename = "wifiSSID", borrow, default)]
    pub wifi_ssid: Option<&'a str>,
    #[serde(rename = "wifiPassword", borrow, default)]
    pub wifi_password: Option<&'a str>,
    #[serde(rename = "wifiHostname", borrow, default)]
    pub wifi_hostname: Option<&'a str>,
    #[serde(rename = "mqttBrokerHost", borrow, default)]
    pub mqtt_broker_host: Option<&'a str>,
    #[serde(rename = "mqttBrokerPort", default)]
    pub mqtt_broker_port: Option<i64>,
    #[serde(rename = "mqttCredentials", borrow, default)]
    pub mqtt_credentials: Option<PartialCredentials<'a>>,
    #[serde(rename = "commandTopic", borrow, default)]
    pub command_topic: Option<&'a str>,
}

impl PartialConfig<'static> {
    /// Compiled-in defaults.
    ///
    /// Holds only non-secret values: network names, passwords and the broker
    /// address always come from an external source.
    pub const DEFAULTS: PartialConfig<'static> = PartialConfig {
        data_pin: Some(18),
        led_count: Some(300),
        wifi_ssid: None,
        wifi_password: None,
        wifi_hostname: Some("esp-led"),
        mqtt_broker_host: None,
        mqtt_broker_port: Some(1883),
        mqtt_credentials: None,
        command_topic: Some("lights/control"),
    };
}

impl<'a> PartialConfig<'a> {
    /// Configuration without any value
    pub const fn empty() -> Self {
        Self {
            data_pin: None,
            led_count: None,
            wifi_ssid: None,
            wifi_password: None,
            wifi_hostname: None,
            mqtt_broker_host: None,
            mqtt_broker_port: None,
            mqtt_credentials: None,
            command_topic: None,
        }
    }

    /// Merge `upper` on top of `self`; values present in `upper` win.
    ///
    /// Credentials are replaced as a whole, never merged per field.
    #[must_use]
    pub fn overlay(self, upper: PartialConfig<'a>) -> PartialConfig<'a> {
        PartialConfig {
            data_pin: upper.data_pin.or(self.data_pin),
            led_count: upper.led_count.or(self.led_count),
            wifi_ssid: upper.wifi_ssid.or(self.wifi_ssid),
            wifi_password: upper.wifi_password.or(self.wifi_password),
            wifi_hostname: upper.wifi_hostname.or(self.wifi_hostname),
            mqtt_broker_host: upper.mqtt_broker_host.or(self.mqtt_broker_host),
            mqtt_broker_port: upper.mqtt_broker_port.or(self.mqtt_broker_port),
            mqtt_credentials: upper.mqtt_credentials.or(self.mqtt_credentials),
            command_topic: upper.command_topic.or(self.command_topic),
        }
    }
}

impl ConfigSource for PartialConfig<'_> {
    fn read(&self) -> Result<PartialConfig<'_>, ConfigInvalid> {
        Ok(*self)
    }
}
