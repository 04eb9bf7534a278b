//! Environment-style `KEY=value` configuration
//!
//! Values may come from a build environment, a provisioning shell or
//! any other string store implementing [`KeyValueStore`].

use core::fmt::Write as _;

use heapless::String;

use super::{ConfigSource, PartialConfig, PartialCredentials};
use crate::error::{ConfigField, ConfigInvalid, InvalidReason};

/// Recognized keys, without prefix
pub mod keys {
    pub const DATA_PIN: &str = "DATA_PIN";
    pub const LED_COUNT: &str = "LED_COUNT";
    pub const WIFI_SSID: &str = "WIFI_SSID";
    pub const WIFI_PASSWORD: &str = "WIFI_PASSWORD";
    pub const WIFI_HOSTNAME: &str = "WIFI_HOSTNAME";
    pub const MQTT_HOST: &str = "MQTT_HOST";
    pub const MQTT_PORT: &str = "MQTT_PORT";
    pub const MQTT_USERNAME: &str = "MQTT_USERNAME";
    pub const MQTT_PASSWORD: &str = "MQTT_PASSWORD";
    pub const MQTT_COMMAND_TOPIC: &str = "MQTT_COMMAND_TOPIC";
}

/// Longest supported `prefix + key`
const MAX_KEY_LEN: usize = 64;

/// String key/value lookup
pub trait KeyValueStore {
    fn lookup(&self, key: &str) -> Option<&str>;
}

impl KeyValueStore for [(&str, &str)] {
    fn lookup(&self, key: &str) -> Option<&str> {
        self.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }
}

impl<const N: usize> KeyValueStore for [(&str, &str); N] {
    fn lookup(&self, key: &str) -> Option<&str> {
        KeyValueStore::lookup(self.as_slice(), key)
    }
}

#[cfg(feature = "std")]
impl KeyValueStore for std::collections::HashMap<std::string::String, std::string::String> {
    fn lookup(&self, key: &str) -> Option<&str> {
        self.get(key).map(std::string::String::as_str)
    }
}

#[cfg(feature = "std")]
impl KeyValueStore for std::collections::BTreeMap<std::string::String, std::string::String> {
    fn lookup(&self, key: &str) -> Option<&str> {
        self.get(key).map(std::string::String::as_str)
    }
}

/// Reads the [`keys`] from a [`KeyValueStore`], optionally prefixed
/// (e.g. `ESP_LED_` + `WIFI_SSID`).
pub struct KeyValueSource<'s, S: ?Sized> {
    store: &'s S,
    prefix: &'s str,
}

impl<S: ?Sized> Clone for KeyValueSource<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: ?Sized> Copy for KeyValueSource<'_, S> {}

impl<'s, S: KeyValueStore + ?Sized> KeyValueSource<'s, S> {
    pub const fn new(store: &'s S) -> Self {
        Self { store, prefix: "" }
    }

    #[must_use]
    pub const fn with_prefix(self, prefix: &'s str) -> Self {
        Self {
            store: self.store,
            prefix,
        }
    }

    fn get(&self, key: &str) -> Result<Option<&'s str>, ConfigInvalid> {
        if self.prefix.is_empty() {
            return Ok(self.store.lookup(key));
        }
        let mut full_key = String::<MAX_KEY_LEN>::new();
        write!(full_key, "{}{}", self.prefix, key).map_err(|_| {
            ConfigInvalid::new(
                ConfigField::Source,
                InvalidReason::TooLong { max: MAX_KEY_LEN },
            )
        })?;
        Ok(self.store.lookup(&full_key))
    }

    fn get_number(&self, key: &str, field: ConfigField) -> Result<Option<i64>, ConfigInvalid> {
        self.get(key)?
            .map(|value| {
                value
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| ConfigInvalid::malformed(field))
            })
            .transpose()
    }
}

impl<S: KeyValueStore + ?Sized> ConfigSource for KeyValueSource<'_, S> {
    fn read(&self) -> Result<PartialConfig<'_>, ConfigInvalid> {
        let username = self.get(keys::MQTT_USERNAME)?;
        let password = self.get(keys::MQTT_PASSWORD)?;
        let mqtt_credentials = if username.is_some() || password.is_some() {
            Some(PartialCredentials { username, password })
        } else {
            None
        };

        Ok(PartialConfig {
            data_pin: self.get_number(keys::DATA_PIN, ConfigField::DataPin)?,
            led_count: self.get_number(keys::LED_COUNT, ConfigField::LedCount)?,
            wifi_ssid: self.get(keys::WIFI_SSID)?,
            wifi_password: self.get(keys::WIFI_PASSWORD)?,
            wifi_hostname: self.get(keys::WIFI_HOSTNAME)?,
            mqtt_broker_host: self.get(keys::MQTT_HOST)?,
            mqtt_broker_port: self.get_number(keys::MQTT_PORT, ConfigField::MqttBrokerPort)?,
            mqtt_credentials,
            command_topic: self.get(keys::MQTT_COMMAND_TOPIC)?,
        })
    }
}
