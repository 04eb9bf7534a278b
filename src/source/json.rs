//! Provisioning documents in JSON
//!
//! ```json
//! {
//!   "ledCount": 300,
//!   "wifiSSID": "workshop",
//!   "wifiPassword": "hunter22",
//!   "mqttBrokerHost": "broker.local",
//!   "mqttCredentials": { "username": "strip", "password": "secret" },
//!   "commandTopic": "lights/control"
//! }
//! ```
//!
//! String values are borrowed from the document, so escape sequences are
//! not supported: a value containing `\` is rejected as malformed.

use super::{ConfigSource, PartialConfig};
use crate::error::{ConfigField, ConfigInvalid};

/// JSON document as sent by a provisioning page or stored by a host tool
#[derive(Debug, Clone, Copy)]
pub struct JsonSource<'a> {
    document: &'a [u8],
}

impl<'a> JsonSource<'a> {
    pub const fn new(document: &'a [u8]) -> Self {
        Self { document }
    }

    pub const fn from_text(document: &'a str) -> Self {
        Self::new(document.as_bytes())
    }

    /// Parse the document.
    ///
    /// Unlike [`ConfigSource::read`], the values borrow from the document
    /// rather than from `self`.
    pub fn parse(&self) -> Result<PartialConfig<'a>, ConfigInvalid> {
        let config = match serde_json_core::from_slice::<PartialConfig<'a>>(self.document) {
            Ok((config, _)) => config,
            Err(_e) => {
                #[cfg(feature = "log")]
                log::warn!("config: rejected JSON document: {:?}", _e);
                return Err(ConfigInvalid::malformed(ConfigField::Source));
            }
        };
        reject_escapes(&config)?;
        Ok(config)
    }
}

impl ConfigSource for JsonSource<'_> {
    fn read(&self) -> Result<PartialConfig<'_>, ConfigInvalid> {
        self.parse()
    }
}

/// Borrowed strings still hold their raw escape sequences
fn reject_escapes(config: &PartialConfig<'_>) -> Result<(), ConfigInvalid> {
    let (username, password) = config
        .mqtt_credentials
        .map(|credentials| (credentials.username, credentials.password))
        .unwrap_or_default();
    let strings = [
        (ConfigField::WifiSsid, config.wifi_ssid),
        (ConfigField::WifiPassword, config.wifi_password),
        (ConfigField::WifiHostname, config.wifi_hostname),
        (ConfigField::MqttBrokerHost, config.mqtt_broker_host),
        (ConfigField::MqttCredentials, username),
        (ConfigField::MqttCredentials, password),
        (ConfigField::CommandTopic, config.command_topic),
    ];
    for (field, value) in strings {
        if value.is_some_and(|value| value.contains('\\')) {
            #[cfg(feature = "log")]
            log::warn!("config: escape sequence in JSON value of {}", field);
            return Err(ConfigInvalid::malformed(field));
        }
    }
    Ok(())
}
