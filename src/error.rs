//! Configuration error types

use core::fmt;

/// Field of the device configuration an error refers to.
///
/// Names follow the provisioning document keys (`ledCount`, `commandTopic`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigField {
    DataPin,
    LedCount,
    WifiSsid,
    WifiPassword,
    WifiHostname,
    MqttBrokerHost,
    MqttBrokerPort,
    MqttCredentials,
    CommandTopic,
    /// The configuration source as a whole (malformed document, unreadable record).
    Source,
}

impl ConfigField {
    /// All fields in validation order.
    pub const ALL: [ConfigField; 10] = [
        ConfigField::DataPin,
        ConfigField::LedCount,
        ConfigField::WifiSsid,
        ConfigField::WifiPassword,
        ConfigField::WifiHostname,
        ConfigField::MqttBrokerHost,
        ConfigField::MqttBrokerPort,
        ConfigField::MqttCredentials,
        ConfigField::CommandTopic,
        ConfigField::Source,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ConfigField::DataPin => "dataPin",
            ConfigField::LedCount => "ledCount",
            ConfigField::WifiSsid => "wifiSSID",
            ConfigField::WifiPassword => "wifiPassword",
            ConfigField::WifiHostname => "wifiHostname",
            ConfigField::MqttBrokerHost => "mqttBrokerHost",
            ConfigField::MqttBrokerPort => "mqttBrokerPort",
            ConfigField::MqttCredentials => "mqttCredentials",
            ConfigField::CommandTopic => "commandTopic",
            ConfigField::Source => "source",
        }
    }

    /// Numeric code of the field, `1..=10`.
    ///
    /// Used as the pulse count of the diagnostic blink pattern.
    pub const fn code(self) -> u8 {
        match self {
            ConfigField::DataPin => 1,
            ConfigField::LedCount => 2,
            ConfigField::WifiSsid => 3,
            ConfigField::WifiPassword => 4,
            ConfigField::WifiHostname => 5,
            ConfigField::MqttBrokerHost => 6,
            ConfigField::MqttBrokerPort => 7,
            ConfigField::MqttCredentials => 8,
            ConfigField::CommandTopic => 9,
            ConfigField::Source => 10,
        }
    }
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a field was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvalidReason {
    /// No source provided a value for a required field
    Missing,
    /// Value is an empty string
    Empty,
    /// Value is zero or negative
    NotPositive,
    /// Value lies outside of `min..=max`
    OutOfRange { min: i64, max: i64 },
    /// Value is shorter than `min` bytes
    TooShort { min: usize },
    /// Value is longer than `max` bytes
    TooLong { max: usize },
    /// Value contains a character that is not allowed for this field
    InvalidCharacter,
    /// Value only makes sense together with another one that is absent
    Incomplete,
    /// Pin is not able to drive a digital output on the target board
    UnsupportedPin,
    /// Value could not be parsed
    Malformed,
    /// Underlying storage could not be read
    Unreadable,
}

/// The single configuration error kind.
///
/// Raised once at load time. It is never retried: an invalid configuration
/// must keep the device from starting Wi-Fi or MQTT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfigInvalid {
    pub field: ConfigField,
    pub reason: InvalidReason,
}

impl ConfigInvalid {
    pub const fn new(field: ConfigField, reason: InvalidReason) -> Self {
        Self { field, reason }
    }

    pub const fn missing(field: ConfigField) -> Self {
        Self::new(field, InvalidReason::Missing)
    }

    pub const fn malformed(field: ConfigField) -> Self {
        Self::new(field, InvalidReason::Malformed)
    }
}

impl fmt::Display for ConfigInvalid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = self.field;
        match self.reason {
            InvalidReason::Missing => write!(f, "{field} is missing"),
            InvalidReason::Empty => write!(f, "{field} must not be empty"),
            InvalidReason::NotPositive => write!(f, "{field} must be positive"),
            InvalidReason::OutOfRange { min, max } => {
                write!(f, "{field} must be in {min}..={max}")
            }
            InvalidReason::TooShort { min } => {
                write!(f, "{field} must be at least {min} bytes")
            }
            InvalidReason::TooLong { max } => {
                write!(f, "{field} must be at most {max} bytes")
            }
            InvalidReason::InvalidCharacter => {
                write!(f, "{field} contains an invalid character")
            }
            InvalidReason::Incomplete => write!(f, "{field} is incomplete"),
            InvalidReason::UnsupportedPin => {
                write!(f, "{field} is not an output-capable pin on this board")
            }
            InvalidReason::Malformed => write!(f, "{field} is malformed"),
            InvalidReason::Unreadable => write!(f, "{field} could not be read"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigInvalid {}
