//! Field validation rules
//!
//! Each rule turns an optional raw value into its validated form. Rules are
//! pure: they never touch hardware or the network.

use heapless::String;

use crate::board::Board;
use crate::config::{
    CommandTopic,
    DeviceConfig,
    Hostname,
    LedConfig,
    MqttConfig,
    MqttCredentials,
    MqttHost,
    Ssid,
    WIFI_PASSWORD_MAX_LEN,
    WifiConfig,
    WifiPassword,
};
use crate::error::{ConfigField, ConfigInvalid, InvalidReason};
use crate::source::{PartialConfig, PartialCredentials};

/// Shortest WPA2 passphrase
pub(crate) const WIFI_PASSWORD_MIN_LEN: usize = 8;

/// Validate every field of `partial` for `board` and build the record.
///
/// Fields are checked in declaration order; the first violation is returned.
pub(crate) fn device_config(
    partial: &PartialConfig<'_>,
    board: Board,
) -> Result<DeviceConfig, ConfigInvalid> {
    let led = LedConfig {
        data_pin: data_pin(partial.data_pin, board)?,
        led_count: led_count(partial.led_count)?,
    };
    let wifi = WifiConfig {
        ssid: ssid(partial.wifi_ssid)?,
        password: wifi_password(partial.wifi_password)?,
        hostname: hostname(partial.wifi_hostname)?,
    };
    let mqtt = MqttConfig {
        host: broker_host(partial.mqtt_broker_host)?,
        port: broker_port(partial.mqtt_broker_port)?,
        credentials: credentials(partial.mqtt_credentials)?,
        command_topic: command_topic(partial.command_topic)?,
    };
    Ok(DeviceConfig::new(led, wifi, mqtt))
}

pub(crate) fn data_pin(value: Option<i64>, board: Board) -> Result<u8, ConfigInvalid> {
    const FIELD: ConfigField = ConfigField::DataPin;

    let value = value.ok_or(ConfigInvalid::missing(FIELD))?;
    let max = board.max_gpio();
    let pin = u8::try_from(value)
        .ok()
        .filter(|pin| *pin <= max)
        .ok_or(ConfigInvalid::new(
            FIELD,
            InvalidReason::OutOfRange {
                min: 0,
                max: i64::from(max),
            },
        ))?;
    if !board.is_output_pin(pin) {
        return Err(ConfigInvalid::new(FIELD, InvalidReason::UnsupportedPin));
    }
    Ok(pin)
}

pub(crate) fn led_count(value: Option<i64>) -> Result<u16, ConfigInvalid> {
    const FIELD: ConfigField = ConfigField::LedCount;

    let value = value.ok_or(ConfigInvalid::missing(FIELD))?;
    if value <= 0 {
        return Err(ConfigInvalid::new(FIELD, InvalidReason::NotPositive));
    }
    u16::try_from(value).map_err(|_| {
        ConfigInvalid::new(
            FIELD,
            InvalidReason::OutOfRange {
                min: 1,
                max: i64::from(u16::MAX),
            },
        )
    })
}

fn ssid(value: Option<&str>) -> Result<Ssid, ConfigInvalid> {
    const FIELD: ConfigField = ConfigField::WifiSsid;

    let value = value.ok_or(ConfigInvalid::missing(FIELD))?;
    non_empty(FIELD, value)?;
    no_nul(FIELD, value)?;
    bounded(FIELD, value)
}

fn wifi_password(value: Option<&str>) -> Result<WifiPassword, ConfigInvalid> {
    const FIELD: ConfigField = ConfigField::WifiPassword;

    // Absent means an open network
    let value = value.unwrap_or_default();
    if value.is_empty() {
        return Ok(String::new());
    }
    if value.len() < WIFI_PASSWORD_MIN_LEN {
        return Err(ConfigInvalid::new(
            FIELD,
            InvalidReason::TooShort {
                min: WIFI_PASSWORD_MIN_LEN,
            },
        ));
    }
    let password: WifiPassword = bounded(FIELD, value)?;
    // 64 characters is a raw PSK, anything shorter a printable ASCII passphrase
    let valid_chars = if password.len() == WIFI_PASSWORD_MAX_LEN {
        password.bytes().all(|b| b.is_ascii_hexdigit())
    } else {
        password.bytes().all(|b| matches!(b, 0x20..=0x7E))
    };
    if !valid_chars {
        return Err(ConfigInvalid::new(FIELD, InvalidReason::InvalidCharacter));
    }
    Ok(password)
}

fn hostname(value: Option<&str>) -> Result<Hostname, ConfigInvalid> {
    const FIELD: ConfigField = ConfigField::WifiHostname;

    let value = value.ok_or(ConfigInvalid::missing(FIELD))?;
    non_empty(FIELD, value)?;
    let hostname: Hostname = bounded(FIELD, value)?;
    let valid_chars = hostname
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-');
    if !valid_chars || hostname.starts_with('-') || hostname.ends_with('-') {
        return Err(ConfigInvalid::new(FIELD, InvalidReason::InvalidCharacter));
    }
    Ok(hostname)
}

fn broker_host(value: Option<&str>) -> Result<MqttHost, ConfigInvalid> {
    const FIELD: ConfigField = ConfigField::MqttBrokerHost;

    let value = value.ok_or(ConfigInvalid::missing(FIELD))?;
    non_empty(FIELD, value)?;
    if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ConfigInvalid::new(FIELD, InvalidReason::InvalidCharacter));
    }
    bounded(FIELD, value)
}

fn broker_port(value: Option<i64>) -> Result<u16, ConfigInvalid> {
    const FIELD: ConfigField = ConfigField::MqttBrokerPort;

    let value = value.ok_or(ConfigInvalid::missing(FIELD))?;
    u16::try_from(value)
        .ok()
        .filter(|port| *port != 0)
        .ok_or(ConfigInvalid::new(
            FIELD,
            InvalidReason::OutOfRange {
                min: 1,
                max: i64::from(u16::MAX),
            },
        ))
}

fn credentials(
    value: Option<PartialCredentials<'_>>,
) -> Result<Option<MqttCredentials>, ConfigInvalid> {
    const FIELD: ConfigField = ConfigField::MqttCredentials;

    let Some(value) = value else {
        return Ok(None);
    };
    let username = value.username.unwrap_or_default();
    let password = value.password.unwrap_or_default();
    match (username.is_empty(), password.is_empty()) {
        (true, true) => Ok(None),
        // MQTT does not allow a password without a user name
        (true, false) => Err(ConfigInvalid::new(FIELD, InvalidReason::Incomplete)),
        (false, _) => {
            no_nul(FIELD, username)?;
            no_nul(FIELD, password)?;
            Ok(Some(MqttCredentials {
                username: bounded(FIELD, username)?,
                password: bounded(FIELD, password)?,
            }))
        }
    }
}

fn command_topic(value: Option<&str>) -> Result<CommandTopic, ConfigInvalid> {
    const FIELD: ConfigField = ConfigField::CommandTopic;

    let value = value.ok_or(ConfigInvalid::missing(FIELD))?;
    non_empty(FIELD, value)?;
    no_nul(FIELD, value)?;
    bounded(FIELD, value)
}

fn non_empty(field: ConfigField, value: &str) -> Result<(), ConfigInvalid> {
    if value.is_empty() {
        return Err(ConfigInvalid::new(field, InvalidReason::Empty));
    }
    Ok(())
}

/// Flash records are NUL padded, so a NUL would truncate the stored value
fn no_nul(field: ConfigField, value: &str) -> Result<(), ConfigInvalid> {
    if value.contains('\0') {
        return Err(ConfigInvalid::new(field, InvalidReason::InvalidCharacter));
    }
    Ok(())
}

/// Copy `value` into a fixed-capacity string
fn bounded<const N: usize>(field: ConfigField, value: &str) -> Result<String<N>, ConfigInvalid> {
    let mut out = String::new();
    out.push_str(value)
        .map_err(|()| ConfigInvalid::new(field, InvalidReason::TooLong { max: N }))?;
    Ok(out)
}
