//! Integration tests for loading and validating the device configuration.

use esp_led_config::{
    Board,
    ConfigField,
    ConfigInvalid,
    ConfigLoader,
    ConfigSource,
    DeviceConfig,
    InvalidReason,
    JsonSource,
    KeyValueSource,
    PartialConfig,
    PartialCredentials,
    max_packet_size,
};

/// Site data that is never compiled in
const SITE: PartialConfig<'static> = PartialConfig {
    wifi_ssid: Some("workshop"),
    wifi_password: Some("hunter2hunter2"),
    mqtt_broker_host: Some("broker.local"),
    ..PartialConfig::empty()
};

fn load(upper: PartialConfig<'_>) -> Result<DeviceConfig, ConfigInvalid> {
    ConfigLoader::new(Board::Esp32).load(&[&SITE, &upper])
}

fn load_err(upper: PartialConfig<'_>) -> ConfigInvalid {
    load(upper).expect_err("configuration should be rejected")
}

// -----------------------------------------------------------------------------
// Defaults and derived packet size
// -----------------------------------------------------------------------------

#[test]
fn defaults_with_site_data_load() {
    let config = load(PartialConfig::empty()).unwrap();

    assert_eq!(config.led().data_pin(), 18);
    assert_eq!(config.led().led_count(), 300);
    assert_eq!(config.wifi().ssid(), "workshop");
    assert_eq!(config.wifi().password(), "hunter2hunter2");
    assert_eq!(config.wifi().hostname(), "esp-led");
    assert!(!config.wifi().is_open());
    assert_eq!(config.mqtt().host(), "broker.local");
    assert_eq!(config.mqtt().port(), 1883);
    assert!(config.mqtt().credentials().is_none());
    assert_eq!(config.mqtt().command_topic(), "lights/control");
}

#[test]
fn three_hundred_leds_need_4202_bytes() {
    let config = load(PartialConfig {
        led_count: Some(300),
        ..PartialConfig::empty()
    })
    .unwrap();

    assert_eq!(config.max_packet_size(), 300 * 14 + 2);
    assert_eq!(config.max_packet_size(), 4202);
}

#[test]
fn packet_size_follows_led_count() {
    for count in [1_i64, 2, 60, 144, 1000, 65535] {
        let config = load(PartialConfig {
            led_count: Some(count),
            ..PartialConfig::empty()
        })
        .unwrap();

        let expected = usize::try_from(count).unwrap() * 14 + 2;
        assert_eq!(config.max_packet_size(), expected);
        assert_eq!(config.max_packet_size(), max_packet_size(config.led().led_count()));
    }
}

#[test]
fn with_led_count_rederives_packet_size() {
    let config = load(PartialConfig::empty()).unwrap();
    let resized = config.with_led_count(60).unwrap();

    assert_eq!(resized.led().led_count(), 60);
    assert_eq!(resized.max_packet_size(), 60 * 14 + 2);
    assert_eq!(resized.wifi(), config.wifi());
    assert_eq!(resized.mqtt(), config.mqtt());
    // The original record is untouched
    assert_eq!(config.max_packet_size(), 4202);
}

#[test]
fn with_led_count_rejects_zero() {
    let config = load(PartialConfig::empty()).unwrap();
    let error = config.with_led_count(0).unwrap_err();

    assert_eq!(error.field, ConfigField::LedCount);
    assert_eq!(error.reason, InvalidReason::NotPositive);
}

// -----------------------------------------------------------------------------
// Rejected values
// -----------------------------------------------------------------------------

#[test]
fn non_positive_led_count_is_rejected() {
    for count in [0_i64, -1, -300] {
        let error = load_err(PartialConfig {
            led_count: Some(count),
            ..PartialConfig::empty()
        });

        assert_eq!(error.field, ConfigField::LedCount);
        assert_eq!(error.reason, InvalidReason::NotPositive);
        assert_eq!(error.to_string(), "ledCount must be positive");
    }
}

#[test]
fn oversized_led_count_is_rejected() {
    let error = load_err(PartialConfig {
        led_count: Some(65536),
        ..PartialConfig::empty()
    });

    assert_eq!(error.field, ConfigField::LedCount);
    assert_eq!(
        error.reason,
        InvalidReason::OutOfRange { min: 1, max: 65535 }
    );
}

#[test]
fn port_outside_range_is_rejected() {
    for port in [0_i64, -1, 65536, 100_000] {
        let error = load_err(PartialConfig {
            mqtt_broker_port: Some(port),
            ..PartialConfig::empty()
        });

        assert_eq!(error.field, ConfigField::MqttBrokerPort);
        assert_eq!(error.to_string(), "mqttBrokerPort must be in 1..=65535");
    }
}

#[test]
fn port_bounds_are_accepted() {
    for port in [1_i64, 8883, 65535] {
        let config = load(PartialConfig {
            mqtt_broker_port: Some(port),
            ..PartialConfig::empty()
        })
        .unwrap();

        assert_eq!(i64::from(config.mqtt().port()), port);
    }
}

#[test]
fn empty_command_topic_is_rejected() {
    let error = load_err(PartialConfig {
        command_topic: Some(""),
        ..PartialConfig::empty()
    });

    assert_eq!(error.field, ConfigField::CommandTopic);
    assert_eq!(error.reason, InvalidReason::Empty);
    assert_eq!(error.to_string(), "commandTopic must not be empty");
}

#[test]
fn command_topic_with_nul_is_rejected() {
    let error = load_err(PartialConfig {
        command_topic: Some("lights/\0control"),
        ..PartialConfig::empty()
    });

    assert_eq!(error.field, ConfigField::CommandTopic);
    assert_eq!(error.reason, InvalidReason::InvalidCharacter);
}

#[test]
fn missing_ssid_is_reported() {
    let error = ConfigLoader::new(Board::Esp32)
        .load(&[&PartialConfig {
            mqtt_broker_host: Some("broker.local"),
            ..PartialConfig::empty()
        }])
        .unwrap_err();

    assert_eq!(error.field, ConfigField::WifiSsid);
    assert_eq!(error.reason, InvalidReason::Missing);
}

#[test]
fn missing_broker_host_is_reported() {
    let error = ConfigLoader::new(Board::Esp32)
        .load(&[&PartialConfig {
            wifi_ssid: Some("workshop"),
            ..PartialConfig::empty()
        }])
        .unwrap_err();

    assert_eq!(error.field, ConfigField::MqttBrokerHost);
    assert_eq!(error.reason, InvalidReason::Missing);
}

#[test]
fn empty_ssid_is_rejected() {
    let error = load_err(PartialConfig {
        wifi_ssid: Some(""),
        ..PartialConfig::empty()
    });

    assert_eq!(error.field, ConfigField::WifiSsid);
    assert_eq!(error.reason, InvalidReason::Empty);
}

#[test]
fn long_ssid_is_rejected() {
    let error = load_err(PartialConfig {
        wifi_ssid: Some("a-network-name-that-is-way-too-long"),
        ..PartialConfig::empty()
    });

    assert_eq!(error.field, ConfigField::WifiSsid);
    assert_eq!(error.reason, InvalidReason::TooLong { max: 32 });
}

#[test]
fn missing_or_empty_password_means_open_network() {
    let open = ConfigLoader::new(Board::Esp32)
        .load(&[&PartialConfig {
            wifi_ssid: Some("Panera WiFi"),
            mqtt_broker_host: Some("broker.local"),
            ..PartialConfig::empty()
        }])
        .unwrap();
    assert!(open.wifi().is_open());

    let empty = load(PartialConfig {
        wifi_password: Some(""),
        ..PartialConfig::empty()
    })
    .unwrap();
    assert!(empty.wifi().is_open());
}

#[test]
fn short_password_is_rejected() {
    let error = load_err(PartialConfig {
        wifi_password: Some("1234567"),
        ..PartialConfig::empty()
    });

    assert_eq!(error.field, ConfigField::WifiPassword);
    assert_eq!(error.reason, InvalidReason::TooShort { min: 8 });
}

#[test]
fn raw_psk_must_be_hex() {
    let psk = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";
    assert_eq!(psk.len(), 64);
    let config = load(PartialConfig {
        wifi_password: Some(psk),
        ..PartialConfig::empty()
    })
    .unwrap();
    assert_eq!(config.wifi().password(), psk);

    let not_hex = "zzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz";
    let error = load_err(PartialConfig {
        wifi_password: Some(not_hex),
        ..PartialConfig::empty()
    });
    assert_eq!(error.field, ConfigField::WifiPassword);
    assert_eq!(error.reason, InvalidReason::InvalidCharacter);
}

#[test]
fn passphrase_must_be_printable_ascii() {
    let config = load(PartialConfig {
        wifi_password: Some("correct horse ~battery!"),
        ..PartialConfig::empty()
    })
    .unwrap();
    assert_eq!(config.wifi().password(), "correct horse ~battery!");

    for password in ["\0\0\0\0\0\0\0\0", "hunter2\thunter2", "pässwörter", "hunter2\x7f"] {
        let error = load_err(PartialConfig {
            wifi_password: Some(password),
            ..PartialConfig::empty()
        });
        assert_eq!(error.field, ConfigField::WifiPassword);
        assert_eq!(error.reason, InvalidReason::InvalidCharacter);
    }
}

#[test]
fn nul_in_ssid_is_rejected() {
    let error = load_err(PartialConfig {
        wifi_ssid: Some("work\0shop"),
        ..PartialConfig::empty()
    });

    assert_eq!(error.field, ConfigField::WifiSsid);
    assert_eq!(error.reason, InvalidReason::InvalidCharacter);
}

#[test]
fn nul_in_credentials_is_rejected() {
    let cases = [
        PartialCredentials {
            username: Some("strip\0"),
            password: Some("secret"),
        },
        PartialCredentials {
            username: Some("strip"),
            password: Some("\0\0\0\0"),
        },
    ];
    for credentials in cases {
        let error = load_err(PartialConfig {
            mqtt_credentials: Some(credentials),
            ..PartialConfig::empty()
        });
        assert_eq!(error.field, ConfigField::MqttCredentials);
        assert_eq!(error.reason, InvalidReason::InvalidCharacter);
    }
}

#[test]
fn hostname_characters_are_checked() {
    let config = load(PartialConfig {
        wifi_hostname: Some("buildStation"),
        ..PartialConfig::empty()
    })
    .unwrap();
    assert_eq!(config.wifi().hostname(), "buildStation");

    for hostname in ["build station", "-station", "station-", "st_ation"] {
        let error = load_err(PartialConfig {
            wifi_hostname: Some(hostname),
            ..PartialConfig::empty()
        });
        assert_eq!(error.field, ConfigField::WifiHostname);
        assert_eq!(error.reason, InvalidReason::InvalidCharacter);
    }
}

#[test]
fn broker_host_with_whitespace_is_rejected() {
    let error = load_err(PartialConfig {
        mqtt_broker_host: Some("broker .local"),
        ..PartialConfig::empty()
    });

    assert_eq!(error.field, ConfigField::MqttBrokerHost);
    assert_eq!(error.reason, InvalidReason::InvalidCharacter);
}

#[test]
fn broker_ip_literal_is_accepted() {
    let config = load(PartialConfig {
        mqtt_broker_host: Some("192.168.1.10"),
        ..PartialConfig::empty()
    })
    .unwrap();

    assert_eq!(config.mqtt().host(), "192.168.1.10");
}

#[test]
fn credentials_are_optional() {
    let config = load(PartialConfig {
        mqtt_credentials: Some(PartialCredentials {
            username: Some("strip"),
            password: Some("secret"),
        }),
        ..PartialConfig::empty()
    })
    .unwrap();

    let credentials = config.mqtt().credentials().unwrap();
    assert_eq!(credentials.username(), "strip");
    assert_eq!(credentials.password(), "secret");

    let anonymous = load(PartialConfig {
        mqtt_credentials: Some(PartialCredentials::default()),
        ..PartialConfig::empty()
    })
    .unwrap();
    assert!(anonymous.mqtt().credentials().is_none());
}

#[test]
fn password_without_username_is_rejected() {
    let error = load_err(PartialConfig {
        mqtt_credentials: Some(PartialCredentials {
            username: None,
            password: Some("secret"),
        }),
        ..PartialConfig::empty()
    });

    assert_eq!(error.field, ConfigField::MqttCredentials);
    assert_eq!(error.reason, InvalidReason::Incomplete);
}

#[test]
fn first_invalid_field_wins() {
    let error = load_err(PartialConfig {
        led_count: Some(0),
        mqtt_broker_port: Some(0),
        command_topic: Some(""),
        ..PartialConfig::empty()
    });

    assert_eq!(error.field, ConfigField::LedCount);
}

// -----------------------------------------------------------------------------
// Data pin and boards
// -----------------------------------------------------------------------------

#[test]
fn flash_pins_are_rejected() {
    for pin in 6..=11 {
        let error = load_err(PartialConfig {
            data_pin: Some(pin),
            ..PartialConfig::empty()
        });
        assert_eq!(error.field, ConfigField::DataPin);
        assert_eq!(error.reason, InvalidReason::UnsupportedPin);
    }
}

#[test]
fn input_only_pins_are_rejected() {
    let error = load_err(PartialConfig {
        data_pin: Some(34),
        ..PartialConfig::empty()
    });

    assert_eq!(error.reason, InvalidReason::UnsupportedPin);
}

#[test]
fn pins_beyond_the_board_are_out_of_range() {
    for pin in [-1_i64, 40, 255, 1000] {
        let error = load_err(PartialConfig {
            data_pin: Some(pin),
            ..PartialConfig::empty()
        });
        assert_eq!(error.field, ConfigField::DataPin);
        assert_eq!(error.reason, InvalidReason::OutOfRange { min: 0, max: 39 });
    }
}

#[test]
fn pin_table_depends_on_board() {
    let upper = PartialConfig {
        data_pin: Some(8),
        ..PartialConfig::empty()
    };

    let esp32 = ConfigLoader::new(Board::Esp32).load(&[&SITE, &upper]);
    let c3 = ConfigLoader::new(Board::Esp32C3).load(&[&SITE, &upper]);

    assert_eq!(esp32.unwrap_err().reason, InvalidReason::UnsupportedPin);
    assert_eq!(c3.unwrap().led().data_pin(), 8);
}

// -----------------------------------------------------------------------------
// Layering
// -----------------------------------------------------------------------------

#[test]
fn later_sources_win() {
    let provisioning = JsonSource::from_text(
        r#"{"wifiSSID":"provisioned","mqttBrokerHost":"broker.local","ledCount":144}"#,
    );
    let overrides = [("LED_COUNT", "60"), ("MQTT_PORT", "8883")];
    let overrides = KeyValueSource::new(&overrides);

    let config = ConfigLoader::new(Board::Esp32)
        .load(&[&provisioning, &overrides])
        .unwrap();

    assert_eq!(config.wifi().ssid(), "provisioned");
    assert_eq!(config.led().led_count(), 60);
    assert_eq!(config.max_packet_size(), 60 * 14 + 2);
    assert_eq!(config.mqtt().port(), 8883);
    assert_eq!(config.mqtt().command_topic(), "lights/control");
}

#[test]
fn custom_defaults_replace_compiled_ones() {
    let defaults = PartialConfig {
        led_count: Some(26),
        data_pin: Some(25),
        ..PartialConfig::DEFAULTS
    };

    let config = ConfigLoader::new(Board::Esp32)
        .with_defaults(defaults)
        .load(&[&SITE])
        .unwrap();

    assert_eq!(config.led().led_count(), 26);
    assert_eq!(config.led().data_pin(), 25);
    assert_eq!(config.mqtt().port(), 1883);
}

#[test]
fn failing_source_aborts_load() {
    let broken = JsonSource::from_text("{not json");
    let sources: [&dyn ConfigSource; 2] = [&SITE, &broken];

    let error = ConfigLoader::default().load(&sources).unwrap_err();

    assert_eq!(error.field, ConfigField::Source);
    assert_eq!(error.reason, InvalidReason::Malformed);
}

// -----------------------------------------------------------------------------
// Determinism and sharing
// -----------------------------------------------------------------------------

#[test]
fn identical_input_gives_equal_records() {
    let first = load(PartialConfig {
        led_count: Some(42),
        ..PartialConfig::empty()
    })
    .unwrap();
    let second = load(PartialConfig {
        led_count: Some(42),
        ..PartialConfig::empty()
    })
    .unwrap();

    assert_eq!(first, second);
}

#[test]
fn record_can_be_shared_between_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DeviceConfig>();

    let config = std::sync::Arc::new(load(PartialConfig::empty()).unwrap());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let config = std::sync::Arc::clone(&config);
            std::thread::spawn(move || config.max_packet_size())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 4202);
    }
}
