//! Target boards and their GPIO capabilities

/// Chip family the firmware is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Board {
    /// Classic ESP32 (Xtensa LX6)
    #[default]
    Esp32,
    /// ESP32-C3 (RISC-V)
    Esp32C3,
    /// ESP32-C6 (RISC-V)
    Esp32C6,
    /// ESP32-S3 (Xtensa LX7)
    Esp32S3,
}

impl Board {
    pub const fn name(self) -> &'static str {
        match self {
            Board::Esp32 => "ESP32",
            Board::Esp32C3 => "ESP32-C3",
            Board::Esp32C6 => "ESP32-C6",
            Board::Esp32S3 => "ESP32-S3",
        }
    }

    /// Highest GPIO number present on the chip
    pub const fn max_gpio(self) -> u8 {
        match self {
            Board::Esp32 => 39,
            Board::Esp32C3 => 21,
            Board::Esp32C6 => 30,
            Board::Esp32S3 => 48,
        }
    }

    /// Returns `true` if `pin` exists and can drive a digital output.
    ///
    /// Pins wired to the SPI flash and input-only pins are excluded.
    pub const fn is_output_pin(self, pin: u8) -> bool {
        match self {
            // 6..=11 flash, 34..=39 input only, 20/24/28..=31 not bonded
            Board::Esp32 => matches!(pin, 0..=5 | 12..=19 | 21..=23 | 25..=27 | 32 | 33),
            // 12..=17 flash
            Board::Esp32C3 => matches!(pin, 0..=11 | 18..=21),
            // 24..=30 flash
            Board::Esp32C6 => matches!(pin, 0..=23),
            // 22..=25 not bonded, 26..=32 flash/PSRAM
            Board::Esp32S3 => matches!(pin, 0..=21 | 33..=48),
        }
    }
}
