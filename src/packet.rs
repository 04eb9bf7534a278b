//! MQTT payload sizing for full-strip updates

/// Encoded size of the command for a single LED
pub const BYTES_PER_LED_COMMAND: usize = 14;

/// Fixed framing bytes around the per-LED commands
pub const PACKET_OVERHEAD: usize = 2;

/// Largest MQTT packet the device has to accept.
///
/// A full-strip update must fit in one payload, so the transport buffer
/// ceiling grows linearly with the LED count.
#[inline]
pub const fn max_packet_size(led_count: u16) -> usize {
    led_count as usize * BYTES_PER_LED_COMMAND + PACKET_OVERHEAD
}
