//! # RYLR Protocol Constants and Types
//!
//! Core protocol definitions for the RYLR998 AT-command telemetry link.

use serde::Serialize;

use crate::gps::PositionFix;

/// Maximum payload accepted by the module's `AT+SEND` command, in bytes.
///
/// The RYLR998 caps a single transmission at 240 payload bytes; the rest of
/// its command buffer is taken by the `AT+SEND=<addr>,<len>,` envelope and
/// the CRLF terminator.
pub const MAX_PAYLOAD_LEN: usize = 240;

/// Prefix of an asynchronous receive notification from the module.
pub const RCV_PREFIX: &str = "+RCV=";

/// Prefix of an error response from the module's command parser.
pub const ERR_PREFIX: &str = "+ERR";

/// Terminator appended to every command sent to the module.
pub const COMMAND_TERMINATOR: &str = "\r\n";

/// Field delimiter inside a telemetry payload.
pub const PAYLOAD_DELIMITER: char = ';';

/// Number of fields in a telemetry payload (`timestamp;lat;lon;alt`).
pub const PAYLOAD_FIELD_COUNT: usize = 4;

/// Comma count of a well-formed receive notification body
/// (`<addr>,<len>,<payload>,<rssi>,<snr>`). The payload may itself contain
/// commas, so this is a minimum, located from the outer ends.
pub const NOTIFICATION_DELIMITER_COUNT: usize = 4;

/// A timestamped position report, the unit of one transmission cycle.
///
/// Created fresh per cycle on the sending side and regenerated by the
/// decoder on the receiving side. Field values survive the text wire format
/// exactly; scaling to degrees/meters happens only at the display layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TelemetryRecord {
    /// Milliseconds since the sending node started.
    pub timestamp_ms: u32,

    /// Position fix carried by this record.
    pub fix: PositionFix,
}

/// Link-quality metrics reported by the module alongside a received frame.
///
/// Only ever produced together with a successfully decoded
/// [`TelemetryRecord`]; a quality value without its record is meaningless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinkQuality {
    /// Received signal strength in dBm.
    pub rssi_dbm: i16,

    /// Signal-to-noise ratio in dB.
    pub snr_db: i16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_constants() {
        assert_eq!(MAX_PAYLOAD_LEN, 240);
        assert_eq!(RCV_PREFIX, "+RCV=");
        assert_eq!(PAYLOAD_FIELD_COUNT, 4);
        assert_eq!(NOTIFICATION_DELIMITER_COUNT, 4);
    }

    #[test]
    fn test_payload_delimiter_distinct_from_notification_delimiter() {
        // The inner payload delimiter must never collide with the comma
        // framing of the outer notification.
        assert_ne!(PAYLOAD_DELIMITER, ',');
    }
}
