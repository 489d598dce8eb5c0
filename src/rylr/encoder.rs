//! # Telemetry Frame Encoder
//!
//! Serializes a telemetry record into the delimited text payload and wraps
//! it in the module's `AT+SEND` command envelope.

use super::protocol::{TelemetryRecord, COMMAND_TERMINATOR, MAX_PAYLOAD_LEN};
use crate::error::{LoraLinkError, Result};

/// Encode a telemetry record as the wire payload `timestamp;lat;lon;alt`.
///
/// All fields are decimal integers; none can contain the `;` delimiter, so
/// no escaping is needed. The payload carries no terminator — that is the
/// transport envelope's job.
///
/// # Errors
///
/// Returns [`LoraLinkError::PayloadTooLarge`] if the serialized text would
/// exceed [`MAX_PAYLOAD_LEN`]. The fields are variable-width decimal text,
/// so the bound is enforced on the actual serialization, never assumed.
pub fn encode_payload(record: &TelemetryRecord) -> Result<String> {
    let payload = format!(
        "{};{};{};{}",
        record.timestamp_ms, record.fix.lat_e7, record.fix.lon_e7, record.fix.alt_mm
    );
    check_payload_len(&payload)?;
    Ok(payload)
}

/// Validate a payload against the module's transmission limit.
pub fn check_payload_len(payload: &str) -> Result<()> {
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(LoraLinkError::PayloadTooLarge {
            len: payload.len(),
            max: MAX_PAYLOAD_LEN,
        });
    }
    Ok(())
}

/// Build the complete transmit command `AT+SEND=<addr>,<len>,<payload>\r\n`.
///
/// `<len>` is computed from the actual serialized payload bytes, not from
/// the record's theoretical size, so the envelope stays correct under any
/// future payload format change.
pub fn encode_send_command(destination: u16, payload: &str) -> Result<String> {
    check_payload_len(payload)?;
    Ok(format!(
        "AT+SEND={},{},{}{}",
        destination,
        payload.len(),
        payload,
        COMMAND_TERMINATOR
    ))
}
