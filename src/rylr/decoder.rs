//! # Telemetry Frame Decoder
//!
//! Parses inbound `+RCV=` notifications into payload plus link-quality
//! metrics, then parses the payload back into the structured record.

use std::str::FromStr;

use super::protocol::{LinkQuality, TelemetryRecord, PAYLOAD_DELIMITER, PAYLOAD_FIELD_COUNT, RCV_PREFIX};
use crate::error::{LoraLinkError, Result};
use crate::gps::PositionFix;

/// A receive notification split into its positional fields.
///
/// The payload is kept opaque at this stage; it may legally contain commas,
/// so it is located purely by position between the outer fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundNotification {
    /// Address of the sending module.
    pub source: u16,

    /// Payload byte count as declared by the module.
    pub declared_len: usize,

    /// The opaque telemetry payload.
    pub payload: String,

    /// Link metrics reported for this reception.
    pub quality: LinkQuality,
}

/// One line read from the module on the receive side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A decoded telemetry record with its link metrics. Always produced
    /// together; a record is never emitted partially populated.
    Telemetry(TelemetryRecord, LinkQuality),

    /// Any line that is not a receive notification, passed through unparsed
    /// for the consumer to treat as diagnostic output.
    Diagnostic(String),
}

/// Split a `+RCV=<addr>,<len>,<payload>,<rssi>,<snr>` line into its fields.
///
/// The first two fields are split off the front and the last two off the
/// back; whatever remains in the middle is the payload, regardless of any
/// commas inside it. Fewer than four commas means the notification is
/// malformed and nothing is extracted.
///
/// # Errors
///
/// Returns [`LoraLinkError::MalformedNotification`] on a missing prefix or
/// insufficient delimiters, and [`LoraLinkError::FieldParse`] when one of
/// the outer numeric fields does not parse.
pub fn split_notification(line: &str) -> Result<InboundNotification> {
    let body = line
        .strip_prefix(RCV_PREFIX)
        .ok_or_else(|| malformed(line, "missing +RCV= prefix"))?;

    let (source, rest) = body
        .split_once(',')
        .ok_or_else(|| malformed(line, "missing address delimiter"))?;
    let (declared_len, rest) = rest
        .split_once(',')
        .ok_or_else(|| malformed(line, "missing length delimiter"))?;
    let (rest, snr) = rest
        .rsplit_once(',')
        .ok_or_else(|| malformed(line, "missing snr delimiter"))?;
    let (payload, rssi) = rest
        .rsplit_once(',')
        .ok_or_else(|| malformed(line, "missing rssi delimiter"))?;

    Ok(InboundNotification {
        source: parse_field(source, "address")?,
        declared_len: parse_field(declared_len, "length")?,
        payload: payload.to_string(),
        quality: LinkQuality {
            rssi_dbm: parse_field(rssi, "rssi")?,
            snr_db: parse_field(snr, "snr")?,
        },
    })
}

/// Decode a telemetry payload of the form `timestamp;lat;lon;alt`.
///
/// Exactly four positional fields are required. A field that fails numeric
/// conversion rejects the whole frame with a distinct error instead of
/// being silently read as zero, so a literal zero value stays
/// distinguishable from a garbled field.
///
/// # Errors
///
/// Returns [`LoraLinkError::MalformedPayload`] on a wrong field count and
/// [`LoraLinkError::FieldParse`] on a non-numeric field.
pub fn decode_payload(payload: &str) -> Result<TelemetryRecord> {
    let fields: Vec<&str> = payload.split(PAYLOAD_DELIMITER).collect();
    if fields.len() != PAYLOAD_FIELD_COUNT {
        return Err(LoraLinkError::MalformedPayload(format!(
            "expected {} fields, got {} in {:?}",
            PAYLOAD_FIELD_COUNT,
            fields.len(),
            payload
        )));
    }

    Ok(TelemetryRecord {
        timestamp_ms: parse_field(fields[0], "timestamp")?,
        fix: PositionFix {
            lat_e7: parse_field(fields[1], "latitude")?,
            lon_e7: parse_field(fields[2], "longitude")?,
            alt_mm: parse_field(fields[3], "altitude")?,
        },
    })
}

/// Classify and decode one inbound line.
///
/// Lines without the notification prefix are not telemetry and pass through
/// untouched as [`Inbound::Diagnostic`].
pub fn decode_line(line: &str) -> Result<Inbound> {
    if !line.starts_with(RCV_PREFIX) {
        return Ok(Inbound::Diagnostic(line.to_string()));
    }

    let notification = split_notification(line)?;
    let record = decode_payload(&notification.payload)?;
    Ok(Inbound::Telemetry(record, notification.quality))
}

fn malformed(line: &str, reason: &str) -> LoraLinkError {
    LoraLinkError::MalformedNotification(format!("{reason} in {line:?}"))
}

fn parse_field<T: FromStr>(text: &str, name: &str) -> Result<T> {
    text.parse()
        .map_err(|_| LoraLinkError::FieldParse(format!("{name} field {text:?} is not numeric")))
}
