//! # NMEA GGA Driver
//!
//! Reads NMEA 0183 sentences from a serial-attached GPS receiver and
//! extracts fixed-point position fixes from GGA sentences.

use async_trait::async_trait;
use tokio::time::Duration;
use tracing::trace;

use super::{GpsSensor, PositionFix};
use crate::error::Result;
use crate::serial::{LineReader, SerialPortIO};

/// Minimum field count of a GGA sentence up to the altitude unit.
const GGA_MIN_FIELDS: usize = 11;

/// GPS receiver speaking NMEA 0183 over a serial port.
///
/// Only GGA sentences are consumed; everything else the receiver chatters
/// is ignored. Sentences failing the checksum or reporting fix quality 0
/// are dropped without surfacing an error, since both are routine during
/// signal acquisition.
pub struct NmeaGps<P> {
    reader: LineReader<P>,
}

impl<P: SerialPortIO> NmeaGps<P> {
    pub fn new(port: P) -> Self {
        Self {
            reader: LineReader::new(port),
        }
    }
}

#[async_trait]
impl<P: SerialPortIO> GpsSensor for NmeaGps<P> {
    async fn poll_fix(&mut self) -> Result<Option<PositionFix>> {
        // Drain whatever the receiver pushed since the last cycle and keep
        // the newest valid solution.
        let mut latest = None;
        while let Some(line) = self.reader.next_line(Duration::ZERO).await? {
            match parse_gga(&line) {
                Some(fix) => latest = Some(fix),
                None => trace!(sentence = %line, "ignoring NMEA sentence"),
            }
        }
        Ok(latest)
    }
}

/// Parse a GGA sentence into a fixed-point position fix.
///
/// Returns `None` for non-GGA sentences, checksum failures, and sentences
/// without a valid navigation solution (fix quality 0).
pub fn parse_gga(sentence: &str) -> Option<PositionFix> {
    let body = sentence.strip_prefix('$')?;
    let (body, checksum) = body.split_once('*')?;
    if !verify_checksum(body, checksum) {
        return None;
    }

    let fields: Vec<&str> = body.split(',').collect();
    if fields.len() < GGA_MIN_FIELDS || !fields[0].ends_with("GGA") {
        return None;
    }
    // Field 6 is fix quality; 0 means no solution yet.
    if fields[6].is_empty() || fields[6] == "0" {
        return None;
    }

    Some(PositionFix {
        lat_e7: coord_to_e7(fields[2], fields[3] == "S")?,
        lon_e7: coord_to_e7(fields[4], fields[5] == "W")?,
        alt_mm: meters_to_mm(fields[9])?,
    })
}

/// XOR checksum over the sentence body, compared against the hex suffix.
fn verify_checksum(body: &str, checksum: &str) -> bool {
    let computed = body.bytes().fold(0u8, |acc, b| acc ^ b);
    u8::from_str_radix(checksum.trim(), 16)
        .map(|declared| declared == computed)
        .unwrap_or(false)
}

/// Convert an NMEA `ddmm.mmmm` (or `dddmm.mmmm`) coordinate to degrees × 10^7.
///
/// Pure integer math: the fractional minutes are scaled to six digits, the
/// whole value divided by 60 once, so the result carries no float rounding.
fn coord_to_e7(field: &str, negative: bool) -> Option<i32> {
    if !field.is_ascii() {
        return None;
    }
    let dot = field.find('.')?;
    if dot < 3 {
        return None;
    }

    let degrees: i64 = field[..dot - 2].parse().ok()?;
    let whole_minutes: i64 = field[dot - 2..dot].parse().ok()?;
    if whole_minutes >= 60 {
        return None;
    }

    let mut frac_e6: i64 = 0;
    let mut scale = 100_000;
    for c in field[dot + 1..].chars().take(6) {
        frac_e6 += i64::from(c.to_digit(10)?) * scale;
        scale /= 10;
    }

    let minutes_e6 = whole_minutes * 1_000_000 + frac_e6;
    let value = degrees * 10_000_000 + minutes_e6 * 10 / 60;
    i32::try_from(if negative { -value } else { value }).ok()
}

/// Convert a decimal meters field to millimeters.
fn meters_to_mm(field: &str) -> Option<i32> {
    let (negative, digits) = match field.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, field),
    };
    let (whole, frac) = match digits.split_once('.') {
        Some((w, f)) => (w, f),
        None => (digits, ""),
    };

    let mut value = whole.parse::<i64>().ok()? * 1000;
    let mut scale = 100;
    for c in frac.chars().take(3) {
        value += i64::from(c.to_digit(10)?) * scale;
        scale /= 10;
    }

    i32::try_from(if negative { -value } else { value }).ok()
}
