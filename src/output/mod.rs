//! # Output Module
//!
//! Renders decoded telemetry for the downstream consumer.
//!
//! This module handles:
//! - The consumer-facing CSV line (raw fixed-point integers)
//! - An optional human-readable rendering (degrees, meters)
//! - Appending decoded records to a JSONL log file

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;
use crate::rylr::protocol::{LinkQuality, TelemetryRecord};

/// Render one decoded record and its link metrics as the consumer CSV line.
///
/// Raw fixed-point integer encodings, no unit conversion: the consumer
/// performs the scaling. Output is deterministic, so repeated calls on the
/// same pair yield byte-identical lines.
pub fn format_record(record: &TelemetryRecord, quality: &LinkQuality) -> String {
    format!(
        "{},{},{},{},{},{}",
        record.timestamp_ms,
        record.fix.lat_e7,
        record.fix.lon_e7,
        record.fix.alt_mm,
        quality.rssi_dbm,
        quality.snr_db
    )
}

/// Human-readable rendering in degrees and meters.
///
/// Purely a display transform over the fixed-point values; never fed back
/// into any parser.
pub fn format_human(record: &TelemetryRecord, quality: &LinkQuality) -> String {
    format!(
        "t+{}ms lat {:.7} lon {:.7} alt {:.3}m rssi {}dBm snr {}dB",
        record.timestamp_ms,
        f64::from(record.fix.lat_e7) / 10_000_000.0,
        f64::from(record.fix.lon_e7) / 10_000_000.0,
        f64::from(record.fix.alt_mm) / 1_000.0,
        quality.rssi_dbm,
        quality.snr_db
    )
}

#[derive(Serialize)]
struct LogEntry<'a> {
    received_at: String,
    #[serde(flatten)]
    record: &'a TelemetryRecord,
    #[serde(flatten)]
    quality: &'a LinkQuality,
}

/// Appends each decoded record as one JSON line to a timestamped file.
pub struct RecordLogger {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl RecordLogger {
    /// Create a new log file under `dir`, named after the start time.
    pub fn create(dir: &str) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let name = format!(
            "telemetry-{}.jsonl",
            chrono::Local::now().format("%Y%m%d-%H%M%S")
        );
        let path = Path::new(dir).join(name);
        let file = File::create(&path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            path,
        })
    }

    /// Append one record. Flushed per line so a crash loses at most the
    /// line being written.
    pub fn log(&mut self, record: &TelemetryRecord, quality: &LinkQuality) -> Result<()> {
        let entry = LogEntry {
            received_at: chrono::Local::now().to_rfc3339(),
            record,
            quality,
        };
        let line = serde_json::to_string(&entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writeln!(self.writer, "{line}")?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
