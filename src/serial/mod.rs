//! # Serial Communication Module
//!
//! Handles serial communication with the RYLR998 radio module and the GPS
//! receiver.
//!
//! This module handles:
//! - Opening serial ports with 8N1 framing
//! - Newline-delimited line framing over the raw byte stream
//! - A port trait abstraction so protocol code is testable without hardware

use bytes::BytesMut;
use tokio::time::{timeout, Duration, Instant};
use tracing::debug;

use crate::error::{LoraLinkError, Result};

pub mod port_trait;

pub use port_trait::{SerialPortIO, TokioSerialPort};

/// Default UART rate of the RYLR998 module.
pub const DEFAULT_RADIO_BAUD_RATE: u32 = 115_200;

/// Read buffer chunk size. Sized for the worst-case RYLR998 notification:
/// `+RCV=` with a 240-byte payload plus metrics is under 265 bytes.
const READ_CHUNK_SIZE: usize = 512;

/// Open a serial port with the 8N1 settings both the radio module and
/// common GPS receivers expect.
///
/// # Errors
///
/// Returns [`LoraLinkError::SerialPortNotFound`] if the device cannot be
/// opened at the given path.
pub fn open_port(path: &str, baud_rate: u32) -> Result<tokio_serial::SerialStream> {
    use tokio_serial::SerialPortBuilderExt;

    debug!("Opening serial port {} at {} baud", path, baud_rate);

    tokio_serial::new(path, baud_rate)
        .data_bits(tokio_serial::DataBits::Eight)
        .parity(tokio_serial::Parity::None)
        .stop_bits(tokio_serial::StopBits::One)
        .flow_control(tokio_serial::FlowControl::None)
        .open_native_async()
        .map_err(|e| LoraLinkError::SerialPortNotFound(format!("{path}: {e}")))
}

/// Accumulates raw serial bytes and yields complete `\n`-terminated lines.
///
/// The transport is a reliable byte stream framed only by newlines; a line
/// may arrive split across arbitrarily many reads. Trailing `\r` is
/// stripped and blank lines are skipped.
pub struct LineReader<P> {
    port: P,
    buffer: BytesMut,
}

impl<P: SerialPortIO> LineReader<P> {
    pub fn new(port: P) -> Self {
        Self {
            port,
            buffer: BytesMut::with_capacity(READ_CHUNK_SIZE),
        }
    }

    /// Access the underlying port, e.g. for writes on the send path.
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Return the next complete line, waiting at most `wait`.
    ///
    /// `Ok(None)` means the window elapsed without a full line becoming
    /// available; partial input stays buffered for the next call. A zero
    /// `wait` drains already-buffered lines without blocking on the port.
    pub async fn next_line(&mut self, wait: Duration) -> Result<Option<String>> {
        let deadline = Instant::now() + wait;

        loop {
            if let Some(line) = self.pop_buffered_line() {
                return Ok(Some(line));
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match timeout(remaining, self.port.read(&mut chunk)).await {
                Ok(result) => result?,
                Err(_) => return Ok(None),
            };
            if read == 0 {
                return Err(LoraLinkError::Serial("port closed".to_string()));
            }
            self.buffer.extend_from_slice(&chunk[..read]);
        }
    }

    fn pop_buffered_line(&mut self) -> Option<String> {
        while let Some(end) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw = self.buffer.split_to(end + 1);
            let mut line = &raw[..end];
            if line.ends_with(b"\r") {
                line = &line[..line.len() - 1];
            }
            if line.is_empty() {
                continue;
            }
            return Some(String::from_utf8_lossy(line).into_owned());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::port_trait::mocks::MockSerialPort;
    use super::*;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn test_next_line_strips_crlf() {
        let port = MockSerialPort::new();
        port.push_read(b"+OK\r\n");

        let mut reader = LineReader::new(port);
        let line = assert_ok!(reader.next_line(Duration::from_millis(10)).await);
        assert_eq!(line.as_deref(), Some("+OK"));
    }

    #[tokio::test]
    async fn test_next_line_reassembles_split_reads() {
        let port = MockSerialPort::new();
        port.push_read(b"+RCV=0,4,1;2");
        port.push_read(b";3;4,-45,");
        port.push_read(b"10\r\n");

        let mut reader = LineReader::new(port);
        let line = assert_ok!(reader.next_line(Duration::from_millis(10)).await);
        assert_eq!(line.as_deref(), Some("+RCV=0,4,1;2;3;4,-45,10"));
    }

    #[tokio::test]
    async fn test_next_line_yields_lines_in_order() {
        let port = MockSerialPort::new();
        port.push_read(b"first\r\nsecond\r\n");

        let mut reader = LineReader::new(port);
        let first = reader.next_line(Duration::ZERO).await.unwrap();
        let second = reader.next_line(Duration::ZERO).await.unwrap();
        assert_eq!(first.as_deref(), Some("first"));
        assert_eq!(second.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_next_line_skips_blank_lines() {
        let port = MockSerialPort::new();
        port.push_read(b"\r\n\r\ndata\r\n");

        let mut reader = LineReader::new(port);
        let line = reader.next_line(Duration::from_millis(10)).await.unwrap();
        assert_eq!(line.as_deref(), Some("data"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_line_times_out_on_silence() {
        let port = MockSerialPort::new();

        let mut reader = LineReader::new(port);
        let line = reader.next_line(Duration::from_millis(50)).await.unwrap();
        assert_eq!(line, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_line_stays_buffered_across_timeout() {
        let port = MockSerialPort::new();
        port.push_read(b"+RCV=0,4,");

        let mut reader = LineReader::new(port);
        assert_eq!(reader.next_line(Duration::from_millis(20)).await.unwrap(), None);

        reader.port_mut().push_read(b"1;2;3;4,-45,10\r\n");
        let line = reader.next_line(Duration::from_millis(20)).await.unwrap();
        assert_eq!(line.as_deref(), Some("+RCV=0,4,1;2;3;4,-45,10"));
    }
}
