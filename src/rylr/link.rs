//! # Radio Transport Adapter
//!
//! Wraps the RYLR998 command/response interface on top of a serial port.
//!
//! The send path issues `AT+SEND` commands; the receive path yields the
//! module's asynchronous output one line at a time. The link is
//! fire-and-forget: the module gives no delivery confirmation and frames
//! may be silently lost on the air interface.

use tokio::time::{sleep, Duration};
use tracing::{debug, info};

use super::encoder;
use super::protocol::{COMMAND_TERMINATOR, ERR_PREFIX};
use crate::config::RadioConfig;
use crate::error::{LoraLinkError, Result};
use crate::serial::{LineReader, SerialPortIO};

/// RYLR998 command/response handler.
pub struct RadioLink<P> {
    reader: LineReader<P>,
    destination: u16,
    settle_delay: Duration,
}

impl<P: SerialPortIO> RadioLink<P> {
    pub fn new(port: P, config: &RadioConfig) -> Self {
        Self {
            reader: LineReader::new(port),
            destination: config.destination,
            settle_delay: Duration::from_millis(config.settle_delay_ms),
        }
    }

    /// Apply the module bring-up sequence: address, network id, band, and
    /// RF parameters. Each command is settle-delayed before the next one
    /// is issued, as the module's command parser requires.
    pub async fn configure(&mut self, config: &RadioConfig) -> Result<()> {
        info!("Configuring radio module at address {}", config.address);

        self.command("AT").await?;
        self.command(&format!("AT+ADDRESS={}", config.address)).await?;
        self.command(&format!("AT+NETWORKID={}", config.network_id)).await?;
        self.command(&format!("AT+BAND={}", config.band_hz)).await?;
        self.command(&format!("AT+PARAMETER={}", config.parameter)).await?;

        info!("Radio module configured");
        Ok(())
    }

    /// Transmit one telemetry payload to the fixed destination address.
    ///
    /// Builds the `AT+SEND` envelope with the length computed from the
    /// actual payload bytes, writes it, then observes the settle delay.
    /// The delay is hardware pacing of the module's command parser, not an
    /// acknowledgement; a `+ERR` response maps to
    /// [`LoraLinkError::CommandRejected`] and the caller treats the frame
    /// as dropped.
    pub async fn transmit(&mut self, payload: &str) -> Result<()> {
        let command = encoder::encode_send_command(self.destination, payload)?;
        self.write_command(&command).await?;

        sleep(self.settle_delay).await;
        self.drain_responses().await?;

        debug!("Sent telemetry frame ({} payload bytes)", payload.len());
        Ok(())
    }

    /// Wait up to `window` for one complete line from the module.
    ///
    /// Returns `Ok(None)` when the pacing window elapses with no inbound
    /// data; the caller simply proceeds to its next loop iteration.
    pub async fn poll_inbound(&mut self, window: Duration) -> Result<Option<String>> {
        self.reader.next_line(window).await
    }

    async fn command(&mut self, command: &str) -> Result<()> {
        debug!("Sending radio command: {}", command);
        let line = format!("{command}{COMMAND_TERMINATOR}");
        self.write_command(&line).await?;

        sleep(self.settle_delay).await;
        self.drain_responses().await
    }

    async fn write_command(&mut self, line: &str) -> Result<()> {
        let port = self.reader.port_mut();
        port.write_all(line.as_bytes())
            .await
            .map_err(|e| LoraLinkError::Serial(format!("Failed to write command: {e}")))?;
        port.flush()
            .await
            .map_err(|e| LoraLinkError::Serial(format!("Failed to flush serial port: {e}")))?;
        Ok(())
    }

    /// Consume module responses buffered during the settle window.
    async fn drain_responses(&mut self) -> Result<()> {
        while let Some(line) = self.reader.next_line(Duration::ZERO).await? {
            if line.starts_with(ERR_PREFIX) {
                return Err(LoraLinkError::CommandRejected(line));
            }
            debug!(response = %line, "radio module response");
        }
        Ok(())
    }
}
