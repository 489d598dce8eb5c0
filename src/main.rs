//! # LoRaLink
//!
//! Stream GPS position telemetry between nodes over a REYAX RYLR998 LoRa
//! link.
//!
//! The sender node polls a GPS receiver, encodes each fix into a delimited
//! telemetry payload, and transmits it through the radio module's
//! AT-command interface. The receiver node parses the module's `+RCV=`
//! notifications back into records annotated with link quality and emits
//! one CSV line per record for downstream analysis.

use anyhow::{bail, Result};
use tokio::time::{interval, Duration, Instant};
use tracing::{debug, info, warn};

use loralink::config::Config;
use loralink::gps::{GpsSampler, NmeaGps};
use loralink::output::{format_human, format_record, RecordLogger};
use loralink::rylr::decoder::{decode_line, Inbound};
use loralink::rylr::encoder::encode_payload;
use loralink::rylr::{RadioLink, TelemetryRecord};
use loralink::serial::{open_port, TokioSerialPort};

/// Configuration file consulted when no path is given on the command line.
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Node role selected by the first command-line argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Sender,
    Receiver,
}

impl Role {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "sender" => Some(Role::Sender),
            "receiver" => Some(Role::Receiver),
            _ => None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let role = match args.next().as_deref().and_then(Role::from_arg) {
        Some(role) => role,
        None => bail!("usage: loralink <sender|receiver> [config.toml]"),
    };
    let config_path = args
        .next()
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let config = Config::load_or_default(&config_path)?;
    info!("LoRaLink v{} starting as {:?}...", env!("CARGO_PKG_VERSION"), role);

    match role {
        Role::Sender => run_sender(config).await,
        Role::Receiver => run_receiver(config).await,
    }
}

/// Sender control loop: sample, encode, transmit, once per cycle.
///
/// Every fault inside a cycle drops that cycle's frame and continues; the
/// link is fire-and-forget and the next cycle starts fresh.
async fn run_sender(config: Config) -> Result<()> {
    let radio_port = TokioSerialPort::new(open_port(&config.serial.port, config.serial.baud_rate)?);
    let mut link = RadioLink::new(radio_port, &config.radio);
    link.configure(&config.radio).await?;

    let gps_port = TokioSerialPort::new(open_port(&config.gps.port, config.gps.baud_rate)?);
    let mut sampler = GpsSampler::new(NmeaGps::new(gps_port));

    // Wraps after ~49 days, matching the original device counter width.
    let started = Instant::now();
    let mut cycle = interval(Duration::from_millis(config.link.send_interval_ms));
    let mut sent: u64 = 0;

    info!(
        "Starting telemetry transmission every {}ms",
        config.link.send_interval_ms
    );
    info!("Press Ctrl+C to exit");

    loop {
        tokio::select! {
            _ = cycle.tick() => {
                let fix = match sampler.sample().await {
                    Ok(fix) => fix,
                    Err(e) => {
                        warn!("GPS poll failed: {}", e);
                        continue;
                    }
                };
                let Some(fix) = fix else {
                    debug!("No GPS fix yet, skipping cycle");
                    continue;
                };

                let record = TelemetryRecord {
                    timestamp_ms: started.elapsed().as_millis() as u32,
                    fix,
                };
                let payload = match encode_payload(&record) {
                    Ok(payload) => payload,
                    Err(e) => {
                        warn!("Dropping frame: {}", e);
                        continue;
                    }
                };
                if let Err(e) = link.transmit(&payload).await {
                    warn!("Transmit failed, frame dropped: {}", e);
                    continue;
                }

                sent += 1;
                debug!("Sent frame #{}", sent);
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                info!("Total frames sent: {}", sent);
                break;
            }
        }
    }

    Ok(())
}

/// Receiver control loop: poll, decode, format, emit.
///
/// Malformed inbound lines are discarded with a warning; module output
/// that is not a notification is surfaced as diagnostic logging. No fault
/// here is fatal; every path returns to the top of the loop.
async fn run_receiver(config: Config) -> Result<()> {
    let radio_port = TokioSerialPort::new(open_port(&config.serial.port, config.serial.baud_rate)?);
    let mut link = RadioLink::new(radio_port, &config.radio);
    link.configure(&config.radio).await?;

    let mut logger = if config.output.log_enabled {
        let logger = RecordLogger::create(&config.output.log_dir)?;
        info!("Logging decoded records to {}", logger.path().display());
        Some(logger)
    } else {
        None
    };

    let window = Duration::from_millis(config.link.poll_interval_ms);
    let mut received: u64 = 0;

    info!("Listening for telemetry frames");
    info!("Press Ctrl+C to exit");

    loop {
        tokio::select! {
            line = link.poll_inbound(window) => {
                let Some(line) = line? else {
                    continue;
                };

                match decode_line(&line) {
                    Ok(Inbound::Telemetry(record, quality)) => {
                        let out = if config.output.human_readable {
                            format_human(&record, &quality)
                        } else {
                            format_record(&record, &quality)
                        };
                        println!("{out}");

                        if let Some(logger) = logger.as_mut() {
                            if let Err(e) = logger.log(&record, &quality) {
                                warn!("Record log write failed: {}", e);
                            }
                        }
                        received += 1;
                    }
                    Ok(Inbound::Diagnostic(text)) => {
                        debug!(line = %text, "radio module output");
                    }
                    Err(e) => {
                        warn!("Discarding inbound line: {}", e);
                    }
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                info!("Total records received: {}", received);
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_arg() {
        assert_eq!(Role::from_arg("sender"), Some(Role::Sender));
        assert_eq!(Role::from_arg("receiver"), Some(Role::Receiver));
        assert_eq!(Role::from_arg("observer"), None);
        assert_eq!(Role::from_arg(""), None);
    }

    #[test]
    fn test_default_config_path() {
        assert_eq!(DEFAULT_CONFIG_PATH, "config/default.toml");
    }
}
