//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! All options are fixed at startup; nothing is renegotiated at runtime.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub serial: SerialConfig,
    #[serde(default)]
    pub radio: RadioConfig,
    #[serde(default)]
    pub link: LinkConfig,
    #[serde(default)]
    pub gps: GpsConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Radio module serial port configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    #[serde(default = "default_radio_port")]
    pub port: String,

    #[serde(default = "default_radio_baud_rate")]
    pub baud_rate: u32,
}

/// Radio module configuration
#[derive(Debug, Deserialize, Clone)]
pub struct RadioConfig {
    /// This node's address.
    #[serde(default = "default_address")]
    pub address: u16,

    /// Fixed destination address for transmissions.
    #[serde(default = "default_destination")]
    pub destination: u16,

    #[serde(default = "default_network_id")]
    pub network_id: u8,

    /// Carrier frequency in Hz.
    #[serde(default = "default_band_hz")]
    pub band_hz: u64,

    /// RF parameter string `SF,BW,CR,preamble` passed to `AT+PARAMETER`.
    #[serde(default = "default_parameter")]
    pub parameter: String,

    /// Quiet time after each command, required by the module's parser.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

/// Link pacing configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LinkConfig {
    /// Sender: time between transmission cycles.
    #[serde(default = "default_send_interval_ms")]
    pub send_interval_ms: u64,

    /// Receiver: pacing window of each inbound poll.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

/// GPS receiver serial port configuration
#[derive(Debug, Deserialize, Clone)]
pub struct GpsConfig {
    #[serde(default = "default_gps_port")]
    pub port: String,

    #[serde(default = "default_gps_baud_rate")]
    pub baud_rate: u32,
}

/// Receiver output configuration
#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    /// Emit the human-readable rendering instead of the consumer CSV line.
    #[serde(default)]
    pub human_readable: bool,

    /// Also append decoded records to a JSONL log file.
    #[serde(default)]
    pub log_enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

// Default value functions
fn default_radio_port() -> String {
    "/dev/ttyUSB0".to_string()
}
fn default_radio_baud_rate() -> u32 {
    crate::serial::DEFAULT_RADIO_BAUD_RATE
}

fn default_address() -> u16 {
    2
}
fn default_destination() -> u16 {
    1
}
fn default_network_id() -> u8 {
    18
}
fn default_band_hz() -> u64 {
    915_000_000
}
fn default_parameter() -> String {
    "9,7,1,12".to_string()
}
fn default_settle_delay_ms() -> u64 {
    100
}

fn default_send_interval_ms() -> u64 {
    1000
}
fn default_poll_interval_ms() -> u64 {
    50
}

fn default_gps_port() -> String {
    "/dev/ttyACM0".to_string()
}
fn default_gps_baud_rate() -> u32 {
    9600
}

fn default_log_dir() -> String {
    "./logs".to_string()
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_radio_port(),
            baud_rate: default_radio_baud_rate(),
        }
    }
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            destination: default_destination(),
            network_id: default_network_id(),
            band_hz: default_band_hz(),
            parameter: default_parameter(),
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            send_interval_ms: default_send_interval_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Default for GpsConfig {
    fn default() -> Self {
        Self {
            port: default_gps_port(),
            baud_rate: default_gps_baud_rate(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            human_readable: false,
            log_enabled: false,
            log_dir: default_log_dir(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            serial: SerialConfig::default(),
            radio: RadioConfig::default(),
            link: LinkConfig::default(),
            gps: GpsConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, TOML parsing fails, or
    /// validation rejects a value.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file, falling back to defaults if it is absent
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            info!(
                "No configuration file at {}, using defaults",
                path.as_ref().display()
            );
            let config = Config::default();
            config.validate()?;
            Ok(config)
        }
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.serial.port.is_empty() {
            return Err(crate::error::LoraLinkError::Config(toml::de::Error::custom(
                "radio serial port cannot be empty",
            )));
        }

        if self.gps.port.is_empty() {
            return Err(crate::error::LoraLinkError::Config(toml::de::Error::custom(
                "gps serial port cannot be empty",
            )));
        }

        // RYLR998 UART rates
        if ![9600, 19200, 38400, 57600, 115200].contains(&self.serial.baud_rate) {
            return Err(crate::error::LoraLinkError::Config(toml::de::Error::custom(
                "radio baud_rate must be one of: 9600, 19200, 38400, 57600, 115200",
            )));
        }

        if ![4800, 9600, 19200, 38400, 57600, 115200].contains(&self.gps.baud_rate) {
            return Err(crate::error::LoraLinkError::Config(toml::de::Error::custom(
                "gps baud_rate must be one of: 4800, 9600, 19200, 38400, 57600, 115200",
            )));
        }

        // Valid RYLR998 network ids are 3-15 and 18
        if !((3..=15).contains(&self.radio.network_id) || self.radio.network_id == 18) {
            return Err(crate::error::LoraLinkError::Config(toml::de::Error::custom(
                "network_id must be 3-15 or 18",
            )));
        }

        if self.radio.parameter.split(',').count() != 4 {
            return Err(crate::error::LoraLinkError::Config(toml::de::Error::custom(
                "parameter must have 4 comma-separated values (SF,BW,CR,preamble)",
            )));
        }

        if self.radio.settle_delay_ms == 0 || self.radio.settle_delay_ms > 10000 {
            return Err(crate::error::LoraLinkError::Config(toml::de::Error::custom(
                "settle_delay_ms must be between 1 and 10000",
            )));
        }

        if self.link.send_interval_ms == 0 || self.link.send_interval_ms > 60000 {
            return Err(crate::error::LoraLinkError::Config(toml::de::Error::custom(
                "send_interval_ms must be between 1 and 60000",
            )));
        }

        if self.link.poll_interval_ms == 0 || self.link.poll_interval_ms > 60000 {
            return Err(crate::error::LoraLinkError::Config(toml::de::Error::custom(
                "poll_interval_ms must be between 1 and 60000",
            )));
        }

        if self.output.log_enabled && self.output.log_dir.is_empty() {
            return Err(crate::error::LoraLinkError::Config(toml::de::Error::custom(
                "log_dir cannot be empty when log_enabled is set",
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.serial.baud_rate, 115_200);
        assert_eq!(config.radio.destination, 1);
        assert_eq!(config.radio.network_id, 18);
    }

    #[test]
    fn test_parse_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [radio]
            address = 5
            destination = 7

            [link]
            send_interval_ms = 2000
            "#,
        )
        .unwrap();

        assert_eq!(config.radio.address, 5);
        assert_eq!(config.radio.destination, 7);
        assert_eq!(config.link.send_interval_ms, 2000);
        // Untouched sections keep their defaults.
        assert_eq!(config.radio.settle_delay_ms, 100);
        assert_eq!(config.gps.baud_rate, 9600);
    }

    #[test]
    fn test_validate_rejects_zero_settle_delay() {
        let mut config = Config::default();
        config.radio.settle_delay_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_network_id() {
        let mut config = Config::default();
        config.radio.network_id = 2;
        assert!(config.validate().is_err());
        config.radio.network_id = 16;
        assert!(config.validate().is_err());
        config.radio.network_id = 15;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unsupported_baud_rate() {
        let mut config = Config::default();
        config.serial.baud_rate = 420_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_short_parameter_string() {
        let mut config = Config::default();
        config.radio.parameter = "9,7,1".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [serial]
            port = "/dev/ttyAMA0"

            [output]
            log_enabled = true
            log_dir = "/tmp/telemetry"
            "#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.serial.port, "/dev/ttyAMA0");
        assert!(config.output.log_enabled);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("/nonexistent/loralink.toml").unwrap();
        assert_eq!(config.radio.address, 2);
    }
}
