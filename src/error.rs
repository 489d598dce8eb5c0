//! # Error Types
//!
//! Custom error types for LoRaLink using `thiserror`.

use thiserror::Error;

/// Main error type for LoRaLink
#[derive(Debug, Error)]
pub enum LoraLinkError {
    /// Payload exceeds the module's `AT+SEND` limit
    #[error("payload too large: {len} bytes exceeds limit of {max}")]
    PayloadTooLarge { len: usize, max: usize },

    /// Receive notification is structurally invalid
    #[error("malformed notification: {0}")]
    MalformedNotification(String),

    /// Telemetry payload is structurally invalid
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// A field inside an otherwise well-structured frame failed numeric conversion
    #[error("field parse error: {0}")]
    FieldParse(String),

    /// The radio module answered a command with `+ERR`
    #[error("radio command rejected: {0}")]
    CommandRejected(String),

    /// Serial transport errors
    #[error("serial error: {0}")]
    Serial(String),

    /// No serial device found at the configured path
    #[error("serial port not found: {0}")]
    SerialPortNotFound(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for LoRaLink
pub type Result<T> = std::result::Result<T, LoraLinkError>;
