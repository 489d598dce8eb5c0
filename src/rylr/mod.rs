//! # RYLR Link Module
//!
//! Implementation of the telemetry link over the REYAX RYLR998 AT-command
//! interface.
//!
//! This module handles:
//! - Telemetry payload encoding (`timestamp;lat;lon;alt`)
//! - `AT+SEND` command envelope construction
//! - `+RCV=` notification parsing with link-quality extraction
//! - Radio module bring-up and command pacing

pub mod decoder;
pub mod encoder;
pub mod link;
pub mod protocol;

pub use link::RadioLink;
pub use protocol::{LinkQuality, TelemetryRecord};
