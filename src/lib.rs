//! # LoRaLink Library
//!
//! Stream GPS position telemetry between nodes over a REYAX RYLR998 LoRa link.
//!
//! This library provides the telemetry framing, transmission, and parsing
//! protocol that rides over the radio module's AT-command serial interface,
//! plus the GPS sampling and CSV output layers around it.

pub mod config;
pub mod error;
pub mod gps;
pub mod output;
pub mod rylr;
pub mod serial;
