//! # GPS Module
//!
//! Position sampling for the sending node.
//!
//! This module handles:
//! - The fixed-point position data model shared with the wire protocol
//! - The sensor driver boundary (`GpsSensor` trait)
//! - Hold-last-fix sampling across cycles with no fresh solution
//! - An NMEA GGA driver for serial-attached receivers

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;

pub mod nmea;

pub use nmea::NmeaGps;

/// A single resolved reading from the positioning sensor.
///
/// Coordinates are fixed-point integers so values survive the text wire
/// format without floating-point drift: degrees scaled by 10^7, altitude
/// in millimeters. Scaling back to degrees/meters is display-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PositionFix {
    /// Latitude in degrees × 10^7.
    pub lat_e7: i32,

    /// Longitude in degrees × 10^7.
    pub lon_e7: i32,

    /// Altitude above mean sea level in millimeters.
    pub alt_mm: i32,
}

/// Boundary to the positioning sensor driver.
///
/// One poll per call, no retries. `Ok(None)` means the sensor produced no
/// fresh navigation solution during this poll.
#[async_trait]
pub trait GpsSensor: Send {
    async fn poll_fix(&mut self) -> Result<Option<PositionFix>>;
}

/// Polls the sensor once per cycle and holds the last known fix.
///
/// When a poll yields nothing new the previously held fix is returned
/// unchanged, so a stalled sensor shows up downstream as a stale position
/// rather than a gap or a zeroed record. This staleness window is a known
/// property of the design, not an error. `None` is only returned before
/// the very first fix.
pub struct GpsSampler<S> {
    sensor: S,
    held: Option<PositionFix>,
}

impl<S: GpsSensor> GpsSampler<S> {
    pub fn new(sensor: S) -> Self {
        Self { sensor, held: None }
    }

    /// Poll the sensor once and return the freshest known fix.
    pub async fn sample(&mut self) -> Result<Option<PositionFix>> {
        if let Some(fix) = self.sensor.poll_fix().await? {
            self.held = Some(fix);
        }
        Ok(self.held)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct ScriptedGps {
        polls: VecDeque<Option<PositionFix>>,
    }

    impl ScriptedGps {
        fn new(polls: Vec<Option<PositionFix>>) -> Self {
            Self {
                polls: polls.into(),
            }
        }
    }

    #[async_trait]
    impl GpsSensor for ScriptedGps {
        async fn poll_fix(&mut self) -> Result<Option<PositionFix>> {
            Ok(self.polls.pop_front().flatten())
        }
    }

    fn fix(lat_e7: i32) -> PositionFix {
        PositionFix {
            lat_e7,
            lon_e7: 0,
            alt_mm: 0,
        }
    }

    #[tokio::test]
    async fn test_sample_returns_none_before_first_fix() {
        let mut sampler = GpsSampler::new(ScriptedGps::new(vec![None]));
        assert_eq!(sampler.sample().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sample_holds_last_fix_through_empty_polls() {
        let mut sampler = GpsSampler::new(ScriptedGps::new(vec![
            Some(fix(10)),
            None,
            None,
            Some(fix(20)),
        ]));

        assert_eq!(sampler.sample().await.unwrap(), Some(fix(10)));
        // Sensor has nothing new: the held value is reused, not zeroed.
        assert_eq!(sampler.sample().await.unwrap(), Some(fix(10)));
        assert_eq!(sampler.sample().await.unwrap(), Some(fix(10)));
        assert_eq!(sampler.sample().await.unwrap(), Some(fix(20)));
    }
}
