//! Magnetometer-derived heading source.
//!
//! Wraps an IMU (accelerometer + magnetometer) behind [`Imu`] and turns its
//! magnetic vector into compass headings. The IMU is polled until the
//! magnetometer reading actually changes, so one physical sample is never
//! averaged twice; the poll budget bounds that wait and converts a frozen
//! sensor into a [`HelmError::SensorStall`].

use std::time::Duration;

use crate::config::{MagCalibration, SensorConfig};
use crate::error::{HelmError, Result};
use crate::heading::heading_from_mag;
use crate::sensor::AngleSource;

/// One combined IMU reading, raw sensor units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImuSample {
    pub accel: [f32; 3],
    pub mag: [f32; 3],
}

/// Minimal IMU interface: one blocking read of both sensors.
pub trait Imu: Send {
    fn read(&mut self) -> Result<ImuSample>;
}

/// [`AngleSource`] over an IMU's magnetometer.
///
/// Freshness is tracked independently for the magnetometer and the
/// accelerometer: consuming a fresh mag reading must not mark the pending
/// accel reading as seen, and vice versa.
pub struct MagAngleSource<I: Imu> {
    imu: I,
    calibration: MagCalibration,
    poll_budget: usize,
    stall_equivalent: Duration,
    prev_mag: Option<[f32; 3]>,
    prev_accel: Option<[f32; 3]>,
}

impl<I: Imu> MagAngleSource<I> {
    pub fn new(imu: I, config: &SensorConfig) -> Self {
        Self {
            imu,
            calibration: config.calibration,
            poll_budget: config.freshness_poll_budget.max(1),
            stall_equivalent: config.stall_timeout(),
            prev_mag: None,
            prev_accel: None,
        }
    }

    /// Block until the magnetometer produces a reading different from the
    /// last one consumed, calibrated for hard-iron offsets.
    pub fn fresh_mag(&mut self) -> Result<[f32; 3]> {
        for _ in 0..self.poll_budget {
            let sample = self.imu.read()?;
            if self.prev_mag != Some(sample.mag) {
                self.prev_mag = Some(sample.mag);
                return Ok(self.calibrated(sample.mag));
            }
        }
        Err(HelmError::SensorStall(self.stall_equivalent))
    }

    /// Block until the accelerometer produces a fresh reading.
    pub fn fresh_accel(&mut self) -> Result<[f32; 3]> {
        for _ in 0..self.poll_budget {
            let sample = self.imu.read()?;
            if self.prev_accel != Some(sample.accel) {
                self.prev_accel = Some(sample.accel);
                return Ok(sample.accel);
            }
        }
        Err(HelmError::SensorStall(self.stall_equivalent))
    }

    fn calibrated(&self, mag: [f32; 3]) -> [f32; 3] {
        [
            mag[0] - self.calibration.x_offset,
            mag[1] - self.calibration.y_offset,
            mag[2] - self.calibration.z_offset,
        ]
    }
}

impl<I: Imu> AngleSource for MagAngleSource<I> {
    fn next_sample(&mut self) -> Result<Option<f32>> {
        let mag = self.fresh_mag()?;
        Ok(Some(heading_from_mag(mag[0], mag[1])))
    }
}
