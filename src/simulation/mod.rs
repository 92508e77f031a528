//! Synthetic sources and sinks for tests and bench runs.
//!
//! Everything here is deterministic: the compass takes an explicit RNG seed
//! so a failing run can be replayed exactly.

use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use crate::drive::{DriveCommand, MotionSink};
use crate::error::{HelmError, Result};
use crate::heading::normalize_degrees;
use crate::sensor::AngleSource;

/// A compass on a robot spinning at a constant rate, with Gaussian sensor
/// noise. Produces a fixed number of samples, then reports exhaustion.
pub struct SimulatedCompass {
    heading_deg: f32,
    rate_deg_per_sample: f32,
    noise: Normal<f32>,
    rng: ChaCha8Rng,
    remaining: usize,
    interval: Option<Duration>,
}

impl SimulatedCompass {
    pub fn new(
        start_deg: f32,
        rate_deg_per_sample: f32,
        noise_std_deg: f32,
        samples: usize,
        seed: u64,
    ) -> Result<Self> {
        let noise = Normal::new(0.0, noise_std_deg)
            .map_err(|e| HelmError::Config(format!("noise_std_deg: {}", e)))?;
        Ok(Self {
            heading_deg: normalize_degrees(start_deg),
            rate_deg_per_sample,
            noise,
            rng: ChaCha8Rng::seed_from_u64(seed),
            remaining: samples,
            interval: None,
        })
    }

    /// Sleep this long between samples to mimic a live sensor cadence.
    pub fn paced(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// True (noise-free) heading the compass is currently at.
    pub fn true_heading(&self) -> f32 {
        self.heading_deg
    }
}

impl AngleSource for SimulatedCompass {
    fn next_sample(&mut self) -> Result<Option<f32>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;

        if let Some(interval) = self.interval {
            std::thread::sleep(interval);
        }

        self.heading_deg = normalize_degrees(self.heading_deg + self.rate_deg_per_sample);
        let sample = self.heading_deg + self.noise.sample(&mut self.rng);
        Ok(Some(normalize_degrees(sample)))
    }
}

/// Records every drive command it receives. Stands in for the motor driver
/// in controller tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    commands: Vec<DriveCommand>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DriveCommand] {
        &self.commands
    }

    pub fn stop_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DriveCommand::Stop))
            .count()
    }

    pub fn last(&self) -> Option<&DriveCommand> {
        self.commands.last()
    }
}

impl MotionSink for RecordingSink {
    fn drive(&mut self, cmd: DriveCommand) -> Result<()> {
        self.commands.push(cmd);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_compass_is_deterministic() {
        let mut a = SimulatedCompass::new(10.0, 1.0, 2.0, 50, 42).unwrap();
        let mut b = SimulatedCompass::new(10.0, 1.0, 2.0, 50, 42).unwrap();
        for _ in 0..50 {
            assert_eq!(a.next_sample().unwrap(), b.next_sample().unwrap());
        }
        assert_eq!(a.next_sample().unwrap(), None);
    }

    #[test]
    fn test_samples_stay_in_range() {
        let mut compass = SimulatedCompass::new(359.0, 0.5, 5.0, 200, 7).unwrap();
        while let Some(deg) = compass.next_sample().unwrap() {
            assert!((0.0..360.0).contains(&deg));
        }
    }

    #[test]
    fn test_noise_free_compass_tracks_rate() {
        let mut compass = SimulatedCompass::new(0.0, 2.0, 0.0, 10, 0).unwrap();
        let mut last = 0.0;
        for _ in 0..10 {
            last = compass.next_sample().unwrap().unwrap();
        }
        assert!((last - 20.0).abs() < 1e-3);
    }
}
