//! Heading sample sources.
//!
//! The estimator does not care where angles come from; anything that can
//! block until the next sample implements [`AngleSource`]. Hardware drivers
//! usually push from their own thread into a [`ChannelAngleSource`];
//! recorded traces replay through [`ReplaySource`].

pub mod magnetometer;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};

use crate::error::{HelmError, Result};

pub use magnetometer::{Imu, ImuSample, MagAngleSource};

/// Blocking pull of raw heading samples in degrees.
///
/// Samples may be any finite real, not necessarily range-reduced. `Ok(None)`
/// means the source is exhausted; `Err(SensorStall)` means no fresh sample
/// arrived within the source's expected interval (the source remains usable
/// afterwards).
pub trait AngleSource: Send {
    fn next_sample(&mut self) -> Result<Option<f32>>;
}

impl AngleSource for Box<dyn AngleSource> {
    fn next_sample(&mut self) -> Result<Option<f32>> {
        (**self).next_sample()
    }
}

/// Channel-backed source for sensors that push samples from their own
/// thread. Converts receive timeouts into [`HelmError::SensorStall`].
pub struct ChannelAngleSource {
    rx: Receiver<f32>,
    stall_after: Duration,
}

impl ChannelAngleSource {
    pub fn new(rx: Receiver<f32>, stall_after: Duration) -> Self {
        Self { rx, stall_after }
    }
}

impl AngleSource for ChannelAngleSource {
    fn next_sample(&mut self) -> Result<Option<f32>> {
        match self.rx.recv_timeout(self.stall_after) {
            Ok(deg) => Ok(Some(deg)),
            Err(RecvTimeoutError::Timeout) => Err(HelmError::SensorStall(self.stall_after)),
            Err(RecvTimeoutError::Disconnected) => Ok(None),
        }
    }
}

/// Replays a recorded heading trace: a text file with one angle in degrees
/// per line. Blank lines and `#` comments are skipped. Optionally paced to
/// mimic the live sampling cadence.
pub struct ReplaySource {
    samples: std::vec::IntoIter<f32>,
    interval: Option<Duration>,
}

impl ReplaySource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())
            .map_err(|e| HelmError::Sensor(format!("{}: {}", path.as_ref().display(), e)))?;

        let mut samples = Vec::new();
        for (lineno, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| HelmError::Sensor(e.to_string()))?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let deg: f32 = trimmed.parse().map_err(|_| {
                HelmError::Sensor(format!("line {}: not an angle: {}", lineno + 1, trimmed))
            })?;
            samples.push(deg);
        }

        Ok(Self {
            samples: samples.into_iter(),
            interval: None,
        })
    }

    pub fn from_samples(samples: Vec<f32>) -> Self {
        Self {
            samples: samples.into_iter(),
            interval: None,
        }
    }

    /// Sleep this long between samples to mimic the live cadence.
    pub fn paced(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }
}

impl AngleSource for ReplaySource {
    fn next_sample(&mut self) -> Result<Option<f32>> {
        let sample = self.samples.next();
        if sample.is_some()
            && let Some(interval) = self.interval
        {
            std::thread::sleep(interval);
        }
        Ok(sample)
    }
}
