//! Configuration for the helmsman heading/bearing stack.
//!
//! Every tunable lives here so field re-tuning never touches filter or
//! controller code. `HelmConfig::default()` gives the values the robot
//! shipped with; `HelmConfig::load` reads overrides from a TOML file:
//!
//! ```toml
//! [turn]
//! tolerance_deg = 5.0
//! timeout_secs = 8.0
//!
//! [sensor.calibration]
//! x_offset = -12.5
//! y_offset = 3.25
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::constants::*;
use crate::error::{HelmError, Result};

/// System-wide configuration
///
/// Contains all parameters for heading estimation, turn control, the sensor
/// feed, and color segmentation. Use `HelmConfig::default()` for the values
/// tuned on the reference robot.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HelmConfig {
    /// Heading filter configuration
    pub filter: FilterConfig,
    /// Turn-to-bearing controller configuration
    pub turn: TurnConfig,
    /// Sensor feed configuration
    pub sensor: SensorConfig,
    /// Color segmentation configuration
    pub vision: VisionConfig,
}

impl HelmConfig {
    /// Load configuration from a TOML file.
    ///
    /// Missing sections and fields fall back to their defaults, so a config
    /// file only needs to name what it overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| HelmError::Config(format!("{}: {}", path.as_ref().display(), e)))?;
        let config: HelmConfig =
            toml::from_str(&text).map_err(|e| HelmError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the filter or controller cannot operate on.
    pub fn validate(&self) -> Result<()> {
        if self.filter.window_size == 0 {
            return Err(HelmError::Config("window_size must be positive".into()));
        }
        if self.turn.tolerance_deg <= 0.0 {
            return Err(HelmError::Config("tolerance_deg must be positive".into()));
        }
        if self.turn.timeout_secs <= 0.0 {
            return Err(HelmError::Config("timeout_secs must be positive".into()));
        }
        Ok(())
    }
}

/// Heading filter configuration
///
/// The wrap and runaway thresholds are empirical; see `constants.rs` for
/// what each one means. Changing one without the others usually opens a
/// dead zone near the seam, so re-tune them as a set.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Samples in the smoothing window (larger = smoother, slower response)
    pub window_size: usize,
    /// Averages above this arm the upward wrap adjustment
    pub wrap_high_entry_deg: f32,
    /// Averages below this arm the downward wrap adjustment
    pub wrap_low_entry_deg: f32,
    /// Pre-update average at or above this forces a window reset
    pub runaway_high_deg: f32,
    /// Pre-update average at or below this forces a window reset
    pub runaway_low_deg: f32,
    /// Value the window is reset to after drifting out the top
    pub high_drift_reset_deg: f32,
    /// Value the window is reset to after drifting out the bottom
    pub low_drift_reset_deg: f32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            wrap_high_entry_deg: WRAP_HIGH_ENTRY_DEG,
            wrap_low_entry_deg: WRAP_LOW_ENTRY_DEG,
            runaway_high_deg: RUNAWAY_HIGH_DEG,
            runaway_low_deg: RUNAWAY_LOW_DEG,
            high_drift_reset_deg: HIGH_DRIFT_RESET_DEG,
            low_drift_reset_deg: LOW_DRIFT_RESET_DEG,
        }
    }
}

/// Turn-to-bearing controller configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TurnConfig {
    /// Bearing error magnitude below which a turn counts as settled
    pub tolerance_deg: f32,
    /// Hard deadline on a single turn; motors are stopped on expiry
    pub timeout_secs: f32,
    /// Interval between heading polls while spinning
    pub poll_interval_ms: f32,
}

impl TurnConfig {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f32(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f32(self.poll_interval_ms / 1000.0)
    }
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            tolerance_deg: DEFAULT_TURN_TOLERANCE_DEG,
            timeout_secs: 5.0,
            poll_interval_ms: 20.0,
        }
    }
}

/// Sensor feed configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// How long the feed may go without a fresh sample before it counts
    /// as a stall
    pub stall_timeout_ms: f32,
    /// IMU reads allowed while waiting for the magnetometer to change
    /// before declaring a stall
    pub freshness_poll_budget: usize,
    /// Hard-iron magnetometer calibration offsets
    pub calibration: MagCalibration,
}

impl SensorConfig {
    pub fn stall_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f32(self.stall_timeout_ms / 1000.0)
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            stall_timeout_ms: 500.0,
            freshness_poll_budget: 1000,
            calibration: MagCalibration::default(),
        }
    }
}

/// Hard-iron offsets subtracted from raw magnetometer axes.
///
/// Per-robot values; obtained by spinning the robot in place and centering
/// the min/max of each axis.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct MagCalibration {
    pub x_offset: f32,
    pub y_offset: f32,
    pub z_offset: f32,
}

/// Color segmentation configuration
///
/// Bands use the OpenCV HSV convention (hue 0-179). A band may carry more
/// than one range because some hues straddle the hue seam.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    pub bands: Vec<ColorBand>,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            bands: vec![
                ColorBand {
                    name: "teal".into(),
                    ranges: vec![HsvRange {
                        lower: [80, 80, 60],
                        upper: [100, 255, 255],
                    }],
                },
                ColorBand {
                    name: "purple".into(),
                    // Purple bleeds across the red seam under warm lighting,
                    // so it needs a second range at the top of the hue scale.
                    ranges: vec![
                        HsvRange {
                            lower: [125, 60, 50],
                            upper: [155, 255, 255],
                        },
                        HsvRange {
                            lower: [170, 60, 50],
                            upper: [179, 255, 255],
                        },
                    ],
                },
                ColorBand {
                    name: "blue".into(),
                    ranges: vec![HsvRange {
                        lower: [100, 100, 60],
                        upper: [125, 255, 255],
                    }],
                },
            ],
        }
    }
}

/// A named target color with its HSV threshold range(s).
#[derive(Debug, Clone, Deserialize)]
pub struct ColorBand {
    pub name: String,
    pub ranges: Vec<HsvRange>,
}

/// Inclusive HSV threshold bounds, `[h, s, v]` with hue in 0-179.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct HsvRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}
