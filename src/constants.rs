//! Numeric constants for heading estimation
//!
//! The wrap-detection and runaway-guard thresholds were tuned on hardware
//! against a noisy LSM303 magnetometer. They are surfaced through
//! `FilterConfig` so they can be re-tuned without touching filter code.

/// Number of samples in the heading smoothing window.
pub const DEFAULT_WINDOW_SIZE: usize = 20;

/// Window averages above this are treated as "just below the 360 seam":
/// low incoming samples get shifted up by a full revolution.
pub const WRAP_HIGH_ENTRY_DEG: f32 = 340.0;

/// Window averages below this are treated as "just above the 0 seam":
/// high incoming samples get shifted down by a full revolution.
pub const WRAP_LOW_ENTRY_DEG: f32 = 20.0;

/// Pre-update averages at or above this mean the adjusted window has drifted
/// out the top of the valid range and must be clamped back.
pub const RUNAWAY_HIGH_DEG: f32 = 370.0;

/// Pre-update averages at or below this mean the adjusted window has drifted
/// out the bottom of the valid range and must be clamped back.
pub const RUNAWAY_LOW_DEG: f32 = -10.0;

/// Constant the window is reset to after drifting out the top. Just above
/// the seam, so the next few samples re-converge without re-triggering.
pub const HIGH_DRIFT_RESET_DEG: f32 = 10.0;

/// Constant the window is reset to after drifting out the bottom.
pub const LOW_DRIFT_RESET_DEG: f32 = 350.0;

/// Default bearing-error tolerance for ending a turn.
pub const DEFAULT_TURN_TOLERANCE_DEG: f32 = 3.0;
