//! Differential (two-wheel) drive command translation.
//!
//! Maps [`DriveCommand`] onto per-wheel throttle and direction. The wheel
//! hardware itself (PWM pins, H-bridge, whatever) stays behind
//! [`MotorChannel`], so this translation is testable without GPIO.

use crate::drive::{DriveCommand, MotionSink};
use crate::error::Result;

/// One wheel: a normalized throttle and a direction flag.
pub trait MotorChannel {
    /// Set throttle in 0..=1. Implementations clamp out-of-range values.
    fn set_throttle(&mut self, throttle: f32) -> Result<()>;
    /// Reversed = wheel turns backward at the same throttle.
    fn set_reversed(&mut self, reversed: bool) -> Result<()>;
}

pub struct DifferentialDrive<L: MotorChannel, R: MotorChannel> {
    left: L,
    right: R,
}

impl<L: MotorChannel, R: MotorChannel> DifferentialDrive<L, R> {
    pub fn new(left: L, right: R) -> Self {
        Self { left, right }
    }

    fn stop(&mut self) -> Result<()> {
        self.left.set_reversed(false)?;
        self.right.set_reversed(false)?;
        self.left.set_throttle(0.0)?;
        self.right.set_throttle(0.0)?;
        Ok(())
    }

    fn apply(&mut self, cmd: DriveCommand) -> Result<()> {
        match cmd {
            DriveCommand::Stop => self.stop(),
            DriveCommand::Start(_) => {
                self.left.set_reversed(false)?;
                self.right.set_reversed(false)?;
                self.left.set_throttle(1.0)?;
                self.right.set_throttle(1.0)
            }
            DriveCommand::StartLeft(_) => {
                self.left.set_reversed(false)?;
                self.left.set_throttle(1.0)?;
                self.right.set_throttle(0.0)
            }
            DriveCommand::StartRight(_) => {
                self.right.set_reversed(false)?;
                self.right.set_throttle(1.0)?;
                self.left.set_throttle(0.0)
            }
            DriveCommand::SpinLeft(_) => {
                // Counter-clockwise: left wheel backward, right forward
                self.left.set_reversed(true)?;
                self.right.set_reversed(false)?;
                self.left.set_throttle(1.0)?;
                self.right.set_throttle(1.0)
            }
            DriveCommand::SpinRight(_) => {
                self.left.set_reversed(false)?;
                self.right.set_reversed(true)?;
                self.left.set_throttle(1.0)?;
                self.right.set_throttle(1.0)
            }
            DriveCommand::Reverse(_) => {
                self.left.set_reversed(true)?;
                self.right.set_reversed(true)?;
                self.left.set_throttle(1.0)?;
                self.right.set_throttle(1.0)
            }
        }
    }
}

impl<L: MotorChannel, R: MotorChannel> MotionSink for DifferentialDrive<L, R> {
    fn drive(&mut self, cmd: DriveCommand) -> Result<()> {
        self.apply(cmd)?;

        // Timed commands hold, then stop. Blocking here matches the command
        // semantics: the caller asked for a fixed-length maneuver.
        if let Some(duration) = cmd.duration() {
            std::thread::sleep(duration);
            self.stop()?;
        }
        Ok(())
    }
}
