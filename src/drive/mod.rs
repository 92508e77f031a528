//! Drive commands and the motion sink interface.
//!
//! The controller side only ever speaks [`DriveCommand`]; how a command
//! becomes actuator signals is the sink's business. [`DifferentialDrive`]
//! translates commands for a two-wheel robot; [`LoggingSink`] is a no-op
//! sink for dry runs.

pub mod differential;

use std::time::Duration;

use crate::error::Result;

pub use differential::{DifferentialDrive, MotorChannel};

/// One drive decision. Created per control decision and consumed
/// immediately; the optional duration means "hold this for so long, then
/// stop".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveCommand {
    /// Cut power to both wheels. Always safe, always succeeds at the
    /// command level.
    Stop,
    /// Both wheels forward.
    Start(Option<Duration>),
    /// Left wheel only (arcs right).
    StartLeft(Option<Duration>),
    /// Right wheel only (arcs left).
    StartRight(Option<Duration>),
    /// Spin in place counter-clockwise.
    SpinLeft(Option<Duration>),
    /// Spin in place clockwise.
    SpinRight(Option<Duration>),
    /// Both wheels backward.
    Reverse(Option<Duration>),
}

impl DriveCommand {
    pub fn duration(&self) -> Option<Duration> {
        match *self {
            DriveCommand::Stop => None,
            DriveCommand::Start(d)
            | DriveCommand::StartLeft(d)
            | DriveCommand::StartRight(d)
            | DriveCommand::SpinLeft(d)
            | DriveCommand::SpinRight(d)
            | DriveCommand::Reverse(d) => d,
        }
    }
}

/// Sink for drive commands.
pub trait MotionSink {
    fn drive(&mut self, cmd: DriveCommand) -> Result<()>;
}

/// Logs commands instead of driving hardware. Useful for replay analysis
/// and bench runs with no motors attached.
#[derive(Debug, Default)]
pub struct LoggingSink;

impl MotionSink for LoggingSink {
    fn drive(&mut self, cmd: DriveCommand) -> Result<()> {
        log::info!("drive: {:?}", cmd);
        Ok(())
    }
}
