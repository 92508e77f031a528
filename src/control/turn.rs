//! Turn-to-bearing controller.
//!
//! Spins the robot toward a target heading and stops once the bearing error
//! falls inside tolerance. The loop is bounded: it always carries a deadline
//! and can be cancelled externally, and a `Stop` command is issued on every
//! exit path so the motors can never be left engaged by a sensor fault.

use std::time::Instant;

use crossbeam_channel::{Receiver, RecvTimeoutError};

use crate::config::TurnConfig;
use crate::drive::{DriveCommand, MotionSink};
use crate::error::Result;
use crate::heading::{HeadingEstimator, bearing_error, normalize_degrees};

/// Read side of the heading estimate, as the controller sees it.
pub trait HeadingReader {
    fn current_heading(&self) -> f32;
}

impl HeadingReader for HeadingEstimator {
    fn current_heading(&self) -> f32 {
        HeadingEstimator::current_heading(self)
    }
}

/// Where a turn ended up. `TimedOut` and `Cancelled` are normal outcomes,
/// not errors; in both cases the motors have already been stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Settled,
    TimedOut,
    Cancelled,
}

/// Controller lifecycle: `Idle` until a turn starts, `Spinning` while a spin
/// command is live, `Settled` once the error has fallen inside tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    Idle,
    Spinning,
    Settled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpinDirection {
    Clockwise,
    CounterClockwise,
}

impl SpinDirection {
    fn command(self) -> DriveCommand {
        match self {
            // Positive error: target is clockwise of us, turn right
            SpinDirection::Clockwise => DriveCommand::SpinRight(None),
            SpinDirection::CounterClockwise => DriveCommand::SpinLeft(None),
        }
    }
}

pub struct TurnController<'a, H: HeadingReader + ?Sized, S: MotionSink + ?Sized> {
    heading: &'a H,
    sink: &'a mut S,
    config: TurnConfig,
    phase: TurnPhase,
}

impl<'a, H: HeadingReader + ?Sized, S: MotionSink + ?Sized> TurnController<'a, H, S> {
    pub fn new(heading: &'a H, sink: &'a mut S, config: TurnConfig) -> Self {
        Self {
            heading,
            sink,
            config,
            phase: TurnPhase::Idle,
        }
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Turn until the heading is within tolerance of `target_deg` (absolute,
    /// compass degrees).
    ///
    /// Blocks the calling thread while polling. A message (or disconnect) on
    /// `cancel` aborts the turn. Whatever happens -- settle, timeout,
    /// cancellation, sink failure -- exactly one `Stop` is issued before
    /// returning.
    pub fn turn_to_heading(
        &mut self,
        target_deg: f32,
        cancel: Option<&Receiver<()>>,
    ) -> Result<TurnOutcome> {
        let target = normalize_degrees(target_deg);
        let deadline = Instant::now() + self.config.timeout();

        let spin_result = self.spin_toward(target, deadline, cancel);

        // Unconditional: motors must never stay engaged past this point.
        let stop_result = self.sink.drive(DriveCommand::Stop);

        let outcome = spin_result?;
        stop_result?;

        match outcome {
            TurnOutcome::Settled => {
                self.phase = TurnPhase::Settled;
                log::debug!("Turn settled at target {:.1}", target);
            }
            TurnOutcome::TimedOut => {
                log::warn!(
                    "Turn toward {:.1} timed out after {:?}; motors stopped",
                    target,
                    self.config.timeout()
                );
            }
            TurnOutcome::Cancelled => {
                log::info!("Turn toward {:.1} cancelled; motors stopped", target);
            }
        }
        Ok(outcome)
    }

    /// Turn by a signed offset relative to the current heading (negative =
    /// left, positive = right).
    pub fn turn_by(&mut self, delta_deg: f32, cancel: Option<&Receiver<()>>) -> Result<TurnOutcome> {
        let target = normalize_degrees(self.heading.current_heading() + delta_deg);
        self.turn_to_heading(target, cancel)
    }

    fn spin_toward(
        &mut self,
        target: f32,
        deadline: Instant,
        cancel: Option<&Receiver<()>>,
    ) -> Result<TurnOutcome> {
        let mut spinning: Option<SpinDirection> = None;

        loop {
            let error = bearing_error(target, self.heading.current_heading());
            if error.abs() <= self.config.tolerance_deg {
                return Ok(TurnOutcome::Settled);
            }

            let wanted = if error > 0.0 {
                SpinDirection::Clockwise
            } else {
                SpinDirection::CounterClockwise
            };

            // Issue a spin command on entry and again only if the sign of
            // the error flips (overshoot past the target).
            if spinning != Some(wanted) {
                self.sink.drive(wanted.command())?;
                spinning = Some(wanted);
                self.phase = TurnPhase::Spinning;
            }

            if Instant::now() >= deadline {
                return Ok(TurnOutcome::TimedOut);
            }

            match cancel {
                Some(rx) => match rx.recv_timeout(self.config.poll_interval()) {
                    // A dropped cancel sender means the owner is gone;
                    // abandoning the turn is the safe reading.
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                        return Ok(TurnOutcome::Cancelled);
                    }
                    Err(RecvTimeoutError::Timeout) => {}
                },
                None => std::thread::sleep(self.config.poll_interval()),
            }
        }
    }
}
