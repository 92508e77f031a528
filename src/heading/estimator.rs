//! Shared heading estimate with a single-writer ingest loop.
//!
//! One background thread owns the write side (pulling samples from an
//! [`AngleSource`] and feeding the filter); any number of control-side
//! readers poll [`HeadingEstimator::current_heading`]. The filter state sits
//! behind a mutex so the running sum can never be read half-updated.

use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, bounded};

use crate::config::FilterConfig;
use crate::error::{HelmError, Result};
use crate::heading::CircularHeadingFilter;
use crate::sensor::AngleSource;

/// Thread-safe wrapper around the heading filter.
///
/// Cheap to share via `Arc`; readers never block writers for longer than one
/// window update.
pub struct HeadingEstimator {
    filter: Mutex<CircularHeadingFilter>,
}

impl HeadingEstimator {
    pub fn new(config: FilterConfig) -> Self {
        Self {
            filter: Mutex::new(CircularHeadingFilter::new(config)),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(FilterConfig::default())
    }

    /// Feed one raw heading sample. Returns `false` for rejected
    /// (non-finite) samples.
    pub fn ingest(&self, raw_deg: f32) -> bool {
        self.lock().ingest(raw_deg)
    }

    /// Current smoothed heading in [0,360). Never blocks beyond the mutex,
    /// never fails.
    pub fn current_heading(&self) -> f32 {
        self.lock().current_heading()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CircularHeadingFilter> {
        // The filter cannot panic mid-update, but a poisoned lock would
        // otherwise take the whole estimator down with it.
        self.filter.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Events surfaced by the ingest loop to whoever owns it.
#[derive(Debug, Clone, Copy)]
pub enum FeedEvent {
    /// The source produced no fresh sample within its expected interval.
    /// The estimator keeps serving its last estimate meanwhile.
    Stall { waited: Duration },
}

/// Handle to a running ingest loop.
///
/// Dropping the handle also stops the loop (the shutdown channel
/// disconnects), but `shutdown` should be preferred so errors from the
/// source are not lost.
pub struct IngestHandle {
    shutdown_tx: Sender<()>,
    events_rx: Receiver<FeedEvent>,
    join: JoinHandle<Result<()>>,
}

impl IngestHandle {
    /// Channel of stall notifications from the loop. Bounded; events are
    /// dropped rather than blocking the loop if nobody is listening.
    pub fn events(&self) -> &Receiver<FeedEvent> {
        &self.events_rx
    }

    /// True once the loop has exited (source exhausted, failed, or shut
    /// down).
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Signal the loop to stop and wait for it to finish.
    pub fn shutdown(self) -> Result<()> {
        let _ = self.shutdown_tx.send(());
        self.join
            .join()
            .map_err(|_| HelmError::Sensor("ingest thread panicked".into()))?
    }
}

/// Spawn the dedicated ingest thread.
///
/// The loop pulls samples from `source` and feeds `estimator` until the
/// source is exhausted, fails, or shutdown is requested. Stalls are reported
/// on the event channel and logged, never fatal: a robot with a stale
/// heading is better served by its last estimate than by none.
pub fn spawn_ingest<S>(mut source: S, estimator: Arc<HeadingEstimator>) -> IngestHandle
where
    S: AngleSource + 'static,
{
    let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
    let (events_tx, events_rx) = bounded::<FeedEvent>(16);

    let join = thread::spawn(move || {
        loop {
            // Shutdown requested or handle dropped
            match shutdown_rx.try_recv() {
                Err(crossbeam_channel::TryRecvError::Empty) => {}
                _ => {
                    log::debug!("Ingest loop shutting down");
                    return Ok(());
                }
            }

            match source.next_sample() {
                Ok(Some(deg)) => {
                    if !estimator.ingest(deg) {
                        log::warn!("Rejected non-finite heading sample: {}", deg);
                    }
                }
                Ok(None) => {
                    log::info!("Heading source exhausted");
                    return Ok(());
                }
                Err(HelmError::SensorStall(waited)) => {
                    log::warn!("Heading source stalled for {:?}", waited);
                    let _ = events_tx.try_send(FeedEvent::Stall { waited });
                }
                Err(e) => {
                    log::error!("Heading source failed: {}", e);
                    return Err(e);
                }
            }
        }
    });

    IngestHandle {
        shutdown_tx,
        events_rx,
        join,
    }
}
