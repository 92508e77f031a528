use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::bounded;

use helmsman::config::FilterConfig;
use helmsman::heading::{FeedEvent, HeadingEstimator, IngestHandle, bearing_error, spawn_ingest};
use helmsman::sensor::{AngleSource, ChannelAngleSource};
use helmsman::simulation::SimulatedCompass;

/// Let the ingest loop drain a disconnected source before joining it;
/// shutting down immediately could preempt samples still queued.
fn wait_until_finished(handle: &IngestHandle) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !handle.is_finished() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn test_estimator_tracks_slow_rotation() {
    // Quarter turn at 0.1 deg/sample with 2 deg sensor noise; the smoothed
    // estimate must end close to the true final heading.
    let mut compass = SimulatedCompass::new(100.0, 0.1, 2.0, 2000, 42).unwrap();
    let estimator = HeadingEstimator::with_defaults();

    while let Some(deg) = compass.next_sample().unwrap() {
        assert!(estimator.ingest(deg));
    }

    let error = bearing_error(compass.true_heading(), estimator.current_heading());
    assert!(
        error.abs() < 5.0,
        "estimate {:.1} too far from true heading {:.1}",
        estimator.current_heading(),
        compass.true_heading()
    );
}

#[test]
fn test_estimator_tracks_through_seam() {
    // Drift from 350 up through the wrap to ~14 degrees. The estimate must
    // follow through the seam instead of collapsing toward 180.
    let mut compass = SimulatedCompass::new(350.0, 0.05, 0.5, 480, 9).unwrap();
    let estimator = HeadingEstimator::with_defaults();

    while let Some(deg) = compass.next_sample().unwrap() {
        estimator.ingest(deg);
        let h = estimator.current_heading();
        assert!((0.0..360.0).contains(&h));
        // Never anywhere near the naive-average failure mode
        assert!(
            !(90.0..270.0).contains(&h),
            "estimate jumped to {:.1} while crossing the seam",
            h
        );
    }

    let error = bearing_error(compass.true_heading(), estimator.current_heading());
    assert!(
        error.abs() < 4.0,
        "estimate {:.1} lost the heading after the seam (true {:.1})",
        estimator.current_heading(),
        compass.true_heading()
    );
}

#[test]
fn test_ingest_thread_feeds_shared_estimator() {
    let (tx, rx) = bounded(256);
    let source = ChannelAngleSource::new(rx, Duration::from_millis(500));
    let estimator = Arc::new(HeadingEstimator::new(FilterConfig::default()));
    let handle = spawn_ingest(source, Arc::clone(&estimator));

    for _ in 0..40 {
        tx.send(270.0).unwrap();
    }
    drop(tx);
    wait_until_finished(&handle);
    handle.shutdown().unwrap();

    assert_eq!(estimator.current_heading(), 270.0);
}

#[test]
fn test_stall_is_surfaced_but_estimate_survives() {
    let (tx, rx) = bounded(64);
    let source = ChannelAngleSource::new(rx, Duration::from_millis(20));
    let estimator = Arc::new(HeadingEstimator::with_defaults());
    let handle = spawn_ingest(source, Arc::clone(&estimator));

    for _ in 0..25 {
        tx.send(45.0).unwrap();
    }

    // Starve the feed; the loop must report the stall and keep serving the
    // last estimate.
    let event = handle
        .events()
        .recv_timeout(Duration::from_secs(1))
        .expect("stall not reported");
    assert!(matches!(event, FeedEvent::Stall { .. }));
    assert_eq!(estimator.current_heading(), 45.0);

    // The source recovers after the stall
    tx.send(46.0).unwrap();
    drop(tx);
    handle.shutdown().unwrap();
}

#[test]
fn test_non_finite_samples_do_not_poison_the_window() {
    let (tx, rx) = bounded(64);
    let source = ChannelAngleSource::new(rx, Duration::from_millis(500));
    let estimator = Arc::new(HeadingEstimator::with_defaults());
    let handle = spawn_ingest(source, Arc::clone(&estimator));

    for i in 0..40 {
        if i % 5 == 0 {
            tx.send(f32::NAN).unwrap();
        }
        tx.send(120.0).unwrap();
    }
    drop(tx);
    wait_until_finished(&handle);
    handle.shutdown().unwrap();

    assert_eq!(estimator.current_heading(), 120.0);
}
