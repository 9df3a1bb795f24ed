//! Pointing controller behaviour against a recording mount double.

mod support;

use std::sync::Arc;
use std::time::Duration;

use opd_telescope::error::PointingError;
use opd_telescope::models::{Axis, ObserverSite, PointingState};
use opd_telescope::services::PointingController;
use support::{Call, RecordingMount, SlowTrackingMount};

const LST: f64 = 5.0;

const TRACKING_DELAY: Duration = Duration::from_millis(100);

async fn connected() -> (Arc<RecordingMount>, PointingController) {
    let mount = Arc::new(RecordingMount::new(LST));
    let controller = PointingController::new(mount.clone(), ObserverSite::opd());
    controller.connect().await.unwrap();
    mount.clear_calls();
    (mount, controller)
}

#[tokio::test]
async fn test_below_horizon_slew_makes_no_motion_calls() {
    let (mount, controller) = connected().await;

    // Twelve hours from the meridian: lower culmination
    let err = controller.slew("17 00 00", "+10 00 00").await.unwrap_err();
    match err {
        PointingError::BelowHorizon { elevation } => assert!(elevation < 0.0),
        other => panic!("expected BelowHorizon, got {other:?}"),
    }
    assert_eq!(controller.state(), PointingState::Idle);
    assert_eq!(mount.motion_calls(), 0);
}

#[tokio::test]
async fn test_below_horizon_from_tracking_keeps_tracking() {
    let (mount, controller) = connected().await;
    controller.slew("05 00 00", "-30 00 00").await.unwrap();
    mount.finish_slew();
    assert_eq!(controller.snapshot().await.unwrap().state, PointingState::Tracking);
    mount.clear_calls();

    assert!(controller.slew("17 00 00", "+10 00 00").await.is_err());
    assert_eq!(controller.state(), PointingState::Tracking);
    assert_eq!(mount.motion_calls(), 0);
}

#[tokio::test]
async fn test_malformed_input_is_rejected_before_device() {
    let (mount, controller) = connected().await;

    let err = controller.slew("12 61 00", "-20 00 00").await.unwrap_err();
    assert!(matches!(err, PointingError::InvalidCoordinate(_)));
    let err = controller.slew("05 00 00", "-20 00 60").await.unwrap_err();
    assert!(matches!(err, PointingError::InvalidCoordinate(_)));

    assert!(mount.calls().is_empty());
    assert_eq!(controller.state(), PointingState::Idle);
}

#[tokio::test]
async fn test_slew_enables_tracking_and_dispatches() {
    let (mount, controller) = connected().await;

    let target = controller.slew("05 00 00", "-22 32 04").await.unwrap();
    assert!((target.elevation - 90.0).abs() < 1e-6);
    assert_eq!(target.hour_angle, 0.0);
    assert_eq!(controller.state(), PointingState::Slewing);

    let calls = mount.calls();
    let tracking_at = calls
        .iter()
        .position(|c| *c == Call::SetTracking(true))
        .unwrap();
    let slew_at = calls
        .iter()
        .position(|c| matches!(c, Call::Slew { .. }))
        .unwrap();
    assert!(tracking_at < slew_at);

    let status = controller.snapshot().await.unwrap();
    assert!(status.tracking);
    assert!(status.slewing);
    assert_eq!(status.state, PointingState::Slewing);
}

#[tokio::test]
async fn test_slew_completion_moves_to_tracking() {
    let (mount, controller) = connected().await;
    controller.slew("05 30 00", "-40 00 00").await.unwrap();

    mount.finish_slew();
    let status = controller.snapshot().await.unwrap();
    assert_eq!(status.state, PointingState::Tracking);
    assert!(status.tracking);

    // Tracking dropped by the mount itself
    mount.set_position(|p| p.tracking = false);
    let status = controller.snapshot().await.unwrap();
    assert_eq!(status.state, PointingState::Idle);
}

#[tokio::test]
async fn test_slew_clears_abort_signal() {
    let (mount, controller) = connected().await;
    controller.abort().await.unwrap();
    assert!(controller.abort_signal().is_set());

    controller.slew("05 00 00", "-30 00 00").await.unwrap();
    assert!(!controller.abort_signal().is_set());

    // The device shares the controller's signal
    let signal = mount.last_abort_signal().unwrap();
    controller.abort().await.unwrap();
    assert!(signal.is_set());
}

#[tokio::test]
async fn test_abort_is_idempotent() {
    let (mount, controller) = connected().await;
    controller.slew("05 00 00", "-30 00 00").await.unwrap();
    mount.clear_calls();

    controller.abort().await.unwrap();
    assert_eq!(controller.state(), PointingState::Idle);
    assert!(mount.calls().contains(&Call::AbortSlew));
    assert!(mount.calls().contains(&Call::SetTracking(false)));

    mount.clear_calls();
    controller.abort().await.unwrap();
    assert_eq!(controller.state(), PointingState::Idle);
    assert!(mount.calls().is_empty());
}

#[tokio::test]
async fn test_abort_stops_jog() {
    let (mount, controller) = connected().await;
    controller.jog(Axis::South, 30.0).await.unwrap();
    controller.abort().await.unwrap();
    assert!(mount.calls().contains(&Call::StopAxis));
    assert_eq!(controller.active_jog(), None);
}

#[tokio::test]
async fn test_device_error_during_slew_reverts_to_idle() {
    let (mount, controller) = connected().await;
    mount.fail("slew_async");

    let err = controller.slew("05 00 00", "-30 00 00").await.unwrap_err();
    assert!(matches!(err, PointingError::Device(_)));
    assert_eq!(controller.state(), PointingState::Idle);

    mount.heal("slew_async");
    controller.slew("05 00 00", "-30 00 00").await.unwrap();
    assert_eq!(controller.state(), PointingState::Slewing);
}

#[tokio::test]
async fn test_device_error_during_track_reverts_to_idle() {
    let (mount, controller) = connected().await;
    controller.slew("05 00 00", "-30 00 00").await.unwrap();
    mount.finish_slew();
    controller.snapshot().await.unwrap();

    mount.fail("set_tracking");
    assert!(controller.set_track(false).await.is_err());
    assert_eq!(controller.state(), PointingState::Idle);
}

#[tokio::test]
async fn test_jog_lifecycle_is_caller_owned() {
    let (mount, controller) = connected().await;
    controller.jog(Axis::East, 15.0).await.unwrap();
    assert_eq!(mount.calls(), vec![Call::MoveAxis(Axis::East, 15.0)]);

    // No timeout: polling does not stop the jog
    controller.snapshot().await.unwrap();
    assert_eq!(controller.active_jog(), Some(Axis::East));

    controller.stop_jog().await.unwrap();
    assert!(mount.calls().contains(&Call::StopAxis));
    assert_eq!(controller.active_jog(), None);
}

#[tokio::test]
async fn test_snapshot_recomputes_derived_fields() {
    let (mount, controller) = connected().await;
    mount.set_position(|p| {
        p.right_ascension = 23.0;
        p.sidereal_time = 1.0;
    });

    let status = controller.snapshot().await.unwrap();
    assert!((status.hour_angle - 2.0).abs() < 1e-12);
    assert!(status.elevation > -90.0 && status.elevation <= 90.0);
    assert!(status.azimuth >= 0.0 && status.azimuth < 360.0);
    assert_eq!(status.time_limit, 2.5);
}

#[tokio::test]
async fn test_snapshot_without_connection() {
    let mount = Arc::new(RecordingMount::new(LST));
    let controller = PointingController::new(mount.clone(), ObserverSite::opd());
    assert!(matches!(
        controller.snapshot().await,
        Err(PointingError::NotConnected)
    ));
    assert!(mount.calls().is_empty());
}

#[tokio::test]
async fn test_lost_link_moves_to_disconnected() {
    let (mount, controller) = connected().await;
    mount.drop_link();
    assert!(controller.snapshot().await.is_err());
    assert_eq!(controller.state(), PointingState::Disconnected);
}

#[tokio::test]
async fn test_concurrent_abort_during_slew() {
    let (mount, controller) = connected().await;
    let controller = Arc::new(controller);
    controller.slew("05 00 00", "-30 00 00").await.unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let controller = controller.clone();
            tokio::spawn(async move { controller.abort().await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(controller.state(), PointingState::Idle);
    assert!(mount.last_abort_signal().unwrap().is_set());
}

/// Controller over a mount whose tracking command takes [`TRACKING_DELAY`].
async fn connected_slow() -> (Arc<RecordingMount>, Arc<PointingController>) {
    let mount = Arc::new(RecordingMount::new(LST));
    let slow = Arc::new(SlowTrackingMount::new(mount.clone(), TRACKING_DELAY));
    let controller = Arc::new(PointingController::new(slow, ObserverSite::opd()));
    controller.connect().await.unwrap();
    mount.clear_calls();
    (mount, controller)
}

#[tokio::test]
async fn test_snapshot_during_slew_dispatch_keeps_slewing() {
    let (_mount, controller) = connected_slow().await;

    let slewing = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.slew("05 00 00", "-30 00 00").await })
    };
    tokio::time::sleep(Duration::from_millis(30)).await;

    // The mount has not started moving yet
    let status = controller.snapshot().await.unwrap();
    assert!(!status.slewing);
    assert_eq!(status.state, PointingState::Slewing);

    let err = controller.slew("05 00 00", "-20 00 00").await.unwrap_err();
    assert!(matches!(err, PointingError::InvalidState { .. }));

    slewing.await.unwrap().unwrap();
    assert_eq!(controller.state(), PointingState::Slewing);
    assert!(controller.is_tracking());
}

#[tokio::test]
async fn test_abort_during_slew_dispatch_withdraws_motion() {
    let (mount, controller) = connected_slow().await;

    let slewing = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.slew("05 00 00", "-30 00 00").await })
    };
    tokio::time::sleep(Duration::from_millis(30)).await;
    controller.abort().await.unwrap();

    let err = slewing.await.unwrap().unwrap_err();
    assert!(matches!(err, PointingError::Interrupted));
    assert_eq!(controller.state(), PointingState::Idle);
    assert!(!controller.is_tracking());

    let position = mount.position();
    assert!(!position.slewing);
    assert!(!position.tracking);

    let calls = mount.calls();
    let slew_at = calls
        .iter()
        .position(|c| matches!(c, Call::Slew { .. }))
        .unwrap();
    assert!(calls[slew_at..].contains(&Call::AbortSlew));
    assert_eq!(calls.last(), Some(&Call::SetTracking(false)));

    // The controller accepts new work once the withdrawal is done
    controller.slew("05 00 00", "-30 00 00").await.unwrap();
    assert_eq!(controller.state(), PointingState::Slewing);
}

#[tokio::test]
async fn test_snapshot_during_abort_keeps_tracking_off() {
    let (mount, controller) = connected_slow().await;
    controller.slew("05 00 00", "-30 00 00").await.unwrap();
    mount.finish_slew();
    assert_eq!(controller.snapshot().await.unwrap().state, PointingState::Tracking);

    let aborting = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.abort().await })
    };
    tokio::time::sleep(Duration::from_millis(30)).await;

    // The mount still tracks while the stop command is in flight
    let status = controller.snapshot().await.unwrap();
    assert!(status.tracking);
    assert_eq!(status.state, PointingState::Aborting);
    assert!(!controller.is_tracking());

    aborting.await.unwrap().unwrap();
    assert_eq!(controller.state(), PointingState::Idle);
    assert!(!controller.is_tracking());
    assert!(!mount.position().tracking);

    assert!(controller.toggle_tracking().await.unwrap());
}
