//! Presentation loop.
//!
//! A fixed-period tick calls [`PointingController::snapshot`], keeps the
//! latest status in a `watch` channel and hands it to the telemetry
//! publisher on a background task, so a slow sink never delays the next tick.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::controller::PointingController;
use super::telemetry::TelemetryPublisher;
use crate::error::PointingError;
use crate::models::TelescopeStatus;

/// Handle on a running polling loop.
pub struct Poller {
    latest: watch::Receiver<Option<TelescopeStatus>>,
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Poller {
    /// Start polling `controller` every `period`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        controller: Arc<PointingController>,
        publisher: Option<TelemetryPublisher>,
        period: Duration,
    ) -> Self {
        let (latest_tx, latest) = watch::channel(None);
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            log::info!("Polling loop started (period {:?})", period);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                        continue;
                    }
                }
                poll_once(&controller, publisher.as_ref(), &latest_tx).await;
            }

            log::info!("Polling loop stopped");
        });

        Self {
            latest,
            shutdown,
            handle,
        }
    }

    /// Receiver for the most recent status; `None` while disconnected.
    pub fn subscribe(&self) -> watch::Receiver<Option<TelescopeStatus>> {
        self.latest.clone()
    }

    pub fn latest(&self) -> Option<TelescopeStatus> {
        *self.latest.borrow()
    }

    /// Stop the loop and wait for it to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.handle.await {
            log::warn!("Polling task ended abnormally: {}", e);
        }
    }
}

async fn poll_once(
    controller: &PointingController,
    publisher: Option<&TelemetryPublisher>,
    latest: &watch::Sender<Option<TelescopeStatus>>,
) {
    match controller.snapshot().await {
        Ok(status) => {
            log::debug!(
                "tick: state={} ha={:.4}h el={:.2}° az={:.2}°",
                status.state,
                status.hour_angle,
                status.elevation,
                status.azimuth
            );
            latest.send_replace(Some(status));
            if let Some(publisher) = publisher {
                // Detached; failures are logged by the publisher.
                drop(publisher.publish_in_background(status));
            }
        }
        Err(PointingError::NotConnected) => {
            latest.send_replace(None);
        }
        Err(e) => {
            latest.send_replace(None);
            log::warn!("Status poll failed: {}", e);
        }
    }
}
