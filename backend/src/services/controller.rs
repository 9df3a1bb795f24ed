//! Pointing controller.
//!
//! Owns the [`PointingState`] machine and the shared [`AbortSignal`], and is
//! the only component that issues motion commands to the [`MountDevice`].
//!
//! ```text
//!               connect()                 slew() ok
//! Disconnected ───────────► Idle ─────────────────────► Slewing
//!      ▲                    ▲  ▲                           │
//!      │ disconnect()       │  │ abort()                   │ device reports
//!      │ (from any state)   │  └──── Aborting ◄────────────┤ slew complete
//!      │                    │                              ▼
//!      │                    └────── tracking off ◄───── Tracking
//! ```
//!
//! The internal lock is held only while deciding a transition; it is always
//! released before awaiting the device.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::algorithms::{equatorial_to_horizontal, is_well_formed, sexagesimal_to_decimal};
use crate::device::{AbortSignal, DeviceError, MountDevice};
use crate::error::{PointingError, PointingResult};
use crate::models::{AngleUnit, Axis, ObserverSite, PointingState, TelescopeStatus};

/// Accepted slew target, returned once the motion has been dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlewTarget {
    pub right_ascension: f64,
    pub declination: f64,
    pub hour_angle: f64,
    pub elevation: f64,
    pub azimuth: f64,
}

#[derive(Debug)]
struct ControllerInner {
    state: PointingState,
    /// Last known sidereal tracking flag.
    tracking: bool,
    active_jog: Option<Axis>,
    /// Bumped on every transition; a snapshot only reconciles if it is unchanged.
    epoch: u64,
    /// A slew has been accepted and its device commands are still in flight.
    dispatching: bool,
}

impl ControllerInner {
    fn transition(&mut self, to: PointingState, reason: &str) {
        if self.state != to {
            log::info!("Pointing state {} -> {} ({})", self.state, to, reason);
            self.state = to;
        }
        self.epoch = self.epoch.wrapping_add(1);
    }
}

/// Serialized owner of the pointing state machine.
pub struct PointingController {
    device: Arc<dyn MountDevice>,
    site: ObserverSite,
    abort: AbortSignal,
    inner: Mutex<ControllerInner>,
}

impl PointingController {
    pub fn new(device: Arc<dyn MountDevice>, site: ObserverSite) -> Self {
        Self {
            device,
            site,
            abort: AbortSignal::new(),
            inner: Mutex::new(ControllerInner {
                state: PointingState::Disconnected,
                tracking: false,
                active_jog: None,
                epoch: 0,
                dispatching: false,
            }),
        }
    }

    pub fn state(&self) -> PointingState {
        self.inner.lock().state
    }

    /// Last tracking flag seen by the controller.
    pub fn is_tracking(&self) -> bool {
        self.inner.lock().tracking
    }

    pub fn active_jog(&self) -> Option<Axis> {
        self.inner.lock().active_jog
    }

    pub fn abort_signal(&self) -> &AbortSignal {
        &self.abort
    }

    pub fn site(&self) -> &ObserverSite {
        &self.site
    }

    pub fn device(&self) -> &Arc<dyn MountDevice> {
        &self.device
    }

    /// Open the device session. Connecting an already connected controller is a no-op.
    pub async fn connect(&self) -> PointingResult<()> {
        if self.state().is_connected() {
            log::debug!("connect() ignored, already connected");
            return Ok(());
        }

        self.device.connect().await?;

        let mut inner = self.inner.lock();
        inner.tracking = false;
        inner.active_jog = None;
        inner.transition(PointingState::Idle, "device connected");
        Ok(())
    }

    /// Close the device session. Any motion routine still running is told to stop.
    pub async fn disconnect(&self) -> PointingResult<()> {
        self.abort.set();
        {
            let mut inner = self.inner.lock();
            inner.tracking = false;
            inner.active_jog = None;
            inner.transition(PointingState::Disconnected, "disconnect requested");
        }
        self.device.disconnect().await?;
        Ok(())
    }

    /// Validate a sexagesimal target, apply the horizon guard and dispatch the slew.
    ///
    /// Returns as soon as the device accepted the command; completion is
    /// observed through [`snapshot`](Self::snapshot).
    ///
    /// # Errors
    /// - `InvalidCoordinate` for malformed or out-of-range input (device untouched)
    /// - `NotConnected` / `InvalidState` when the current state refuses slews
    /// - `BelowHorizon` when the target elevation is outside `(0, 90]`
    /// - `Device` when the mount rejects the command (controller reverts to `Idle`)
    /// - `Interrupted` when an abort or disconnect arrived during dispatch; the
    ///   motion is withdrawn and tracking switched off
    pub async fn slew(&self, ra_input: &str, dec_input: &str) -> PointingResult<SlewTarget> {
        if !is_well_formed(ra_input) {
            return Err(PointingError::InvalidCoordinate(format!(
                "right ascension '{}' is not 'H M S'",
                ra_input.trim()
            )));
        }
        if !is_well_formed(dec_input) {
            return Err(PointingError::InvalidCoordinate(format!(
                "declination '{}' is not 'D M S'",
                dec_input.trim()
            )));
        }

        let ra = sexagesimal_to_decimal(ra_input, AngleUnit::Hours)?.value();
        let dec = sexagesimal_to_decimal(dec_input, AngleUnit::Degrees)?.value();
        if !(0.0..24.0).contains(&ra) {
            return Err(PointingError::InvalidCoordinate(format!(
                "right ascension {:.6}h outside [0, 24)",
                ra
            )));
        }
        if !(-90.0..=90.0).contains(&dec) {
            return Err(PointingError::InvalidCoordinate(format!(
                "declination {:.6}° outside [-90, 90]",
                dec
            )));
        }

        self.check_accepts("slew")?;

        let position = match self.device.read_position().await {
            Ok(position) => position,
            Err(err) => return Err(self.revert_after_failure("slew", err)),
        };
        let (ha, coords) = equatorial_to_horizontal(ra, dec, position.sidereal_time, &self.site)?;
        let ha = ha.hours();
        if !coords.is_above_horizon() {
            log::warn!(
                "Rejected slew to ra={:.4}h dec={:.4}°: elevation {:.2}°",
                ra,
                dec,
                coords.elevation
            );
            return Err(PointingError::BelowHorizon {
                elevation: coords.elevation,
            });
        }

        {
            let mut inner = self.inner.lock();
            // Re-check: the state may have moved while the position was read.
            refuse_in(inner.state, "slew")?;
            if inner.dispatching {
                return Err(PointingError::InvalidState {
                    state: inner.state,
                    command: "slew",
                });
            }
            self.abort.clear();
            inner.tracking = true;
            inner.dispatching = true;
            inner.transition(PointingState::Slewing, "slew accepted");
        }

        let dispatched = async {
            self.device.set_tracking(true).await?;
            self.device.slew_async(ra, dec, self.abort.clone()).await
        }
        .await;

        let interrupted = dispatched.is_ok() && {
            let inner = self.inner.lock();
            inner.state != PointingState::Slewing || self.abort.is_set()
        };
        if interrupted {
            self.withdraw_slew().await;
        }
        {
            let mut inner = self.inner.lock();
            inner.dispatching = false;
            inner.epoch = inner.epoch.wrapping_add(1);
            if interrupted {
                inner.tracking = false;
            }
        }

        match dispatched {
            Ok(()) if interrupted => {
                log::warn!(
                    "Slew to ra={:.4}h dec={:.4}° withdrawn, stop requested during dispatch",
                    ra,
                    dec
                );
                Err(PointingError::Interrupted)
            }
            Ok(()) => {
                log::info!(
                    "Slewing to ra={:.4}h dec={:.4}° (ha={:.4}h el={:.2}° az={:.2}°)",
                    ra,
                    dec,
                    ha,
                    coords.elevation,
                    coords.azimuth
                );
                Ok(SlewTarget {
                    right_ascension: ra,
                    declination: dec,
                    hour_angle: ha,
                    elevation: coords.elevation,
                    azimuth: coords.azimuth,
                })
            }
            Err(err) => Err(self.revert_after_failure("slew", err)),
        }
    }

    /// Undo a slew whose dispatch raced with an abort or disconnect.
    async fn withdraw_slew(&self) {
        if let Err(err) = self.device.abort_slew().await {
            log::debug!("abort_slew while withdrawing slew: {}", err);
        }
        if let Err(err) = self.device.set_tracking(false).await {
            log::debug!("set_tracking(false) while withdrawing slew: {}", err);
        }
    }

    /// Stop everything. Idempotent and safe to call from any context.
    ///
    /// The abort signal is set first so a motion routine running elsewhere
    /// stops at its next check point. Calling `abort` while disconnected, or
    /// while already idle with nothing moving, only sets the signal.
    pub async fn abort(&self) -> PointingResult<()> {
        self.abort.set();

        let (previous, was_tracking, jog) = {
            let mut inner = self.inner.lock();
            match inner.state {
                PointingState::Disconnected => return Ok(()),
                PointingState::Idle if !inner.tracking && inner.active_jog.is_none() => {
                    log::debug!("abort() with nothing in motion");
                    return Ok(());
                }
                _ => {}
            }
            let previous = inner.state;
            let was_tracking = inner.tracking;
            let jog = inner.active_jog.take();
            inner.tracking = false;
            inner.transition(PointingState::Aborting, "abort requested");
            (previous, was_tracking, jog)
        };

        let result = async {
            if previous == PointingState::Slewing || previous == PointingState::Aborting {
                self.device.abort_slew().await?;
            }
            if jog.is_some() {
                self.device.stop_axis().await?;
            }
            if was_tracking {
                self.device.set_tracking(false).await?;
            }
            Ok::<(), DeviceError>(())
        }
        .await;

        let mut inner = self.inner.lock();
        if inner.state == PointingState::Aborting {
            inner.tracking = false;
            inner.transition(PointingState::Idle, "abort complete");
        }
        drop(inner);

        result.map_err(|err| {
            log::warn!("Abort did not complete cleanly: {}", err);
            PointingError::from(err)
        })
    }

    /// Turn sidereal tracking on or off. The pointing state is kept, except
    /// that disabling tracking while `Tracking` returns to `Idle`.
    pub async fn set_track(&self, enabled: bool) -> PointingResult<()> {
        self.check_accepts("change tracking")?;

        if let Err(err) = self.device.set_tracking(enabled).await {
            return Err(self.revert_after_failure("set_tracking", err));
        }

        let mut inner = self.inner.lock();
        inner.tracking = enabled;
        if !enabled && inner.state == PointingState::Tracking {
            inner.transition(PointingState::Idle, "tracking disabled");
        }
        log::info!("Tracking {}", if enabled { "enabled" } else { "disabled" });
        Ok(())
    }

    /// Flip the tracking flag; returns the new value.
    pub async fn toggle_tracking(&self) -> PointingResult<bool> {
        let enabled = !self.is_tracking();
        self.set_track(enabled).await?;
        Ok(enabled)
    }

    /// Start continuous motion on `axis` at `rate` arcsec/s.
    ///
    /// Motion continues until [`stop_jog`](Self::stop_jog); there is no timeout.
    pub async fn jog(&self, axis: Axis, rate: f64) -> PointingResult<()> {
        if !(rate.is_finite() && rate > 0.0) {
            return Err(PointingError::Domain(format!("jog rate {} must be positive", rate)));
        }
        self.check_accepts("jog")?;

        if let Err(err) = self.device.move_axis(axis, rate).await {
            return Err(self.revert_after_failure("jog", err));
        }
        self.inner.lock().active_jog = Some(axis);
        log::debug!("Jogging {} at {} arcsec/s", axis, rate);
        Ok(())
    }

    /// Stop manual axis motion started by [`jog`](Self::jog).
    pub async fn stop_jog(&self) -> PointingResult<()> {
        if !self.state().is_connected() {
            return Err(PointingError::NotConnected);
        }
        if let Err(err) = self.device.stop_axis().await {
            return Err(self.revert_after_failure("stop_jog", err));
        }
        if let Some(axis) = self.inner.lock().active_jog.take() {
            log::debug!("Stopped jogging {}", axis);
        }
        Ok(())
    }

    /// Read the device and build a fresh status.
    ///
    /// Hour angle, elevation and azimuth are recomputed on every call from
    /// the device's RA, declination and sidereal time.
    pub async fn snapshot(&self) -> PointingResult<TelescopeStatus> {
        let epoch = {
            let inner = self.inner.lock();
            if inner.state == PointingState::Disconnected {
                return Err(PointingError::NotConnected);
            }
            inner.epoch
        };

        let position = match self.device.read_position().await {
            Ok(position) => position,
            Err(err) => {
                if !self.device.is_connected() {
                    let mut inner = self.inner.lock();
                    inner.tracking = false;
                    inner.active_jog = None;
                    inner.transition(PointingState::Disconnected, "device lost");
                }
                return Err(err.into());
            }
        };

        let (ha, coords) = equatorial_to_horizontal(
            position.right_ascension,
            position.declination,
            position.sidereal_time,
            &self.site,
        )?;
        let ha = ha.hours();

        let state = {
            let mut inner = self.inner.lock();
            let settled = inner.epoch == epoch
                && !inner.dispatching
                && inner.state != PointingState::Aborting;
            if settled {
                inner.tracking = position.tracking;
                match inner.state {
                    PointingState::Slewing if !position.slewing => {
                        let to = if position.tracking {
                            PointingState::Tracking
                        } else {
                            PointingState::Idle
                        };
                        inner.transition(to, "slew complete");
                    }
                    PointingState::Tracking if !position.tracking => {
                        inner.transition(PointingState::Idle, "device stopped tracking");
                    }
                    _ => {}
                }
            }
            inner.state
        };

        Ok(TelescopeStatus {
            right_ascension: position.right_ascension,
            declination: position.declination,
            sidereal_time: position.sidereal_time,
            hour_angle: ha,
            elevation: coords.elevation,
            azimuth: coords.azimuth,
            time_limit: position.time_limit,
            slewing: position.slewing,
            tracking: position.tracking,
            connected: state.is_connected(),
            state,
        })
    }

    fn check_accepts(&self, command: &'static str) -> PointingResult<()> {
        refuse_in(self.inner.lock().state, command)
    }

    /// Put the controller back into a known state after a device failure.
    fn revert_after_failure(&self, command: &str, err: DeviceError) -> PointingError {
        let connected = self.device.is_connected();
        let mut inner = self.inner.lock();
        inner.active_jog = None;
        if !connected {
            inner.tracking = false;
            inner.transition(PointingState::Disconnected, "device lost");
        } else if inner.state != PointingState::Disconnected {
            inner.transition(PointingState::Idle, "device command failed");
        }
        log::warn!("{} failed: {}", command, err);
        err.into()
    }
}

/// States in which a motion command is refused.
fn refuse_in(state: PointingState, command: &'static str) -> PointingResult<()> {
    match state {
        PointingState::Disconnected => Err(PointingError::NotConnected),
        PointingState::Aborting => Err(PointingError::InvalidState { state, command }),
        PointingState::Slewing if command == "slew" => {
            Err(PointingError::InvalidState { state, command })
        }
        _ => Ok(()),
    }
}
