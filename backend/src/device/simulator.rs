//! In-memory simulated equatorial mount.
//!
//! The simulator keeps no background task. Motion is integrated lazily from
//! the time elapsed since the previous call, so every command or position
//! read first advances the model to "now":
//!
//! - a slew moves both axes toward the target at `slew_rate_deg_per_sec`
//!   and polls the [`AbortSignal`] at each update;
//! - with tracking off the mount holds its hour angle, so right ascension
//!   drifts at the sidereal rate;
//! - a jog moves one axis at the requested rate (arcsec/s) until stopped.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::time::Instant;

use super::abort::AbortSignal;
use super::error::{DeviceError, DeviceResult};
use super::mount::MountDevice;
use crate::algorithms::horizontal::elevation_azimuth;
use crate::algorithms::sexagesimal::{hour_angle_from_ra, normalize_hours};
use crate::algorithms::sidereal::{local_sidereal_time, SIDEREAL_HOURS_PER_SECOND};
use crate::config::SimulatorSettings;
use crate::models::{Axis, MountPosition, ObserverSite};

#[derive(Debug)]
struct SlewMotion {
    target_ra: f64,
    target_dec: f64,
    abort: AbortSignal,
}

#[derive(Debug)]
struct SimState {
    connected: bool,
    reachable: bool,
    ra: f64,
    dec: f64,
    tracking: bool,
    slew: Option<SlewMotion>,
    jog: Option<(Axis, f64)>,
    last_update: Instant,
}

/// Simulated mount driven by wall-clock time.
pub struct SimulatedMount {
    site: ObserverSite,
    settings: SimulatorSettings,
    state: Mutex<SimState>,
}

/// Move `current` toward `target` by at most `step`; returns the new value and
/// whether the target was reached.
fn approach(current: f64, target: f64, step: f64) -> (f64, bool) {
    let delta = target - current;
    if delta.abs() <= step {
        (target, true)
    } else {
        (current + step * delta.signum(), false)
    }
}

impl SimulatedMount {
    pub fn new(site: ObserverSite, settings: SimulatorSettings) -> Self {
        let now = Utc::now();
        let dec = settings.park_declination.unwrap_or_else(|| site.latitude());
        let ra = local_sidereal_time(now, site.longitude());
        Self {
            site,
            settings,
            state: Mutex::new(SimState {
                connected: false,
                reachable: true,
                ra,
                dec,
                tracking: false,
                slew: None,
                jog: None,
                last_update: Instant::now(),
            }),
        }
    }

    /// Make the next `connect()` calls fail, as if the mount were unplugged.
    pub fn set_reachable(&self, reachable: bool) {
        self.state.lock().reachable = reachable;
    }

    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn advance(&self, state: &mut SimState) {
        let now = Instant::now();
        let dt = now.duration_since(state.last_update).as_secs_f64();
        state.last_update = now;
        if dt <= 0.0 {
            return;
        }

        if let Some(slew) = &state.slew {
            if slew.abort.is_set() {
                log::info!("Simulated slew interrupted by abort signal");
                state.slew = None;
            } else {
                let step_deg = self.settings.slew_rate_deg_per_sec * dt;
                // shortest way round in RA
                let mut dra = slew.target_ra - state.ra;
                if dra > 12.0 {
                    dra -= 24.0;
                } else if dra < -12.0 {
                    dra += 24.0;
                }
                let (moved_ra, ra_done) = approach(0.0, dra, step_deg / 15.0);
                let (dec, dec_done) = approach(state.dec, slew.target_dec, step_deg);
                state.ra = normalize_hours(state.ra + moved_ra);
                state.dec = dec;
                if ra_done && dec_done {
                    state.ra = slew.target_ra;
                    state.dec = slew.target_dec;
                    state.slew = None;
                    log::debug!("Simulated slew complete");
                }
            }
        } else if !state.tracking {
            state.ra = normalize_hours(state.ra + SIDEREAL_HOURS_PER_SECOND * dt);
        }

        if let Some((axis, rate)) = state.jog {
            let step_deg = rate / 3600.0 * dt;
            match axis {
                Axis::North => state.dec = (state.dec + step_deg).min(90.0),
                Axis::South => state.dec = (state.dec - step_deg).max(-90.0),
                Axis::East => state.ra = normalize_hours(state.ra + step_deg / 15.0),
                Axis::West => state.ra = normalize_hours(state.ra - step_deg / 15.0),
            }
        }
    }

    /// Lock, require a session, and bring the model up to date.
    fn with_session<T>(
        &self,
        operation: &str,
        f: impl FnOnce(&mut SimState) -> DeviceResult<T>,
    ) -> DeviceResult<T> {
        let mut state = self.state.lock();
        if !state.connected {
            return Err(DeviceError::not_connected(operation));
        }
        self.advance(&mut state);
        f(&mut state)
    }
}

#[async_trait]
impl MountDevice for SimulatedMount {
    fn name(&self) -> &str {
        "simulator"
    }

    async fn connect(&self) -> DeviceResult<()> {
        let mut state = self.state.lock();
        if !state.reachable {
            return Err(DeviceError::connection("connect", "simulated mount unreachable"));
        }
        if !state.connected {
            state.connected = true;
            state.last_update = Instant::now();
            log::info!("Simulated mount connected");
        }
        Ok(())
    }

    async fn disconnect(&self) -> DeviceResult<()> {
        let mut state = self.state.lock();
        state.connected = false;
        state.slew = None;
        state.jog = None;
        state.tracking = false;
        log::info!("Simulated mount disconnected");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.state.lock().connected
    }

    async fn read_position(&self) -> DeviceResult<MountPosition> {
        let lst = local_sidereal_time(self.now_utc(), self.site.longitude());
        self.with_session("read_position", |state| {
            let ha = hour_angle_from_ra(state.ra, lst).hours();
            let coords = elevation_azimuth(ha, state.dec, self.site.latitude())
                .map_err(|e| DeviceError::internal("read_position", e.to_string()))?;
            Ok(MountPosition {
                right_ascension: state.ra,
                declination: state.dec,
                sidereal_time: lst,
                elevation: coords.elevation,
                azimuth: coords.azimuth,
                hour_angle: ha,
                time_limit: (self.settings.meridian_limit_hours - ha).max(0.0),
                slewing: state.slew.is_some(),
                tracking: state.tracking,
            })
        })
    }

    async fn slew_async(
        &self,
        ra_hours: f64,
        dec_deg: f64,
        abort: AbortSignal,
    ) -> DeviceResult<()> {
        if !(0.0..24.0).contains(&ra_hours) || !(-90.0..=90.0).contains(&dec_deg) {
            return Err(DeviceError::command(
                "slew_async",
                format!("target out of range (ra={}, dec={})", ra_hours, dec_deg),
            ));
        }
        self.with_session("slew_async", |state| {
            state.slew = Some(SlewMotion {
                target_ra: ra_hours,
                target_dec: dec_deg,
                abort,
            });
            log::debug!("Simulated slew started to ra={} dec={}", ra_hours, dec_deg);
            Ok(())
        })
    }

    async fn abort_slew(&self) -> DeviceResult<()> {
        self.with_session("abort_slew", |state| {
            state.slew = None;
            Ok(())
        })
    }

    async fn set_tracking(&self, enabled: bool) -> DeviceResult<()> {
        self.with_session("set_tracking", |state| {
            state.tracking = enabled;
            Ok(())
        })
    }

    async fn move_axis(&self, axis: Axis, rate: f64) -> DeviceResult<()> {
        let max = self.settings.max_jog_rate;
        if !(rate.is_finite() && rate > 0.0 && rate <= max) {
            return Err(DeviceError::command(
                "move_axis",
                format!("rate {} outside (0, {}]", rate, max),
            )
            .with_axis(axis));
        }
        self.with_session("move_axis", |state| {
            state.jog = Some((axis, rate));
            Ok(())
        })
    }

    async fn stop_axis(&self) -> DeviceResult<()> {
        self.with_session("stop_axis", |state| {
            state.jog = None;
            Ok(())
        })
    }
}
