#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use opd_telescope::device::{AbortSignal, DeviceError, DeviceResult, MountDevice};
use opd_telescope::models::{Axis, MountPosition};

/// Latitude of the default site, degrees.
pub const OPD_LATITUDE_DEG: f64 = -(22.0 + 32.0 / 60.0 + 4.0 / 3600.0);

/// Device operation seen by [`RecordingMount`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Connect,
    Disconnect,
    ReadPosition,
    Slew { ra: f64, dec: f64 },
    AbortSlew,
    SetTracking(bool),
    MoveAxis(Axis, f64),
    StopAxis,
}

impl Call {
    pub fn is_motion(&self) -> bool {
        matches!(
            self,
            Call::Slew { .. }
                | Call::AbortSlew
                | Call::SetTracking(_)
                | Call::MoveAxis(..)
                | Call::StopAxis
        )
    }
}

struct Recorded {
    connected: bool,
    position: MountPosition,
    calls: Vec<Call>,
    failing: HashSet<&'static str>,
    abort: Option<AbortSignal>,
}

/// Scripted mount double that records every call.
///
/// Slews never finish on their own; call [`finish_slew`](Self::finish_slew).
/// The derived fields it reports are deliberately wrong so tests can check
/// that callers recompute them.
pub struct RecordingMount {
    inner: Mutex<Recorded>,
}

impl RecordingMount {
    /// Mount pointing at the meridian, at the zenith of the default site.
    pub fn new(sidereal_time: f64) -> Self {
        Self {
            inner: Mutex::new(Recorded {
                connected: false,
                position: MountPosition {
                    right_ascension: sidereal_time,
                    declination: OPD_LATITUDE_DEG,
                    sidereal_time,
                    elevation: -99.0,
                    azimuth: -99.0,
                    hour_angle: 99.0,
                    time_limit: 2.5,
                    slewing: false,
                    tracking: false,
                },
                calls: Vec::new(),
                failing: HashSet::new(),
                abort: None,
            }),
        }
    }

    /// Make `operation` (trait method name) fail from now on.
    pub fn fail(&self, operation: &'static str) {
        self.inner.lock().failing.insert(operation);
    }

    pub fn heal(&self, operation: &'static str) {
        self.inner.lock().failing.remove(operation);
    }

    pub fn set_position(&self, f: impl FnOnce(&mut MountPosition)) {
        f(&mut self.inner.lock().position);
    }

    /// Current device-side position, without recording a call.
    pub fn position(&self) -> MountPosition {
        self.inner.lock().position
    }

    /// Simulate the end of a slew.
    pub fn finish_slew(&self) {
        self.inner.lock().position.slewing = false;
    }

    /// Simulate a dropped link.
    pub fn drop_link(&self) {
        self.inner.lock().connected = false;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().calls.clone()
    }

    pub fn motion_calls(&self) -> usize {
        self.inner.lock().calls.iter().filter(|c| c.is_motion()).count()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().calls.clear();
    }

    /// Abort signal handed over with the last slew.
    pub fn last_abort_signal(&self) -> Option<AbortSignal> {
        self.inner.lock().abort.clone()
    }

    fn record(&self, operation: &'static str, call: Call) -> DeviceResult<parking_lot::MutexGuard<'_, Recorded>> {
        let mut inner = self.inner.lock();
        inner.calls.push(call);
        if inner.failing.contains(operation) {
            return Err(DeviceError::command(operation, "scripted failure"));
        }
        if operation != "connect" && !inner.connected {
            return Err(DeviceError::not_connected(operation));
        }
        Ok(inner)
    }
}

#[async_trait]
impl MountDevice for RecordingMount {
    fn name(&self) -> &str {
        "recording"
    }

    async fn connect(&self) -> DeviceResult<()> {
        self.record("connect", Call::Connect)?.connected = true;
        Ok(())
    }

    async fn disconnect(&self) -> DeviceResult<()> {
        let mut inner = self.inner.lock();
        inner.calls.push(Call::Disconnect);
        inner.connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.inner.lock().connected
    }

    async fn read_position(&self) -> DeviceResult<MountPosition> {
        Ok(self.record("read_position", Call::ReadPosition)?.position)
    }

    async fn slew_async(&self, ra_hours: f64, dec_deg: f64, abort: AbortSignal) -> DeviceResult<()> {
        let mut inner = self.record(
            "slew_async",
            Call::Slew {
                ra: ra_hours,
                dec: dec_deg,
            },
        )?;
        inner.position.right_ascension = ra_hours;
        inner.position.declination = dec_deg;
        inner.position.slewing = true;
        inner.abort = Some(abort);
        Ok(())
    }

    async fn abort_slew(&self) -> DeviceResult<()> {
        self.record("abort_slew", Call::AbortSlew)?.position.slewing = false;
        Ok(())
    }

    async fn set_tracking(&self, enabled: bool) -> DeviceResult<()> {
        self.record("set_tracking", Call::SetTracking(enabled))?
            .position
            .tracking = enabled;
        Ok(())
    }

    async fn move_axis(&self, axis: Axis, rate: f64) -> DeviceResult<()> {
        self.record("move_axis", Call::MoveAxis(axis, rate))?;
        Ok(())
    }

    async fn stop_axis(&self) -> DeviceResult<()> {
        self.record("stop_axis", Call::StopAxis)?;
        Ok(())
    }
}

/// Mount whose `set_tracking` takes `delay` before reaching the wrapped
/// [`RecordingMount`]. Calls are recorded when they land, not when issued.
pub struct SlowTrackingMount {
    mount: Arc<RecordingMount>,
    delay: Duration,
}

impl SlowTrackingMount {
    pub fn new(mount: Arc<RecordingMount>, delay: Duration) -> Self {
        Self { mount, delay }
    }
}

#[async_trait]
impl MountDevice for SlowTrackingMount {
    fn name(&self) -> &str {
        "slow-tracking"
    }

    async fn connect(&self) -> DeviceResult<()> {
        self.mount.connect().await
    }

    async fn disconnect(&self) -> DeviceResult<()> {
        self.mount.disconnect().await
    }

    fn is_connected(&self) -> bool {
        self.mount.is_connected()
    }

    async fn read_position(&self) -> DeviceResult<MountPosition> {
        self.mount.read_position().await
    }

    async fn slew_async(&self, ra_hours: f64, dec_deg: f64, abort: AbortSignal) -> DeviceResult<()> {
        self.mount.slew_async(ra_hours, dec_deg, abort).await
    }

    async fn abort_slew(&self) -> DeviceResult<()> {
        self.mount.abort_slew().await
    }

    async fn set_tracking(&self, enabled: bool) -> DeviceResult<()> {
        tokio::time::sleep(self.delay).await;
        self.mount.set_tracking(enabled).await
    }

    async fn move_axis(&self, axis: Axis, rate: f64) -> DeviceResult<()> {
        self.mount.move_axis(axis, rate).await
    }

    async fn stop_axis(&self) -> DeviceResult<()> {
        self.mount.stop_axis().await
    }
}

static ENV_LOCK: StdMutex<()> = StdMutex::new(());

/// Runs `f` with environment variables temporarily set (`Some`) or removed (`None`).
///
/// Serialized across tests and restored on unwind.
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _restore = RestoreEnv::apply(changes);
    f()
}

struct RestoreEnv {
    previous: Vec<(String, Option<String>)>,
}

impl RestoreEnv {
    fn apply(changes: &[(&str, Option<&str>)]) -> Self {
        let previous = changes
            .iter()
            .map(|(k, _)| (k.to_string(), std::env::var(k).ok()))
            .collect();
        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }
        Self { previous }
    }
}

impl Drop for RestoreEnv {
    fn drop(&mut self) {
        for (k, v) in self.previous.drain(..).rev() {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}
