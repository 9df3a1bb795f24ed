//! Mount device capability trait.
//!
//! The pointing controller only talks to hardware (or a simulator, or a test
//! double) through this trait, so drivers can be swapped without touching the
//! state machine.

use async_trait::async_trait;

use super::abort::AbortSignal;
use super::error::DeviceResult;
use crate::models::{Axis, MountPosition};

/// Abstract telescope mount.
///
/// # Thread Safety
/// Implementations must be `Send + Sync`; the controller shares one instance
/// between the polling loop and the command path.
#[async_trait]
pub trait MountDevice: Send + Sync {
    /// Human-readable driver name.
    fn name(&self) -> &str;

    /// Open the device session.
    async fn connect(&self) -> DeviceResult<()>;

    /// Close the device session.
    async fn disconnect(&self) -> DeviceResult<()>;

    fn is_connected(&self) -> bool;

    /// Read the live position and motion flags.
    async fn read_position(&self) -> DeviceResult<MountPosition>;

    /// Start a slew to (`ra_hours`, `dec_deg`) and return without waiting.
    ///
    /// Completion is observed through `read_position().slewing`. The motion
    /// routine must stop at its next check point once `abort` is set.
    async fn slew_async(&self, ra_hours: f64, dec_deg: f64, abort: AbortSignal)
        -> DeviceResult<()>;

    /// Stop any slew in progress.
    async fn abort_slew(&self) -> DeviceResult<()>;

    /// Turn sidereal tracking on or off.
    async fn set_tracking(&self, enabled: bool) -> DeviceResult<()>;

    /// Start continuous motion on `axis` at `rate` arcsec/s until [`stop_axis`](Self::stop_axis).
    async fn move_axis(&self, axis: Axis, rate: f64) -> DeviceResult<()>;

    /// Stop manual axis motion.
    async fn stop_axis(&self) -> DeviceResult<()>;
}
