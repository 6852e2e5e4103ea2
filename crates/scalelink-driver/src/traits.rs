//! Trait definitions for the driver and host lifecycle boundaries.
//!
//! These traits establish the contract between the connection controller and
//! the native collaborators it drives: the USB scale driver and the host
//! application's lifecycle signal source. They enable substitution between
//! mock implementations and real platform drivers.
//!
//! All driver commands use native `async fn` methods (Edition 2024 RPITIT),
//! eliminating the need for the `async_trait` macro.

#![allow(async_fn_in_trait)]

use crate::error::Result;
use scalelink_core::DeviceId;
use tokio::sync::broadcast;

/// USB scale driver abstraction.
///
/// The outbound command surface of the native driver. Each command is an
/// asynchronous call that may fail; the driver's push events (attach,
/// detach, read) travel separately as [`ScaleEvent`](crate::ScaleEvent)s.
///
/// # Object Safety and Dynamic Dispatch
///
/// **NOTE**: This trait is NOT object-safe because `async fn` methods return
/// `impl Future` (Edition 2024 RPITIT). Use generic type parameters:
///
/// ```no_run
/// use scalelink_core::DeviceId;
/// use scalelink_driver::{Result, ScaleDriver};
///
/// async fn open_if_permitted<D: ScaleDriver>(
///     driver: &mut D,
///     device: &DeviceId,
/// ) -> Result<bool> {
///     if driver.has_permission(device).await? {
///         driver.open(Some(device)).await?;
///         return Ok(true);
///     }
///     Ok(false)
/// }
/// ```
pub trait ScaleDriver: Send + Sync {
    /// Open the given device, or a driver-chosen default when omitted.
    ///
    /// # Errors
    ///
    /// Returns `DriverError::DeviceOpen` if the driver refuses or fails to
    /// open the device (missing permission, device gone, exclusive access
    /// held elsewhere).
    async fn open(&mut self, device: Option<&DeviceId>) -> Result<()>;

    /// Close the currently open device.
    ///
    /// Close is best-effort: callers tolerate failures and a close against
    /// an already-closed device is allowed.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver reports a failure while tearing down
    /// the device handle.
    async fn close(&mut self) -> Result<()>;

    /// Query whether the OS has granted access to the given device.
    ///
    /// A denied permission is a normal `Ok(false)` return; it drives the
    /// controller's resume-gated retry rather than an error path.
    ///
    /// # Errors
    ///
    /// Returns `DriverError::PermissionQuery` only when the query itself
    /// cannot be performed.
    async fn has_permission(&self, device: &DeviceId) -> Result<bool>;
}

/// Host application lifecycle signal source.
///
/// Exposes the foreground-resume signal as a broadcast subscription. The OS
/// permission prompt is resolved outside the application; regaining
/// foreground focus is the only observable app-side signal that it was
/// dismissed, so permission retries are gated on this subscription.
///
/// Dropping the returned receiver unsubscribes. A one-shot waiter receives
/// a single signal and drops its receiver before acting, guaranteeing it
/// cannot fire twice on rapid repeated resumes.
pub trait HostLifecycle: Send + Sync {
    /// Subscribe to foreground-resume signals.
    ///
    /// Every call returns an independent receiver; signals fired before the
    /// subscription are not replayed.
    fn subscribe_resume(&self) -> broadcast::Receiver<()>;
}
