//! Enum wrappers for driver dispatch.
//!
//! Native `async fn` in traits (RPITIT, Rust Edition 2024) are not
//! object-safe, so the driver cannot be boxed as `dyn ScaleDriver`, and a
//! generic driver parameter cannot be spawned onto the runtime because its
//! method futures carry no provable `Send` bound. The enum wrappers here
//! provide concrete type dispatch instead: monomorphized at compile time,
//! `Send`-inferable, and extensible through feature-gated variants.
//!
//! # Examples
//!
//! ```
//! use scalelink_driver::devices::AnyScaleDriver;
//! use scalelink_driver::mock::MockScaleDriver;
//!
//! let (driver, _handle, _events) = MockScaleDriver::new();
//! let any_driver = AnyScaleDriver::Mock(driver);
//!
//! // Can now be used polymorphically through the ScaleDriver trait
//! ```

use crate::mock::{MockHostLifecycle, MockScaleDriver};
use crate::traits::{HostLifecycle, ScaleDriver};
use crate::Result;
use scalelink_core::DeviceId;
use tokio::sync::broadcast;

/// Enum wrapper for scale driver dispatch.
///
/// # Examples
///
/// ```
/// use scalelink_core::DeviceId;
/// use scalelink_driver::devices::AnyScaleDriver;
/// use scalelink_driver::mock::MockScaleDriver;
/// use scalelink_driver::traits::ScaleDriver;
///
/// #[tokio::main]
/// async fn main() -> scalelink_driver::Result<()> {
///     let (driver, handle, _events) = MockScaleDriver::new();
///     let mut any_driver = AnyScaleDriver::Mock(driver);
///
///     let device = DeviceId::new("usb-0922").unwrap();
///     handle.set_permission(device.clone(), true);
///     assert!(any_driver.has_permission(&device).await?);
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyScaleDriver {
    /// Mock scale for development and testing.
    Mock(MockScaleDriver),
    // TODO: Usb(UsbScaleDriver) and Hid(HidScaleDriver) variants behind the
    // driver-usb / driver-hid features once real transports land
}

impl ScaleDriver for AnyScaleDriver {
    async fn open(&mut self, device: Option<&DeviceId>) -> Result<()> {
        match self {
            Self::Mock(driver) => driver.open(device).await,
        }
    }

    async fn close(&mut self) -> Result<()> {
        match self {
            Self::Mock(driver) => driver.close().await,
        }
    }

    async fn has_permission(&self, device: &DeviceId) -> Result<bool> {
        match self {
            Self::Mock(driver) => driver.has_permission(device).await,
        }
    }
}

/// Enum wrapper for host lifecycle dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyHostLifecycle {
    /// Mock lifecycle source for development and testing.
    Mock(MockHostLifecycle),
}

impl HostLifecycle for AnyHostLifecycle {
    fn subscribe_resume(&self) -> broadcast::Receiver<()> {
        match self {
            Self::Mock(lifecycle) => lifecycle.subscribe_resume(),
        }
    }
}
