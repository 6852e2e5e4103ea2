//! Driver boundary for the scalelink USB scale connection layer.
//!
//! This crate defines the trait boundary between the connection controller
//! and its two external collaborators: the native USB scale driver and the
//! host application's lifecycle source. It also carries the event types the
//! driver pushes upstream and mock implementations for development and
//! testing without physical hardware.
//!
//! # Design Philosophy
//!
//! - **Async-first**: all driver commands are asynchronous using native
//!   `async fn` in traits (Edition 2024 RPITIT).
//! - **Push-based events**: the driver delivers attach/detach/read events
//!   over a channel; nothing in this layer polls the hardware.
//! - **Thread-safe**: traits require `Send + Sync` for use with Tokio.
//! - **Error-aware**: every command returns `Result<T>` with a detailed
//!   [`DriverError`].
//!
//! # Boundaries
//!
//! [`ScaleDriver`] is the outbound command surface (`open`, `close`,
//! `has_permission`). [`HostLifecycle`] exposes the host's resume signal as
//! a broadcast subscription; dropping the receiver unsubscribes, which is
//! how one-shot resume waiters are expressed.
//!
//! # Mock Implementations
//!
//! [`mock::MockScaleDriver`] and [`mock::MockHostLifecycle`] simulate both
//! collaborators with programmable control handles:
//!
//! ```
//! use scalelink_core::{DeviceId, ScaleStatus};
//! use scalelink_driver::ScaleDriver;
//! use scalelink_driver::mock::MockScaleDriver;
//!
//! #[tokio::main]
//! async fn main() -> scalelink_driver::Result<()> {
//!     let (mut driver, handle, _events) = MockScaleDriver::new();
//!
//!     let device = DeviceId::new("usb-0922").unwrap();
//!     handle.set_permission(device.clone(), true);
//!
//!     assert!(driver.has_permission(&device).await?);
//!     driver.open(Some(&device)).await?;
//!     assert_eq!(handle.open_count(), 1);
//!
//!     Ok(())
//! }
//! ```

pub mod devices;
pub mod error;
pub mod events;
pub mod mock;
pub mod traits;

// Re-export commonly used types for convenience
pub use error::{DriverError, Result};
pub use events::{ReadSample, ScaleEvent};
pub use traits::{HostLifecycle, ScaleDriver};
