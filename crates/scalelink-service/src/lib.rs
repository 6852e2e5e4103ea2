//! Connection lifecycle service for a USB-attached weighing scale.
//!
//! This crate hosts the [`ScaleConnectionController`], which sits between
//! the push-based driver event source and the application's observers. It
//! owns the connection state, the last weight reading and its validity
//! classification, implements the `connect`/`disconnect` command surface,
//! and runs the resume-gated permission retry that fires when a scale is
//! attached before the OS has granted device access.
//!
//! # Wiring
//!
//! ```no_run
//! use scalelink_driver::devices::{AnyHostLifecycle, AnyScaleDriver};
//! use scalelink_driver::mock::{MockHostLifecycle, MockScaleDriver};
//! use scalelink_service::{ScaleConnectionController, spawn_event_pump};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (driver, scale, events) = MockScaleDriver::new();
//!     let (lifecycle, _host) = MockHostLifecycle::new();
//!
//!     let controller = ScaleConnectionController::new(
//!         AnyScaleDriver::Mock(driver),
//!         AnyHostLifecycle::Mock(lifecycle),
//!     );
//!     controller.register_connection_observer(|connected| {
//!         println!("scale connected: {connected}");
//!     });
//!
//!     let pump = spawn_event_pump(controller.clone(), events);
//!
//!     // ... the scale handle (or a real driver) now feeds events ...
//!     drop(scale);
//!     pump.await.unwrap();
//! }
//! ```

pub mod controller;
pub mod pump;

pub use controller::{ConnectionObserver, ReadObserver, ScaleConnectionController};
pub use pump::spawn_event_pump;
