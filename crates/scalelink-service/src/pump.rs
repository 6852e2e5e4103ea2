//! Driver event dispatch.
//!
//! The pump forwards driver events to the controller in delivery order.
//! Detach and read handling runs inline to completion, so those events can
//! never reorder. Attach handling suspends (permission query, possibly the
//! resume wait), so it runs as its own task; a detach arriving while an
//! attach is still in flight is applied immediately, which deliberately
//! preserves the unserialized behavior of the original event pipeline.
//!
//! Spawning the attach handler requires its future to be `Send`, which a
//! generic driver parameter cannot promise under RPITIT; the pump therefore
//! dispatches through the concrete [`AnyScaleDriver`] and
//! [`AnyHostLifecycle`] wrappers.

use crate::controller::ScaleConnectionController;
use scalelink_driver::ScaleEvent;
use scalelink_driver::devices::{AnyHostLifecycle, AnyScaleDriver};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Spawn the event pump over a driver event channel.
///
/// Runs until the sending side of the channel is dropped.
///
/// # Examples
///
/// ```no_run
/// use scalelink_driver::devices::{AnyHostLifecycle, AnyScaleDriver};
/// use scalelink_driver::mock::{MockHostLifecycle, MockScaleDriver};
/// use scalelink_service::{ScaleConnectionController, spawn_event_pump};
///
/// # #[tokio::main]
/// # async fn main() {
/// let (driver, _scale, events) = MockScaleDriver::new();
/// let (lifecycle, _host) = MockHostLifecycle::new();
///
/// let controller = ScaleConnectionController::new(
///     AnyScaleDriver::Mock(driver),
///     AnyHostLifecycle::Mock(lifecycle),
/// );
/// let pump = spawn_event_pump(controller, events);
/// # pump.abort();
/// # }
/// ```
pub fn spawn_event_pump(
    controller: ScaleConnectionController<AnyScaleDriver, AnyHostLifecycle>,
    mut events: mpsc::Receiver<ScaleEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                ScaleEvent::Attached { device } => {
                    // Suspends on permission/resume; must not hold up
                    // detach and read dispatch.
                    let controller = controller.clone();
                    tokio::spawn(async move {
                        controller.handle_attached(device).await;
                    });
                }
                ScaleEvent::Detached => controller.handle_detached(),
                ScaleEvent::Read(sample) => controller.handle_read(sample),
                _ => {}
            }
        }
        debug!("scale event channel closed, pump exiting");
    })
}
