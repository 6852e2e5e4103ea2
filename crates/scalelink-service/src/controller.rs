//! Scale connection controller.
//!
//! The controller owns the observable state of the single attached scale:
//! whether a device is open, the last weight reading, and the derived
//! validity classification. Driver events mutate that state; registered
//! observers are notified on every change and immediately upon
//! registration.
//!
//! # Permission retry
//!
//! When a scale is attached before the OS has granted device access, the
//! attach handler parks on a one-shot subscription to the host's
//! foreground-resume signal: the permission prompt is resolved outside the
//! application, and regaining focus is the only observable sign that it was
//! dismissed. On resume the subscription is dropped first (so a second
//! resume cannot re-fire the waiter), permission is re-queried once, and
//! the attempt is either completed or abandoned. There is no polling and no
//! retry loop.
//!
//! # Sharing model
//!
//! The controller is a cheap-clone handle: its fields live behind an
//! `Arc<Mutex<_>>` so the resume waiter can run as its own task while the
//! event pump keeps dispatching. The inner lock is never held across an
//! await point, and observer callbacks are invoked after it is released;
//! callbacks may read the accessors but must not call back into the
//! command surface.

use chrono::{DateTime, Utc};
use scalelink_core::{DeviceId, ScaleStatus, WeightReading};
use scalelink_driver::{HostLifecycle, ReadSample, Result, ScaleDriver};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

/// Read observer callback: `(is_valid, status, weight)`.
pub type ReadObserver = Arc<dyn Fn(bool, Option<ScaleStatus>, f64) + Send + Sync>;

/// Connection observer callback: `(connected)`.
pub type ConnectionObserver = Arc<dyn Fn(bool) + Send + Sync>;

/// Mutable controller state. Sole mutator is the controller itself.
struct ControllerState {
    connected: bool,
    reading: WeightReading,
    last_read_at: Option<DateTime<Utc>>,
    read_observer: Option<ReadObserver>,
    connection_observer: Option<ConnectionObserver>,
}

impl ControllerState {
    fn new() -> Self {
        Self {
            connected: false,
            reading: WeightReading::default(),
            last_read_at: None,
            read_observer: None,
            connection_observer: None,
        }
    }

    /// Reset to the disconnected snapshot: no status, zero weight.
    fn reset(&mut self) {
        self.connected = false;
        self.reading = WeightReading::default();
        self.last_read_at = None;
    }
}

/// Connection lifecycle controller for a single USB scale.
///
/// Translates driver events (attach, detach, read) into a consistent
/// observable connection state plus a validated weight reading, and issues
/// `open`/`close` commands to the driver on behalf of the application.
///
/// Constructed once per application session and cloned wherever a handle
/// is needed; all clones share the same state.
pub struct ScaleConnectionController<D, L> {
    state: Arc<Mutex<ControllerState>>,
    driver: Arc<tokio::sync::Mutex<D>>,
    lifecycle: Arc<L>,
}

impl<D, L> Clone for ScaleConnectionController<D, L> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            driver: Arc::clone(&self.driver),
            lifecycle: Arc::clone(&self.lifecycle),
        }
    }
}

impl<D, L> ScaleConnectionController<D, L>
where
    D: ScaleDriver,
    L: HostLifecycle,
{
    /// Create a controller over the given driver and lifecycle source.
    ///
    /// Initial state is disconnected with the default (invalid) reading.
    pub fn new(driver: D, lifecycle: L) -> Self {
        Self {
            state: Arc::new(Mutex::new(ControllerState::new())),
            driver: Arc::new(tokio::sync::Mutex::new(driver)),
            lifecycle: Arc::new(lifecycle),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ControllerState> {
        self.state.lock().expect("controller state lock poisoned")
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Whether a device is currently open.
    pub fn is_connected(&self) -> bool {
        self.lock().connected
    }

    /// Last known scale status, absent while disconnected or before the
    /// first read.
    pub fn last_status(&self) -> Option<ScaleStatus> {
        self.lock().reading.status
    }

    /// Last reported weight, zero while disconnected.
    pub fn last_weight(&self) -> f64 {
        self.lock().reading.weight
    }

    /// Snapshot of the current reading.
    pub fn reading(&self) -> WeightReading {
        self.lock().reading
    }

    /// Whether the current reading carries a meaningful weight.
    ///
    /// Always derived from the last status; never stored independently.
    pub fn is_weight_valid(&self) -> bool {
        self.lock().reading.is_valid()
    }

    /// Timestamp of the last sample, absent while disconnected.
    pub fn last_read_at(&self) -> Option<DateTime<Utc>> {
        self.lock().last_read_at
    }

    // ------------------------------------------------------------------
    // Observer registration
    // ------------------------------------------------------------------

    /// Install or replace the read observer (single slot, last write wins).
    ///
    /// The new callback is immediately invoked once with the current
    /// snapshot `(is_valid, status, weight)`; the replaced callback stops
    /// receiving notifications from this point on.
    pub fn register_read_observer(&self, observer: impl Fn(bool, Option<ScaleStatus>, f64) + Send + Sync + 'static) {
        let observer: ReadObserver = Arc::new(observer);
        let reading = {
            let mut state = self.lock();
            state.read_observer = Some(Arc::clone(&observer));
            state.reading
        };
        observer(reading.is_valid(), reading.status, reading.weight);
    }

    /// Install or replace the connection observer (single slot, last write
    /// wins).
    ///
    /// The new callback is immediately invoked once with the current
    /// connection state.
    pub fn register_connection_observer(&self, observer: impl Fn(bool) + Send + Sync + 'static) {
        let observer: ConnectionObserver = Arc::new(observer);
        let connected = {
            let mut state = self.lock();
            state.connection_observer = Some(Arc::clone(&observer));
            state.connected
        };
        observer(connected);
    }

    /// Remove the read observer, if any. No notification fires.
    pub fn clear_read_observer(&self) {
        self.lock().read_observer = None;
    }

    /// Remove the connection observer, if any. No notification fires.
    pub fn clear_connection_observer(&self) {
        self.lock().connection_observer = None;
    }

    // ------------------------------------------------------------------
    // Command surface
    // ------------------------------------------------------------------

    /// Open the given device (or the driver's default when omitted).
    ///
    /// On success the connection observer is notified with `true`. On
    /// failure the error propagates to the caller and observable state is
    /// left untouched; no notification fires.
    ///
    /// # Errors
    ///
    /// Returns `DriverError::DeviceOpen` when the driver refuses the open.
    pub async fn connect(&self, device: Option<DeviceId>) -> Result<()> {
        self.driver.lock().await.open(device.as_ref()).await?;

        let observer = {
            let mut state = self.lock();
            state.connected = true;
            state.connection_observer.clone()
        };
        debug!(device = device.as_ref().map(DeviceId::as_str), "scale connected");

        if let Some(cb) = observer {
            cb(true);
        }
        Ok(())
    }

    /// Close the device and reset to the disconnected snapshot.
    ///
    /// A close command is always issued, even when already disconnected.
    /// The reset and the connection-observer notification happen regardless
    /// of the close outcome; close failures are logged and returned but
    /// never leave stale state behind.
    ///
    /// # Errors
    ///
    /// Returns the driver's close failure, if any.
    pub async fn disconnect(&self) -> Result<()> {
        let close_result = self.driver.lock().await.close().await;

        let observer = {
            let mut state = self.lock();
            state.reset();
            state.connection_observer.clone()
        };
        debug!("scale disconnected");

        if let Some(cb) = observer {
            cb(false);
        }

        if let Err(err) = &close_result {
            warn!(error = %err, "driver close failed");
        }
        close_result
    }

    // ------------------------------------------------------------------
    // Driver event handlers (invoked by the event pump)
    // ------------------------------------------------------------------

    /// Handle a scale attach event.
    ///
    /// Auto-connects when permission is already granted. Otherwise parks on
    /// a one-shot resume subscription and re-queries once; a still-denied
    /// permission abandons the attempt. Auto-connect failures are logged
    /// and swallowed: attachment is opportunistic and must not take down
    /// the event pipeline.
    ///
    /// This handler suspends (permission query, resume wait); the event
    /// pump runs it as its own task so detach and read events keep flowing.
    pub async fn handle_attached(&self, device: DeviceId) {
        match self.query_permission(&device).await {
            Some(true) => {
                self.auto_connect(device).await;
                return;
            }
            Some(false) => {}
            None => return,
        }

        debug!(device = device.as_str(), "permission missing, waiting for host resume");
        let mut resume = self.lifecycle.subscribe_resume();
        match resume.recv().await {
            // Lagged still means at least one resume fired
            Ok(()) | Err(RecvError::Lagged(_)) => {}
            Err(RecvError::Closed) => {
                debug!("lifecycle source gone, abandoning permission retry");
                return;
            }
        }
        // Unsubscribe before acting: a second resume must not re-fire
        // this waiter.
        drop(resume);

        match self.query_permission(&device).await {
            Some(true) => self.auto_connect(device).await,
            Some(false) => {
                info!(device = device.as_str(), "no permission granted, abandoning attachment");
            }
            None => {}
        }
    }

    /// Handle a scale detach event.
    ///
    /// Authoritative: resets to the disconnected snapshot and notifies the
    /// connection observer regardless of the current state.
    pub fn handle_detached(&self) {
        let observer = {
            let mut state = self.lock();
            state.reset();
            state.connection_observer.clone()
        };
        debug!("scale detached");

        if let Some(cb) = observer {
            cb(false);
        }
    }

    /// Handle a weight sample.
    ///
    /// Stores the sample unconditionally (this path trusts the driver),
    /// recomputes validity from the status, and notifies the read observer
    /// with `(is_valid, status, weight)`. Connection state is not touched.
    pub fn handle_read(&self, sample: ReadSample) {
        let (reading, observer) = {
            let mut state = self.lock();
            state.reading = WeightReading::new(sample.weight, sample.status);
            state.last_read_at = Some(sample.timestamp);
            (state.reading, state.read_observer.clone())
        };

        if let Some(cb) = observer {
            cb(reading.is_valid(), reading.status, reading.weight);
        }
    }

    /// Query permission, mapping query failures to "abandon this attempt".
    async fn query_permission(&self, device: &DeviceId) -> Option<bool> {
        match self.driver.lock().await.has_permission(device).await {
            Ok(granted) => Some(granted),
            Err(err) => {
                warn!(device = device.as_str(), error = %err, "permission query failed");
                None
            }
        }
    }

    /// Connect with the failure-swallowing policy of the attach path.
    async fn auto_connect(&self, device: DeviceId) {
        if let Err(err) = self.connect(Some(device)).await {
            warn!(error = %err, "auto-connect after attach failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scalelink_driver::DriverError;
    use scalelink_driver::mock::{MockHostLifecycle, MockHostLifecycleHandle, MockScaleDriver, MockScaleHandle};
    use std::time::Duration;

    type TestController = ScaleConnectionController<MockScaleDriver, MockHostLifecycle>;

    fn setup() -> (TestController, MockScaleHandle, MockHostLifecycleHandle) {
        let (driver, scale, _events) = MockScaleDriver::new();
        let (lifecycle, host) = MockHostLifecycle::new();
        (ScaleConnectionController::new(driver, lifecycle), scale, host)
    }

    fn device(id: &str) -> DeviceId {
        DeviceId::new(id).unwrap()
    }

    /// Recorded observer notifications, shared with the callback.
    fn recording_connection_observer(
        controller: &TestController,
    ) -> Arc<Mutex<Vec<bool>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        controller.register_connection_observer(move |connected| {
            sink.lock().unwrap().push(connected);
        });
        log
    }

    fn recording_read_observer(
        controller: &TestController,
    ) -> Arc<Mutex<Vec<(bool, Option<ScaleStatus>, f64)>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        controller.register_read_observer(move |valid, status, weight| {
            sink.lock().unwrap().push((valid, status, weight));
        });
        log
    }

    async fn wait_until(mut check: impl FnMut() -> bool) {
        for _ in 0..200 {
            if check() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached within timeout");
    }

    #[tokio::test]
    async fn initial_state_is_disconnected_default() {
        let (controller, _scale, _host) = setup();

        assert!(!controller.is_connected());
        assert_eq!(controller.last_status(), None);
        assert_eq!(controller.last_weight(), 0.0);
        assert!(!controller.is_weight_valid());
        assert_eq!(controller.last_read_at(), None);
    }

    #[tokio::test]
    async fn registration_delivers_snapshot_exactly_once() {
        let (controller, _scale, _host) = setup();

        let connections = recording_connection_observer(&controller);
        let reads = recording_read_observer(&controller);

        assert_eq!(connections.lock().unwrap().as_slice(), &[false]);
        assert_eq!(reads.lock().unwrap().as_slice(), &[(false, None, 0.0)]);
    }

    #[tokio::test]
    async fn replacing_observer_is_last_write_wins() {
        let (controller, _scale, _host) = setup();

        let first = recording_connection_observer(&controller);
        let second = recording_connection_observer(&controller);

        controller.connect(Some(device("usb-1"))).await.unwrap();

        // The replaced observer saw only its registration snapshot
        assert_eq!(first.lock().unwrap().as_slice(), &[false]);
        assert_eq!(second.lock().unwrap().as_slice(), &[false, true]);
    }

    #[tokio::test]
    async fn connect_notifies_and_marks_connected() {
        let (controller, scale, _host) = setup();
        let connections = recording_connection_observer(&controller);

        controller.connect(Some(device("usb-1"))).await.unwrap();

        assert!(controller.is_connected());
        assert_eq!(scale.open_device(), Some(device("usb-1")));
        assert_eq!(connections.lock().unwrap().as_slice(), &[false, true]);
    }

    #[tokio::test]
    async fn connect_failure_propagates_without_notification() {
        let (controller, scale, _host) = setup();
        let connections = recording_connection_observer(&controller);

        scale.fail_next_open("driver refused");
        let result = controller.connect(Some(device("usb-1"))).await;

        assert!(matches!(result, Err(DriverError::DeviceOpen { .. })));
        assert!(!controller.is_connected());
        assert_eq!(connections.lock().unwrap().as_slice(), &[false]);
    }

    #[tokio::test]
    async fn read_updates_state_and_notifies() {
        let (controller, _scale, _host) = setup();
        controller.connect(Some(device("usb-1"))).await.unwrap();
        let reads = recording_read_observer(&controller);

        controller.handle_read(ReadSample::new(ScaleStatus::Stable, 12.5));

        assert_eq!(controller.last_weight(), 12.5);
        assert_eq!(controller.last_status(), Some(ScaleStatus::Stable));
        assert!(controller.is_weight_valid());
        assert!(controller.last_read_at().is_some());
        assert_eq!(
            reads.lock().unwrap().as_slice(),
            &[
                (false, None, 0.0),
                (true, Some(ScaleStatus::Stable), 12.5)
            ]
        );
    }

    #[tokio::test]
    async fn read_with_error_status_is_invalid_but_stored() {
        let (controller, _scale, _host) = setup();

        controller.handle_read(ReadSample::new(ScaleStatus::OverWeight, 99.9));

        assert_eq!(controller.last_weight(), 99.9);
        assert_eq!(controller.last_status(), Some(ScaleStatus::OverWeight));
        assert!(!controller.is_weight_valid());
    }

    #[tokio::test]
    async fn detach_resets_to_disconnected_snapshot() {
        let (controller, _scale, _host) = setup();
        controller.connect(Some(device("usb-1"))).await.unwrap();
        controller.handle_read(ReadSample::new(ScaleStatus::Stable, 3.0));
        let connections = recording_connection_observer(&controller);

        controller.handle_detached();

        assert!(!controller.is_connected());
        assert_eq!(controller.last_status(), None);
        assert_eq!(controller.last_weight(), 0.0);
        assert_eq!(controller.last_read_at(), None);
        assert_eq!(connections.lock().unwrap().as_slice(), &[true, false]);
    }

    #[tokio::test]
    async fn detach_when_already_disconnected_still_notifies() {
        let (controller, _scale, _host) = setup();
        let connections = recording_connection_observer(&controller);

        controller.handle_detached();

        assert_eq!(connections.lock().unwrap().as_slice(), &[false, false]);
    }

    #[tokio::test]
    async fn redundant_close_is_still_issued() {
        let (controller, scale, _host) = setup();

        controller.disconnect().await.unwrap();
        controller.disconnect().await.unwrap();

        assert_eq!(scale.close_count(), 2);
        assert!(!controller.is_connected());
    }

    #[tokio::test]
    async fn close_failure_still_resets_and_notifies() {
        let (controller, scale, _host) = setup();
        controller.connect(Some(device("usb-1"))).await.unwrap();
        let connections = recording_connection_observer(&controller);

        scale.fail_next_close("device vanished");
        let result = controller.disconnect().await;

        assert!(result.is_err());
        assert!(!controller.is_connected());
        assert_eq!(connections.lock().unwrap().as_slice(), &[true, false]);
    }

    #[tokio::test]
    async fn attach_with_permission_auto_connects() {
        let (controller, scale, _host) = setup();
        let dev = device("usb-1");
        scale.set_permission(dev.clone(), true);

        controller.handle_attached(dev.clone()).await;

        assert!(controller.is_connected());
        assert_eq!(scale.open_device(), Some(dev));
    }

    #[tokio::test]
    async fn attach_auto_connect_failure_is_swallowed() {
        let (controller, scale, _host) = setup();
        let dev = device("usb-1");
        scale.set_permission(dev.clone(), true);
        scale.fail_next_open("held elsewhere");

        // Must not propagate or panic
        controller.handle_attached(dev).await;

        assert!(!controller.is_connected());
        assert_eq!(scale.open_count(), 1);
    }

    #[tokio::test]
    async fn resume_waiter_fires_at_most_once() {
        let (controller, scale, host) = setup();
        let dev = device("usb-1");

        let waiter = {
            let controller = controller.clone();
            let dev = dev.clone();
            tokio::spawn(async move { controller.handle_attached(dev).await })
        };

        wait_until(|| host.waiter_count() == 1).await;

        scale.set_permission(dev.clone(), true);
        host.fire_resume();
        waiter.await.unwrap();

        assert!(controller.is_connected());
        assert_eq!(scale.open_count(), 1);

        // Further resumes reach no waiter and trigger no reconnect
        assert_eq!(host.fire_resume(), 0);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(scale.open_count(), 1);
    }

    #[tokio::test]
    async fn resume_with_permission_still_denied_abandons() {
        let (controller, scale, host) = setup();
        let dev = device("usb-1");

        let waiter = {
            let controller = controller.clone();
            let dev = dev.clone();
            tokio::spawn(async move { controller.handle_attached(dev).await })
        };

        wait_until(|| host.waiter_count() == 1).await;
        host.fire_resume();
        waiter.await.unwrap();

        assert!(!controller.is_connected());
        assert_eq!(scale.open_count(), 0);
        assert_eq!(host.waiter_count(), 0);
    }
}
