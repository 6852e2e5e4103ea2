//! Mock scale driver implementation for testing and development.
//!
//! This module provides a simulated USB scale whose permission table,
//! failure injection and event stream can be controlled programmatically.

use crate::{
    Result,
    error::DriverError,
    events::{ReadSample, ScaleEvent},
    traits::ScaleDriver,
};
use scalelink_core::{DeviceId, ScaleStatus, constants::EVENT_CHANNEL_CAPACITY};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Scripted driver state shared between the driver and its handle.
///
/// The controller *queries* the driver (`has_permission`) in addition to
/// issuing commands, so the script lives behind a shared mutex rather than
/// flowing through a channel.
#[derive(Debug, Default)]
struct ScaleScript {
    /// Permission table (device id -> granted).
    permissions: HashMap<DeviceId, bool>,

    /// Device the driver picks when `open(None)` is called.
    default_device: Option<DeviceId>,

    /// Message to fail the next `open` with, consumed on use.
    fail_next_open: Option<String>,

    /// Message to fail the next `close` with, consumed on use.
    fail_next_close: Option<String>,

    /// Currently open device, if any.
    open_device: Option<DeviceId>,

    /// Number of `open` commands issued (including failed ones).
    open_count: usize,

    /// Number of `close` commands issued (including failed ones).
    close_count: usize,
}

/// Mock USB scale driver for testing and development.
///
/// # Examples
///
/// ```
/// use scalelink_core::DeviceId;
/// use scalelink_driver::ScaleDriver;
/// use scalelink_driver::mock::MockScaleDriver;
///
/// #[tokio::main]
/// async fn main() -> scalelink_driver::Result<()> {
///     let (mut driver, handle, _events) = MockScaleDriver::new();
///
///     let device = DeviceId::new("usb-0922").unwrap();
///     handle.set_permission(device.clone(), true);
///
///     assert!(driver.has_permission(&device).await?);
///     driver.open(Some(&device)).await?;
///     assert_eq!(handle.open_device(), Some(device));
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockScaleDriver {
    script: Arc<Mutex<ScaleScript>>,
}

impl MockScaleDriver {
    /// Create a new mock driver.
    ///
    /// Returns the driver, the control handle, and the receiving end of the
    /// event channel the handle emits [`ScaleEvent`]s into. The receiver is
    /// handed to the service layer's dispatch pump.
    pub fn new() -> (Self, MockScaleHandle, mpsc::Receiver<ScaleEvent>) {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let script = Arc::new(Mutex::new(ScaleScript::default()));

        let driver = Self {
            script: Arc::clone(&script),
        };
        let handle = MockScaleHandle { script, event_tx };

        (driver, handle, event_rx)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ScaleScript> {
        self.script.lock().expect("scale script lock poisoned")
    }
}

impl ScaleDriver for MockScaleDriver {
    async fn open(&mut self, device: Option<&DeviceId>) -> Result<()> {
        let mut script = self.lock();
        script.open_count += 1;

        if let Some(message) = script.fail_next_open.take() {
            return Err(DriverError::device_open(message));
        }

        let target = match device {
            Some(id) => id.clone(),
            None => script
                .default_device
                .clone()
                .ok_or_else(|| DriverError::device_open("no scale attached"))?,
        };

        script.open_device = Some(target);
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        let mut script = self.lock();
        script.close_count += 1;
        script.open_device = None;

        if let Some(message) = script.fail_next_close.take() {
            return Err(DriverError::disconnected(message));
        }
        Ok(())
    }

    async fn has_permission(&self, device: &DeviceId) -> Result<bool> {
        let script = self.lock();
        Ok(script.permissions.get(device).copied().unwrap_or(false))
    }
}

/// Handle for controlling a [`MockScaleDriver`].
///
/// The handle scripts the driver's responses (permission table, failure
/// injection) and injects attach/detach/read events into the event channel,
/// standing in for the native driver's push pipeline.
#[derive(Debug, Clone)]
pub struct MockScaleHandle {
    script: Arc<Mutex<ScaleScript>>,
    event_tx: mpsc::Sender<ScaleEvent>,
}

impl MockScaleHandle {
    fn lock(&self) -> std::sync::MutexGuard<'_, ScaleScript> {
        self.script.lock().expect("scale script lock poisoned")
    }

    /// Set whether the OS has granted access to a device.
    pub fn set_permission(&self, device: DeviceId, granted: bool) {
        self.lock().permissions.insert(device, granted);
    }

    /// Set the device `open(None)` resolves to.
    pub fn set_default_device(&self, device: DeviceId) {
        self.lock().default_device = Some(device);
    }

    /// Make the next `open` command fail with the given message.
    pub fn fail_next_open(&self, message: impl Into<String>) {
        self.lock().fail_next_open = Some(message.into());
    }

    /// Make the next `close` command fail with the given message.
    pub fn fail_next_close(&self, message: impl Into<String>) {
        self.lock().fail_next_close = Some(message.into());
    }

    /// Number of `open` commands the driver has received.
    pub fn open_count(&self) -> usize {
        self.lock().open_count
    }

    /// Number of `close` commands the driver has received.
    pub fn close_count(&self) -> usize {
        self.lock().close_count
    }

    /// The device currently held open by the driver, if any.
    pub fn open_device(&self) -> Option<DeviceId> {
        self.lock().open_device.clone()
    }

    /// Emit an attach event for the given device.
    ///
    /// # Errors
    ///
    /// Returns `DriverError::ChannelClosed` if the event consumer has been
    /// dropped.
    pub async fn attach(&self, device: DeviceId) -> Result<()> {
        self.send(ScaleEvent::Attached { device }).await
    }

    /// Emit a detach event.
    ///
    /// # Errors
    ///
    /// Returns `DriverError::ChannelClosed` if the event consumer has been
    /// dropped.
    pub async fn detach(&self) -> Result<()> {
        self.send(ScaleEvent::Detached).await
    }

    /// Emit a weight sample.
    ///
    /// # Errors
    ///
    /// Returns `DriverError::ChannelClosed` if the event consumer has been
    /// dropped.
    pub async fn read(&self, status: ScaleStatus, weight: f64) -> Result<()> {
        self.send(ScaleEvent::Read(ReadSample::new(status, weight)))
            .await
    }

    async fn send(&self, event: ScaleEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .await
            .map_err(|_| DriverError::channel_closed("scale events"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(id: &str) -> DeviceId {
        DeviceId::new(id).unwrap()
    }

    #[tokio::test]
    async fn test_permission_defaults_to_denied() {
        let (driver, handle, _events) = MockScaleDriver::new();

        let dev = device("usb-1");
        assert!(!driver.has_permission(&dev).await.unwrap());

        handle.set_permission(dev.clone(), true);
        assert!(driver.has_permission(&dev).await.unwrap());

        handle.set_permission(dev.clone(), false);
        assert!(!driver.has_permission(&dev).await.unwrap());
    }

    #[tokio::test]
    async fn test_open_specific_device() {
        let (mut driver, handle, _events) = MockScaleDriver::new();

        let dev = device("usb-1");
        driver.open(Some(&dev)).await.unwrap();

        assert_eq!(handle.open_count(), 1);
        assert_eq!(handle.open_device(), Some(dev));
    }

    #[tokio::test]
    async fn test_open_default_device() {
        let (mut driver, handle, _events) = MockScaleDriver::new();

        // No default configured: open(None) refuses
        let result = driver.open(None).await;
        assert!(matches!(result, Err(DriverError::DeviceOpen { .. })));

        let dev = device("usb-default");
        handle.set_default_device(dev.clone());
        driver.open(None).await.unwrap();
        assert_eq!(handle.open_device(), Some(dev));
        assert_eq!(handle.open_count(), 2);
    }

    #[tokio::test]
    async fn test_fail_next_open_is_one_shot() {
        let (mut driver, handle, _events) = MockScaleDriver::new();
        let dev = device("usb-1");

        handle.fail_next_open("exclusive access held");
        let result = driver.open(Some(&dev)).await;
        assert!(matches!(result, Err(DriverError::DeviceOpen { .. })));
        assert_eq!(handle.open_device(), None);

        // Injection is consumed; the next open succeeds
        driver.open(Some(&dev)).await.unwrap();
        assert_eq!(handle.open_device(), Some(dev));
    }

    #[tokio::test]
    async fn test_close_clears_open_device() {
        let (mut driver, handle, _events) = MockScaleDriver::new();
        let dev = device("usb-1");

        driver.open(Some(&dev)).await.unwrap();
        driver.close().await.unwrap();

        assert_eq!(handle.open_device(), None);
        assert_eq!(handle.close_count(), 1);

        // Redundant close is counted but harmless
        driver.close().await.unwrap();
        assert_eq!(handle.close_count(), 2);
    }

    #[tokio::test]
    async fn test_handle_emits_events_in_order() {
        let (_driver, handle, mut events) = MockScaleDriver::new();
        let dev = device("usb-1");

        handle.attach(dev.clone()).await.unwrap();
        handle.read(ScaleStatus::Stable, 12.5).await.unwrap();
        handle.detach().await.unwrap();

        assert_eq!(
            events.recv().await,
            Some(ScaleEvent::Attached { device: dev })
        );
        match events.recv().await {
            Some(ScaleEvent::Read(sample)) => {
                assert_eq!(sample.status, ScaleStatus::Stable);
                assert_eq!(sample.weight, 12.5);
            }
            other => panic!("expected read event, got {other:?}"),
        }
        assert_eq!(events.recv().await, Some(ScaleEvent::Detached));
    }

    #[tokio::test]
    async fn test_events_error_when_consumer_dropped() {
        let (_driver, handle, events) = MockScaleDriver::new();
        drop(events);

        let result = handle.detach().await;
        assert!(matches!(result, Err(DriverError::ChannelClosed { .. })));
    }
}
