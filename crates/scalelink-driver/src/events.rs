//! Event types pushed by the scale driver.
//!
//! The native driver delivers three kinds of events: a scale was attached
//! to the USB port, the scale was detached, and a decoded weight sample
//! arrived. Events are consumed in delivery order by the service layer's
//! dispatch pump.

use scalelink_core::{DeviceId, ScaleStatus};
use serde::{Deserialize, Serialize};

/// A decoded weight sample from the scale.
///
/// The driver has already parsed the wire protocol; this layer only sees
/// the structured status/weight pair plus the capture timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadSample {
    /// Status classification paired with the sample.
    pub status: ScaleStatus,

    /// Weight value in the unit the scale reports (may be negative).
    pub weight: f64,

    /// Timestamp when the sample was decoded.
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ReadSample {
    /// Create a sample with the current timestamp.
    ///
    /// # Examples
    ///
    /// ```
    /// use scalelink_core::ScaleStatus;
    /// use scalelink_driver::ReadSample;
    ///
    /// let sample = ReadSample::new(ScaleStatus::Stable, 12.5);
    /// assert_eq!(sample.weight, 12.5);
    /// ```
    #[must_use]
    pub fn new(status: ScaleStatus, weight: f64) -> Self {
        Self {
            status,
            weight,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Set a custom timestamp, for testing or replaying recorded sessions.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: chrono::DateTime<chrono::Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Push event from the scale driver.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ScaleEvent {
    /// A scale was attached to the USB port.
    Attached {
        /// Identifier of the attached device instance.
        device: DeviceId,
    },

    /// The scale was detached.
    ///
    /// Authoritative: consumers reset to the disconnected snapshot
    /// regardless of their current state.
    Detached,

    /// A weight sample arrived from the open device.
    Read(ReadSample),
}
