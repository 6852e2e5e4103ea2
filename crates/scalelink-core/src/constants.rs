//! Core constants for the scale connection layer.
//!
//! This module centralizes the numeric limits and channel sizing used across
//! the workspace. The status code values mirror the USB HID point-of-sale
//! scale data report, which is what the native driver decodes before handing
//! structured events to this layer.

// ============================================================================
// Scale Status Codes
// ============================================================================

/// Lowest status code a scale data report can carry.
///
/// # Value: 1 (`Fault`)
pub const MIN_STATUS_CODE: u8 = 1;

/// Highest status code a scale data report can carry.
///
/// # Value: 8 (`ZeroingRequired`)
///
/// Codes outside `MIN_STATUS_CODE..=MAX_STATUS_CODE` are rejected by
/// [`ScaleStatus::from_code`](crate::types::ScaleStatus::from_code); the
/// driver is expected to have already filtered reserved values.
pub const MAX_STATUS_CODE: u8 = 8;

// ============================================================================
// Device Identification
// ============================================================================

/// Maximum length of a device identifier (bytes).
///
/// Device ids are opaque strings produced by the platform USB stack
/// (e.g. `/dev/bus/usb/001/004` on Linux, `\\?\usb#vid_0922...` on Windows).
/// The cap only guards against unbounded allocation from a misbehaving
/// driver; it is not a format constraint.
///
/// # Value: 256 bytes
pub const MAX_DEVICE_ID_LENGTH: usize = 256;

// ============================================================================
// Channel Sizing
// ============================================================================

/// Capacity of the driver event channel (attach/detach/read).
///
/// Scales report at a few samples per second at most, so a small buffer is
/// enough to absorb bursts around attach/detach without the driver task ever
/// blocking on a healthy consumer.
///
/// # Value: 32 events
pub const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Capacity of the host resume broadcast channel.
///
/// Resume waiters consume at most one signal each, so lag on this channel is
/// harmless; the capacity only needs to cover resumes fired while no waiter
/// is polling.
///
/// # Value: 8 signals
pub const RESUME_CHANNEL_CAPACITY: usize = 8;
