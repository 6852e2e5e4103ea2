//! Error types for driver operations.
//!
//! Covers the failure modes of the native scale driver boundary: open
//! refusals, disconnections, permission query failures, and closed event
//! channels.

/// Result type alias for driver operations.
pub type Result<T> = std::result::Result<T, DriverError>;

/// Errors that can occur at the scale driver boundary.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// Driver refused or failed to open the device.
    #[error("Failed to open device: {message}")]
    DeviceOpen { message: String },

    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Permission query against the platform USB stack failed.
    ///
    /// Not to be confused with a denied permission, which is a normal
    /// `Ok(false)` return from `has_permission`.
    #[error("Permission query failed: {message}")]
    PermissionQuery { message: String },

    /// An event or command channel was closed.
    #[error("Channel closed: {channel}")]
    ChannelClosed { channel: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DriverError {
    /// Create a new device open error.
    pub fn device_open(message: impl Into<String>) -> Self {
        Self::DeviceOpen {
            message: message.into(),
        }
    }

    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new permission query error.
    pub fn permission_query(message: impl Into<String>) -> Self {
        Self::PermissionQuery {
            message: message.into(),
        }
    }

    /// Create a new channel closed error.
    pub fn channel_closed(channel: impl Into<String>) -> Self {
        Self::ChannelClosed {
            channel: channel.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_open_error() {
        let error = DriverError::device_open("driver rejected the handle");
        assert!(matches!(error, DriverError::DeviceOpen { .. }));
        assert_eq!(
            error.to_string(),
            "Failed to open device: driver rejected the handle"
        );
    }

    #[test]
    fn test_disconnected_error() {
        let error = DriverError::disconnected("usb-0922");
        assert!(matches!(error, DriverError::Disconnected { .. }));
        assert_eq!(error.to_string(), "Device disconnected: usb-0922");
    }

    #[test]
    fn test_permission_query_error() {
        let error = DriverError::permission_query("usb stack unavailable");
        assert!(matches!(error, DriverError::PermissionQuery { .. }));
        assert_eq!(
            error.to_string(),
            "Permission query failed: usb stack unavailable"
        );
    }

    #[test]
    fn test_channel_closed_error() {
        let error = DriverError::channel_closed("scale events");
        assert_eq!(error.to_string(), "Channel closed: scale events");
    }
}
