use crate::{Result, constants::MAX_DEVICE_ID_LENGTH, error::Error};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for a USB device instance.
///
/// The platform USB stack assigns these; this layer never interprets the
/// contents beyond rejecting empty or absurdly long values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(String);

impl DeviceId {
    /// Create a new device id with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidDeviceId` if the id is empty or longer than
    /// [`MAX_DEVICE_ID_LENGTH`] bytes.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::InvalidDeviceId("device id is empty".to_string()));
        }
        if id.len() > MAX_DEVICE_ID_LENGTH {
            return Err(Error::InvalidDeviceId(format!(
                "device id exceeds {MAX_DEVICE_ID_LENGTH} bytes ({} bytes)",
                id.len()
            )));
        }
        Ok(DeviceId(id))
    }

    /// Get the raw id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for DeviceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        DeviceId::new(s)
    }
}

/// Classification reported by the scale alongside every weight sample.
///
/// The members and numeric codes follow the USB HID point-of-sale scale
/// data report. Only [`Zero`](ScaleStatus::Zero),
/// [`InMotion`](ScaleStatus::InMotion) and [`Stable`](ScaleStatus::Stable)
/// mark a sample as usable; everything else is an error or transitional
/// condition and the paired weight must not be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ScaleStatus {
    /// Scale hardware fault.
    Fault,

    /// Stable at zero, nothing on the platter.
    Zero,

    /// Weight is still settling.
    InMotion,

    /// Stable non-zero weight.
    Stable,

    /// Reading below the zero point.
    UnderZero,

    /// Load exceeds the scale's rated capacity.
    OverWeight,

    /// Scale requires calibration before it can report weights.
    CalibrationRequired,

    /// Scale requires re-zeroing before it can report weights.
    ZeroingRequired,
}

impl ScaleStatus {
    /// Check whether a sample carrying this status holds a meaningful weight.
    ///
    /// True only for `Zero`, `InMotion` and `Stable`. Every other member
    /// (fault, overload, calibration states) yields false.
    ///
    /// # Examples
    ///
    /// ```
    /// use scalelink_core::ScaleStatus;
    ///
    /// assert!(ScaleStatus::Stable.is_weight_valid());
    /// assert!(!ScaleStatus::OverWeight.is_weight_valid());
    /// ```
    #[must_use]
    pub fn is_weight_valid(&self) -> bool {
        matches!(self, Self::Zero | Self::InMotion | Self::Stable)
    }

    /// Decode a status from its HID report code.
    ///
    /// Returns `None` for codes outside
    /// [`MIN_STATUS_CODE`](crate::constants::MIN_STATUS_CODE)..=[`MAX_STATUS_CODE`](crate::constants::MAX_STATUS_CODE).
    ///
    /// # Examples
    ///
    /// ```
    /// use scalelink_core::ScaleStatus;
    ///
    /// assert_eq!(ScaleStatus::from_code(4), Some(ScaleStatus::Stable));
    /// assert_eq!(ScaleStatus::from_code(0), None);
    /// ```
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Fault),
            2 => Some(Self::Zero),
            3 => Some(Self::InMotion),
            4 => Some(Self::Stable),
            5 => Some(Self::UnderZero),
            6 => Some(Self::OverWeight),
            7 => Some(Self::CalibrationRequired),
            8 => Some(Self::ZeroingRequired),
            _ => None,
        }
    }

    /// Get the HID report code for this status.
    #[must_use]
    pub fn code(&self) -> u8 {
        match self {
            Self::Fault => 1,
            Self::Zero => 2,
            Self::InMotion => 3,
            Self::Stable => 4,
            Self::UnderZero => 5,
            Self::OverWeight => 6,
            Self::CalibrationRequired => 7,
            Self::ZeroingRequired => 8,
        }
    }

    /// All known status members, in code order. Useful for exhaustive tests.
    #[must_use]
    pub fn all() -> [ScaleStatus; 8] {
        [
            Self::Fault,
            Self::Zero,
            Self::InMotion,
            Self::Stable,
            Self::UnderZero,
            Self::OverWeight,
            Self::CalibrationRequired,
            Self::ZeroingRequired,
        ]
    }
}

impl fmt::Display for ScaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Fault => "Fault",
            Self::Zero => "Zero",
            Self::InMotion => "InMotion",
            Self::Stable => "Stable",
            Self::UnderZero => "UnderZero",
            Self::OverWeight => "OverWeight",
            Self::CalibrationRequired => "CalibrationRequired",
            Self::ZeroingRequired => "ZeroingRequired",
        };
        write!(f, "{s}")
    }
}

/// Snapshot of the most recent weight sample.
///
/// Validity is always derived from the paired status, never stored
/// independently: an absent status (nothing read yet, or the scale was
/// detached) makes the reading invalid, and the weight defaults to zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightReading {
    /// Weight value in the unit the scale reports (may be negative).
    pub weight: f64,

    /// Status paired with the sample, absent when disconnected.
    pub status: Option<ScaleStatus>,
}

impl WeightReading {
    /// Create a reading from a driver sample.
    #[must_use]
    pub fn new(weight: f64, status: ScaleStatus) -> Self {
        Self {
            weight,
            status: Some(status),
        }
    }

    /// Check whether the reading carries a meaningful weight.
    ///
    /// Pure function of the paired status; see
    /// [`ScaleStatus::is_weight_valid`].
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.status.is_some_and(|s| s.is_weight_valid())
    }
}

impl Default for WeightReading {
    /// The disconnected snapshot: zero weight, no status.
    fn default() -> Self {
        Self {
            weight: 0.0,
            status: None,
        }
    }
}
