use chrono::{DateTime, Utc};

/// A device as reported by one scan cycle, reduced to what the tracker
/// cares about.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceRecord {
    /// Canonical MAC address, upper-cased by the server
    pub mac: String,
    /// Friendly name; falls back to the MAC when the server has none
    pub name: String,
    pub location: DeviceLocation,
    /// When the server last saw the device, if the reply carried it
    pub last_seen: Option<DateTime<Utc>>,
}

/// What the reply said about where the device is.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceLocation {
    /// No location structure in the reply at all
    Missing,
    /// A location structure was present but unusable; the string says why
    Invalid(String),
    Valid(LocationFix),
}

impl DeviceLocation {
    pub fn as_fix(&self) -> Option<&LocationFix> {
        match self {
            DeviceLocation::Valid(fix) => Some(fix),
            _ => None,
        }
    }
}

/// A usable GPS position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
    /// Fix quality in meters when the server reported one
    pub accuracy: Option<f64>,
}
