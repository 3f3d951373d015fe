use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::{DeviceLocation, DeviceRecord, LocationFix};

/// Kismet stores coordinates as integer microdegrees.
const COORD_SCALE: f64 = 1e-6;

/// One element of the device summary reply, limited to the projected fields.
/// Unlisted fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceEntry {
    #[serde(rename = "kismet.device.base.macaddr")]
    pub macaddr: String,
    #[serde(rename = "kismet.device.base.name")]
    pub name: Option<String>,
    #[serde(rename = "kismet.device.base.last_time")]
    pub last_time: Option<f64>,
    #[serde(rename = "dot11.probedssid.location")]
    probed_location: Option<LocationField>,
    #[serde(rename = "dot11.probedssid.gps")]
    probed_gps: Option<LocationRecord>,
    #[serde(rename = "dot11.advertisedssid.location")]
    advertised_location: Option<LocationField>,
}

/// Servers emit the location field either as an integer validity flag with
/// the gps record alongside, or as the record inline.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum LocationField {
    Flag(i64),
    Record(LocationRecord),
}

impl LocationField {
    fn is_set(&self) -> bool {
        match self {
            LocationField::Flag(flag) => *flag != 0,
            LocationField::Record(_) => true,
        }
    }

    fn record(&self) -> Option<&LocationRecord> {
        match self {
            LocationField::Record(record) => Some(record),
            LocationField::Flag(_) => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct LocationRecord {
    #[serde(rename = "kismet.common.location.loc_valid", default)]
    loc_valid: i64,
    #[serde(rename = "kismet.common.location.avg_lat")]
    avg_lat: Option<i64>,
    #[serde(rename = "kismet.common.location.avg_lon")]
    avg_lon: Option<i64>,
    #[serde(rename = "kismet.common.location.fix")]
    fix: Option<f64>,
}

impl LocationRecord {
    fn to_fix(&self) -> DeviceLocation {
        if self.loc_valid != 1 {
            return DeviceLocation::Missing;
        }
        let (Some(lat), Some(lon)) = (self.avg_lat, self.avg_lon) else {
            return DeviceLocation::Invalid(format!(
                "coordinates missing: lat={:?} lon={:?}",
                self.avg_lat, self.avg_lon
            ));
        };
        let latitude = lat as f64 * COORD_SCALE;
        let longitude = lon as f64 * COORD_SCALE;
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return DeviceLocation::Invalid(format!(
                "coordinates out of range: ({}, {})",
                latitude, longitude
            ));
        }
        DeviceLocation::Valid(LocationFix {
            latitude,
            longitude,
            accuracy: self.fix,
        })
    }
}

impl DeviceEntry {
    /// Reduce the wire form to the tracker's own record.
    pub fn into_record(self) -> DeviceRecord {
        let location = self.resolve_location();
        let name = match self.name {
            Some(name) if !name.is_empty() => name,
            _ => self.macaddr.clone(),
        };
        DeviceRecord {
            mac: self.macaddr,
            name,
            location,
            last_seen: self.last_time.and_then(utc_from_timestamp),
        }
    }

    /// Probed location wins over advertised when both are present; a client
    /// that probes carries its own track, the advertised one is the AP's.
    fn resolve_location(&self) -> DeviceLocation {
        if let Some(field) = &self.probed_location {
            if field.is_set() {
                if let Some(record) = self.probed_gps.as_ref().or_else(|| field.record()) {
                    return record.to_fix();
                }
                return DeviceLocation::Invalid(
                    "probed location flagged but carries no gps record".to_string(),
                );
            }
        }
        if let Some(field) = &self.advertised_location {
            if field.is_set() {
                if let Some(record) = field.record() {
                    return record.to_fix();
                }
                return DeviceLocation::Invalid(
                    "advertised location flagged but carries no gps record".to_string(),
                );
            }
        }
        DeviceLocation::Missing
    }
}

fn utc_from_timestamp(timestamp: f64) -> Option<DateTime<Utc>> {
    if !timestamp.is_finite() {
        return None;
    }
    let secs = timestamp.trunc() as i64;
    let nanos = (timestamp.fract() * 1e9) as u32;
    DateTime::from_timestamp(secs, nanos)
}
