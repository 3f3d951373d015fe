use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::info;

use super::sink::{DeviceSighting, DeviceSink};

/// Current state of one tracked device.
#[derive(Debug, Clone)]
pub struct TrackedDevice {
    pub dev_id: String,
    pub mac: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub gps_accuracy: Option<f64>,
    pub zone: Option<String>,
    pub battery: u8,
    pub attributes: HashMap<String, String>,
    pub picture: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// In-memory sink keeping the latest sighting per device.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: HashMap<String, TrackedDevice>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, dev_id: &str) -> Option<&TrackedDevice> {
        self.devices.get(dev_id)
    }

    pub fn devices(&self) -> impl Iterator<Item = &TrackedDevice> {
        self.devices.values()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

impl DeviceSink for DeviceRegistry {
    fn see(&mut self, sighting: DeviceSighting) {
        info!(
            "Device {} at ({:.6}, {:.6}) zone={}",
            sighting.dev_id,
            sighting.latitude,
            sighting.longitude,
            sighting.location_name.as_deref().unwrap_or("none")
        );
        let device = TrackedDevice {
            dev_id: sighting.dev_id.clone(),
            mac: sighting.mac,
            name: sighting.host_name,
            latitude: sighting.latitude,
            longitude: sighting.longitude,
            gps_accuracy: sighting.gps_accuracy,
            zone: sighting.location_name,
            battery: sighting.battery,
            attributes: sighting.attributes,
            picture: sighting.picture,
            updated_at: Utc::now(),
        };
        self.devices.insert(sighting.dev_id, device);
    }
}
