use std::collections::HashMap;

/// One accepted observation, ready for whatever consumes tracker output.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSighting {
    /// Stable identifier, the device MAC
    pub dev_id: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Name of the zone the fix resolved into, if any
    pub location_name: Option<String>,
    pub gps_accuracy: Option<f64>,
    /// Wifi sniffing cannot read battery level; always reported full
    pub battery: u8,
    pub mac: String,
    pub host_name: String,
    pub attributes: HashMap<String, String>,
    pub picture: Option<String>,
}

/// Where accepted sightings go. The poller drives one sink per run.
pub trait DeviceSink {
    fn see(&mut self, sighting: DeviceSighting);
}
