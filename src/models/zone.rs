use crate::config::ZoneConfig;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two points in meters.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

/// A named circular geofence.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Radius in meters
    pub radius: f64,
}

impl Zone {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64, radius: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
            radius,
        }
    }

    /// Meters between the zone center and a point.
    pub fn distance_to(&self, latitude: f64, longitude: f64) -> f64 {
        haversine_distance(self.latitude, self.longitude, latitude, longitude)
    }

    /// Whether a sighting falls inside the zone. The reported GPS accuracy
    /// widens the match: a fix whose error circle overlaps the zone counts.
    pub fn contains(&self, latitude: f64, longitude: f64, accuracy: f64) -> bool {
        self.distance_to(latitude, longitude) - accuracy < self.radius
    }
}

/// All configured zones, queried per accepted sighting.
#[derive(Debug, Clone, Default)]
pub struct ZoneIndex {
    zones: Vec<Zone>,
}

impl ZoneIndex {
    pub fn new(zones: Vec<Zone>) -> Self {
        Self { zones }
    }

    pub fn from_config(zones: &[ZoneConfig]) -> Self {
        Self {
            zones: zones
                .iter()
                .map(|z| Zone::new(z.name.clone(), z.latitude, z.longitude, z.radius))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// The matching zone whose center is closest to the fix, if any.
    pub fn active_zone(&self, latitude: f64, longitude: f64, accuracy: f64) -> Option<&Zone> {
        self.zones
            .iter()
            .filter(|zone| zone.contains(latitude, longitude, accuracy))
            .min_by(|a, b| {
                a.distance_to(latitude, longitude)
                    .total_cmp(&b.distance_to(latitude, longitude))
            })
    }
}
