use serde::Deserialize;

use super::error::{ConfigError, Result};

/// Top-level configuration. Immutable once loaded.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Connection settings for the Kismet server
    pub kismet: KismetConfig,
    /// What to track and how often
    #[serde(default)]
    pub tracker: TrackerConfig,
    /// Named geofences used to resolve a zone name for accepted sightings
    #[serde(default)]
    pub zones: Vec<ZoneConfig>,
}

/// Where the Kismet server lives and how to authenticate against it.
#[derive(Debug, Clone, Deserialize)]
pub struct KismetConfig {
    /// Host name or address of the Kismet server
    pub server: String,
    /// REST port, 2501 unless overridden
    #[serde(default = "default_port")]
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Optional request timeout in seconds. When unset a request waits as
    /// long as the OS network stack allows.
    #[serde(default)]
    pub timeout: Option<u64>,
}

/// Allow-list and polling cadence.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackerConfig {
    /// Poll interval in seconds; doubles as the server-side lookback window
    #[serde(default = "default_scan_interval")]
    pub scan_interval: u64,
    /// Device name patterns (regex) to track, e.g. phone hotspot SSIDs
    #[serde(default)]
    pub ssids: Vec<String>,
    /// Client MAC addresses to track; upper-cased before querying
    #[serde(default)]
    pub clients: Vec<String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            scan_interval: default_scan_interval(),
            ssids: Vec::new(),
            clients: Vec::new(),
        }
    }
}

/// One circular geofence.
#[derive(Debug, Clone, Deserialize)]
pub struct ZoneConfig {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Radius in meters
    #[serde(default = "default_zone_radius")]
    pub radius: f64,
}

fn default_port() -> u16 {
    2501
}

fn default_scan_interval() -> u64 {
    30
}

fn default_zone_radius() -> f64 {
    100.0
}

impl Config {
    /// Reject values the poller cannot run with. An empty allow-list is
    /// deliberately not rejected here: the poller logs it at startup and
    /// keeps running.
    pub fn validate(&self) -> Result<()> {
        if self.tracker.scan_interval == 0 {
            return Err(ConfigError::Invalid(
                "tracker.scan_interval must be at least 1 second".to_string(),
            ));
        }
        for zone in &self.zones {
            if zone.radius <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "zone {:?} has a non-positive radius",
                    zone.name
                )));
            }
            if !(-90.0..=90.0).contains(&zone.latitude)
                || !(-180.0..=180.0).contains(&zone.longitude)
            {
                return Err(ConfigError::Invalid(format!(
                    "zone {:?} has coordinates off the map",
                    zone.name
                )));
            }
        }
        Ok(())
    }
}
