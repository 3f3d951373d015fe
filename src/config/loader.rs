use std::fs;
use std::path::Path;

use tracing::{debug, info};

use super::error::Result;
use super::model::Config;

/// Read and validate a TOML configuration file.
pub fn load(path: &Path) -> Result<Config> {
    debug!("Reading configuration from {}", path.display());
    let raw = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&raw)?;
    config.validate()?;
    info!(
        "Loaded configuration: {} ssid(s), {} client(s), {} zone(s)",
        config.tracker.ssids.len(),
        config.tracker.clients.len(),
        config.zones.len()
    );
    Ok(config)
}
