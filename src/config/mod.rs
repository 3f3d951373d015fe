pub mod error;
pub mod loader;
pub mod model;

// Re-export common types for easier access
pub use error::{ConfigError, Result};
pub use loader::load;
pub use model::{Config, KismetConfig, TrackerConfig, ZoneConfig};
