pub mod device;
pub mod zone;

// Re-export common types for easier access
pub use device::{DeviceLocation, DeviceRecord, LocationFix};
pub use zone::{Zone, ZoneIndex};
