pub mod poller;
pub mod registry;
pub mod sink;

// Re-export common types for easier access
pub use poller::{CycleSummary, KismetPoller};
pub use registry::{DeviceRegistry, TrackedDevice};
pub use sink::{DeviceSighting, DeviceSink};
