pub mod client;
pub mod model;
pub mod query;

// Re-export common types for easier access
pub use client::{KismetClient, KismetError};
pub use model::DeviceEntry;
pub use query::DeviceQuery;
