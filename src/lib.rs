//! Presence tracking backed by a Kismet wireless sniffer.
//!
//! Polls a Kismet server's REST API for recently active devices matching a
//! configured allow-list, extracts their GPS fixes, and forwards fresh
//! sightings to a device sink.

pub mod config;
pub mod kismet;
pub mod models;
pub mod tracker;

pub use config::Config;
pub use kismet::{KismetClient, KismetError};
pub use models::ZoneIndex;
pub use tracker::{DeviceRegistry, DeviceSink, KismetPoller};
