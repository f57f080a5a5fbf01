//! gb-sensor: sensor reading lifecycle for growbox.
//!
//! A physical sensor is reached through a [`SensorTransport`] capability
//! ("is data ready?" / "sample all channels"). Each transport is owned by
//! exactly one [`ReadingCache`], which performs the blocking
//! poll-with-timeout refresh and holds the most recent multi-channel
//! [`Reading`] together with a fresh flag. Downstream consumers only ever
//! see values from the current tick's successful refresh.

pub mod cache;
pub mod error;
pub mod reading;
pub mod sim;
pub mod transport;

pub use cache::{PollConfig, ReadingCache};
pub use error::{SensorError, SensorResult};
pub use reading::Reading;
pub use sim::{ChamberState, SimulatedChamber};
pub use transport::SensorTransport;
