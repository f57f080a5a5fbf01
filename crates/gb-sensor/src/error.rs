//! Error types for sensor operations.

use gb_core::Channel;
use thiserror::Error;

/// Result type for sensor operations.
pub type SensorResult<T> = Result<T, SensorError>;

/// Errors that can occur while refreshing or reading a sensor.
///
/// All of these are non-fatal to the control loop: a timeout or missing
/// reading means "no decision input available this tick" and consumers
/// hold their last known state.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SensorError {
    /// The sensor never reported data ready within the configured bound.
    #[error("timed out waiting for {sensor} reading ({waited_s}s, timeout {timeout_s}s)")]
    Timeout {
        sensor: String,
        waited_s: f64,
        timeout_s: f64,
    },

    /// No reading has ever been captured, or the most recent refresh
    /// attempt failed.
    #[error("no fresh reading available for {sensor}")]
    NoReading { sensor: String },

    /// The cached reading does not contain the requested channel.
    /// Validated configurations never hit this.
    #[error("{sensor} reading has no {channel} channel")]
    ChannelMissing { sensor: String, channel: Channel },
}
