//! Reading cache: poll-with-timeout refresh and snapshot access.

use std::thread;
use std::time::Duration;

use gb_core::Channel;
use tracing::debug;

use crate::error::{SensorError, SensorResult};
use crate::reading::Reading;
use crate::transport::SensorTransport;

/// Polling parameters for one sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollConfig {
    /// How long to sleep between "data ready?" probes.
    pub poll_interval: Duration,
    /// Accumulated wait beyond this fails the refresh.
    pub read_timeout: Duration,
}

impl PollConfig {
    pub fn new(poll_interval: Duration, read_timeout: Duration) -> Self {
        Self {
            poll_interval,
            read_timeout,
        }
    }
}

/// Owns the most recent snapshot of one physical sensor.
///
/// Exactly one cache exists per sensor instance; any number of monitors
/// and controllers may read from it. The fresh flag is true only between
/// a successful refresh and the next refresh attempt, so a value from a
/// prior tick is never silently reused across a failed refresh.
pub struct ReadingCache {
    id: String,
    transport: Box<dyn SensorTransport>,
    poll: PollConfig,
    last_reading: Option<Reading>,
    fresh: bool,
}

impl ReadingCache {
    /// Create an empty cache (`fresh = false`, no reading).
    pub fn new(id: impl Into<String>, transport: Box<dyn SensorTransport>, poll: PollConfig) -> Self {
        Self {
            id: id.into(),
            transport,
            poll,
            last_reading: None,
            fresh: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether the cache holds a reading from the current refresh cycle.
    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    /// Replace the polling parameters (applied from the next refresh on).
    pub fn set_poll(&mut self, poll: PollConfig) {
        self.poll = poll;
    }

    /// Block until the transport has data, then replace the cached
    /// reading wholesale.
    ///
    /// Clears the fresh flag up front: even a failed attempt invalidates
    /// the previous snapshot. Fails with [`SensorError::Timeout`] once the
    /// accumulated wait exceeds the configured bound; the caller treats
    /// that as "no decision input this tick", not as fatal.
    pub fn refresh(&mut self) -> SensorResult<()> {
        self.fresh = false;
        let mut waited = Duration::ZERO;
        while !self.transport.data_ready() {
            if waited > self.poll.read_timeout {
                return Err(SensorError::Timeout {
                    sensor: self.id.clone(),
                    waited_s: waited.as_secs_f64(),
                    timeout_s: self.poll.read_timeout.as_secs_f64(),
                });
            }
            debug!(sensor = %self.id, "waiting for sensor to have an available reading");
            thread::sleep(self.poll.poll_interval);
            waited += self.poll.poll_interval;
        }
        self.last_reading = Some(self.transport.sample());
        self.fresh = true;
        Ok(())
    }

    /// Cached value for `channel` from the current tick's successful
    /// refresh.
    pub fn read(&self, channel: Channel) -> SensorResult<f64> {
        let reading = match &self.last_reading {
            Some(reading) if self.fresh => reading,
            _ => {
                return Err(SensorError::NoReading {
                    sensor: self.id.clone(),
                })
            }
        };
        reading.get(channel).ok_or_else(|| SensorError::ChannelMissing {
            sensor: self.id.clone(),
            channel,
        })
    }
}
