//! Hardware transport capability.

use crate::reading::Reading;

/// Capability to talk to one physical sensor.
///
/// The bus/protocol behind this (I2C, STEMMA QT, a simulation) is
/// irrelevant to the decision logic; the cache only needs "is a
/// measurement available?" and "sample every channel at once".
pub trait SensorTransport {
    /// Whether a fresh measurement is available to sample.
    fn data_ready(&mut self) -> bool;

    /// Sample all channels in one transaction.
    ///
    /// Only called after `data_ready()` has returned true.
    fn sample(&mut self) -> Reading;
}
