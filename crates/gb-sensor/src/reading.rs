//! Multi-channel sensor snapshots.

use gb_core::Channel;

/// An ordered set of channel values produced by one poll of one physical
/// sensor, all sampled in a single hardware transaction.
///
/// Immutable once produced; a cache replaces its reading wholesale on
/// each refresh and never mutates it in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    values: Vec<(Channel, f64)>,
}

impl Reading {
    /// Build a reading from channel/value pairs.
    pub fn new(values: impl Into<Vec<(Channel, f64)>>) -> Self {
        Self {
            values: values.into(),
        }
    }

    /// Value for `channel`, if this reading carries it.
    pub fn get(&self, channel: Channel) -> Option<f64> {
        self.values
            .iter()
            .find(|(ch, _)| *ch == channel)
            .map(|(_, v)| *v)
    }

    /// All channel/value pairs in sample order.
    pub fn values(&self) -> &[(Channel, f64)] {
        &self.values
    }
}
