//! Single-slot buffer for hot-reloaded configuration.

use std::sync::{Arc, Mutex};

use crate::schema::Config;

/// Hand-off cell between a reload source and the control loop.
///
/// The reload handler only ever writes the slot; the tick loop only ever
/// takes from it at tick boundaries. A second store before the loop gets
/// there simply replaces the pending value; only the newest complete
/// configuration matters. This keeps an in-flight tick on the
/// configuration it started with.
#[derive(Debug, Default)]
pub struct ConfigCell {
    slot: Mutex<Option<Arc<Config>>>,
}

impl ConfigCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer a complete replacement configuration.
    pub fn store(&self, config: Arc<Config>) {
        *self.slot.lock().expect("config cell lock poisoned") = Some(config);
    }

    /// Take the pending configuration, if any. Called by the loop at
    /// tick boundaries.
    pub fn take(&self) -> Option<Arc<Config>> {
        self.slot.lock().expect("config cell lock poisoned").take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_config() -> Arc<Config> {
        Arc::new(Config {
            tick_interval_seconds: 10.0,
            sensors: vec![],
            monitors: vec![],
            controllers: vec![],
        })
    }

    #[test]
    fn empty_cell_takes_none() {
        let cell = ConfigCell::new();
        assert!(cell.take().is_none());
    }

    #[test]
    fn take_drains_the_slot() {
        let cell = ConfigCell::new();
        cell.store(empty_config());
        assert!(cell.take().is_some());
        assert!(cell.take().is_none());
    }

    #[test]
    fn second_store_replaces_pending() {
        let cell = ConfigCell::new();
        let first = empty_config();
        let second = Arc::new(Config {
            tick_interval_seconds: 30.0,
            sensors: vec![],
            monitors: vec![],
            controllers: vec![],
        });
        cell.store(first);
        cell.store(second);
        let taken = cell.take().unwrap();
        assert_eq!(taken.tick_interval_seconds, 30.0);
        assert!(cell.take().is_none());
    }
}
