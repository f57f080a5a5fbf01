//! Actuator driver capability.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

/// The actuator driver failed to set a physical state.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("failed to set {device} to {wanted}: {what}")]
pub struct ActuatorError {
    pub device: String,
    pub wanted: bool,
    pub what: String,
}

/// Capability to set one binary output state.
///
/// The core calls this only on a transition; the driver is responsible
/// for making the physical write idempotent. Any concrete driver (GPIO
/// pin, relay board, logging stub, test double) implements this.
pub trait Actuator {
    fn set(&mut self, on: bool) -> Result<(), ActuatorError>;
}

/// Actuator that only logs transitions. Stands in for devices with no
/// wiring attached, like a heater or lights circuit that is configured
/// but not yet connected.
#[derive(Debug, Clone)]
pub struct LoggingActuator {
    device: String,
}

impl LoggingActuator {
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
        }
    }
}

impl Actuator for LoggingActuator {
    fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        info!(device = %self.device, on, "actuator state change");
        Ok(())
    }
}

/// Actuator backed by a shared boolean switch.
///
/// The simulated chamber reads the same switch, which is how actuation
/// feeds back into simulated sensor readings.
#[derive(Debug, Clone)]
pub struct SwitchActuator {
    device: String,
    switch: Arc<AtomicBool>,
}

impl SwitchActuator {
    pub fn new(device: impl Into<String>, switch: Arc<AtomicBool>) -> Self {
        Self {
            device: device.into(),
            switch,
        }
    }

    pub fn is_on(&self) -> bool {
        self.switch.load(Ordering::Relaxed)
    }
}

impl Actuator for SwitchActuator {
    fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.switch.store(on, Ordering::Relaxed);
        info!(device = %self.device, on, "actuator state change");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switch_actuator_flips_shared_state() {
        let switch = Arc::new(AtomicBool::new(false));
        let mut actuator = SwitchActuator::new("humidifier", switch.clone());
        actuator.set(true).unwrap();
        assert!(switch.load(Ordering::Relaxed));
        actuator.set(false).unwrap();
        assert!(!switch.load(Ordering::Relaxed));
    }

    #[test]
    fn logging_actuator_always_succeeds() {
        let mut actuator = LoggingActuator::new("lights");
        assert!(actuator.set(true).is_ok());
        assert!(actuator.set(false).is_ok());
    }
}
