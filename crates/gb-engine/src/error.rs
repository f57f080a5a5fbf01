//! Error types for engine construction and reconfiguration.
//!
//! These only fire at build/reload time. Runtime sensor, read, and
//! actuator failures are handled inside the tick (logged, held state)
//! and never surface as engine errors.

use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] gb_config::ValidationError),

    #[error(transparent)]
    Control(#[from] gb_controls::ControlError),

    /// No transport was registered for a configured sensor.
    #[error("no transport registered for sensor '{id}'")]
    MissingTransport { id: String },

    /// No actuator driver was registered for a configured device.
    #[error("no actuator registered for device '{device}'")]
    MissingActuator { device: String },

    /// A reloaded configuration changed the sensor/device topology,
    /// which requires a restart. Parameters may change at runtime,
    /// wiring may not.
    #[error("reloaded configuration changes topology: {what}")]
    TopologyChanged { what: String },
}
