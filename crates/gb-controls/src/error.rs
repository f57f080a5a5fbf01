//! Error types for control operations.

use thiserror::Error;

use crate::actuator::ActuatorError;

/// Result type for control operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur in control operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided when constructing a rule.
    #[error("invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// The actuator driver failed to set a physical state. The
    /// controller's state bit is not advanced and the transition is
    /// retried next tick.
    #[error(transparent)]
    Actuator(#[from] ActuatorError),
}
