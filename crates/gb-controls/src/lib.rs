//! gb-controls: decision primitives for growbox.
//!
//! This crate turns a scalar measure value into a binary actuation
//! decision:
//! - Rules are pure decision functions: hysteresis bands
//!   ([`BandRule`]) and hour-of-day schedules ([`ScheduleRule`]).
//! - A [`Controller`] pairs a rule with the one piece of cross-tick
//!   state, its `active` bit, and applies decisions to an [`Actuator`]
//!   capability only on transitions.
//! - [`gate`] implements the pairwise suppression rule a gated
//!   controller applies against its peer's decision.
//!
//! There is no controller hierarchy: a controller is a rule value, an
//! `active` bit, and an actuator capability wired together by the
//! orchestrator.

pub mod actuator;
pub mod controller;
pub mod error;
pub mod rule;

pub use actuator::{Actuator, ActuatorError, LoggingActuator, SwitchActuator};
pub use controller::{gate, Controller, Decision};
pub use error::{ControlError, ControlResult};
pub use rule::{BandRule, Direction, Rule, ScheduleRule};
