//! gb-engine: the tick orchestrator.
//!
//! Drives the fixed-interval control cycle: refresh every distinct
//! sensor once, evaluate every monitor, evaluate every controller in
//! declared order (gating peers first), then sleep until the next tick
//! boundary. A pending hot-reloaded configuration is swapped in only at
//! the boundary; an in-flight tick always finishes with the
//! configuration it started with.
//!
//! All per-sensor and per-controller failures are caught and logged
//! here; no single failing component aborts the tick for the others,
//! and nothing terminates the process.

pub mod builder;
pub mod engine;
pub mod error;

pub use builder::EngineBuilder;
pub use engine::Engine;
pub use error::{EngineError, EngineResult};
