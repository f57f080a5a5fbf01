//! Pure decision rules.
//!
//! A rule answers one question: given the current `active` state and a
//! measure value, should the device be active? Rules carry no mutable
//! state and no side effects; the orchestrator owns the state bit.

use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};

/// Which side of the threshold the measure must stay on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Keep the measure at or above the threshold; a deficit activates
    /// the device (e.g. humidity below minimum turns the fogger on).
    Above,
    /// Keep the measure at or below the threshold; an excess activates
    /// the device (e.g. CO2 above maximum turns the exhaust on).
    Below,
}

impl Direction {
    /// Stable snake_case name, matching the serde representation. Used
    /// as the `target` metric label.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Above => "above",
            Direction::Below => "below",
        }
    }
}

/// Hysteresis band around a threshold.
///
/// When inactive, the measure must overshoot the threshold by at least
/// the zero-energy band before the device switches on, so sensor noise
/// near the boundary cannot make it cycle rapidly. When active, the
/// device switches off as soon as the bare threshold is crossed back:
/// the band guards only the activation edge, letting the device run
/// slightly past the setpoint on the way back rather than chatter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandRule {
    /// Value at which the device activates/deactivates.
    pub threshold: f64,
    /// Side of the threshold the measure should stay on.
    pub direction: Direction,
    /// Zero-energy band width, `>= 0`. Enforced at construction, never
    /// re-checked at decision time.
    pub band: f64,
}

impl BandRule {
    /// Create a band rule.
    ///
    /// # Errors
    ///
    /// Rejects a negative or non-finite band and a non-finite threshold.
    pub fn new(threshold: f64, direction: Direction, band: f64) -> ControlResult<Self> {
        if !threshold.is_finite() {
            return Err(ControlError::InvalidArg {
                what: "threshold must be finite",
            });
        }
        if !band.is_finite() || band < 0.0 {
            return Err(ControlError::InvalidArg {
                what: "zero-energy band must be finite and non-negative",
            });
        }
        Ok(Self {
            threshold,
            direction,
            band,
        })
    }

    /// Whether the device should be active for `value`, given the
    /// current state.
    ///
    /// Comparisons are strict: a value exactly equal to the threshold
    /// (or threshold ± band) never causes a transition.
    pub fn should_be_active(&self, active: bool, value: f64) -> bool {
        if active {
            // Already active: turn back off once past the bare threshold.
            match self.direction {
                Direction::Below => value > self.threshold,
                Direction::Above => value < self.threshold,
            }
        } else {
            // Inactive: don't activate until past the threshold by at
            // least the zero-energy band.
            match self.direction {
                Direction::Below => value > self.threshold + self.band,
                Direction::Above => value < self.threshold - self.band,
            }
        }
    }
}

/// Hour-of-day schedule for devices like lights.
///
/// Active while the local hour falls in any `[start, end)` range. A
/// range wrapping midnight is expressed as two entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRule {
    pub active_hour_ranges: Vec<(u32, u32)>,
}

impl ScheduleRule {
    /// Create a schedule rule.
    ///
    /// # Errors
    ///
    /// Each range must satisfy `start < end <= 24`.
    pub fn new(active_hour_ranges: Vec<(u32, u32)>) -> ControlResult<Self> {
        for &(start, end) in &active_hour_ranges {
            if start >= end || end > 24 {
                return Err(ControlError::InvalidArg {
                    what: "schedule range must satisfy start < end <= 24",
                });
            }
        }
        Ok(Self { active_hour_ranges })
    }

    /// Whether `hour` (0-23) lies in any configured range.
    pub fn contains_hour(&self, hour: u32) -> bool {
        self.active_hour_ranges
            .iter()
            .any(|&(start, end)| hour >= start && hour < end)
    }
}

/// Decision function variants a controller can be configured with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Rule {
    Band(BandRule),
    Schedule(ScheduleRule),
}

impl Rule {
    /// Whether the device should be active for `value`, given the
    /// current state.
    ///
    /// For schedule rules the value is the hour of day; the current
    /// state is irrelevant.
    pub fn should_be_active(&self, active: bool, value: f64) -> bool {
        match self {
            Rule::Band(band) => band.should_be_active(active, value),
            Rule::Schedule(schedule) => schedule.contains_hour(value as u32),
        }
    }
}
