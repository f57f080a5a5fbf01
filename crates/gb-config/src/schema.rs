//! Configuration schema definitions.

use gb_core::{Channel, SensorKind};
use gb_controls::{BandRule, ControlResult, Direction, Rule, ScheduleRule};
use serde::{Deserialize, Serialize};

/// Complete chamber configuration. Replaced wholesale on reload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Fixed interval between orchestrator ticks.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_seconds: f64,
    pub sensors: Vec<SensorDef>,
    #[serde(default)]
    pub monitors: Vec<MonitorDef>,
    #[serde(default)]
    pub controllers: Vec<ControllerDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SensorDef {
    pub id: String,
    pub kind: SensorKind,
    /// How often to poll the sensor for a fresh reading upon request.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: f64,
    #[serde(default = "default_read_timeout")]
    pub read_timeout_seconds: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitorDef {
    /// Human-readable measure name used as the metric label.
    pub quantity: String,
    pub sensor: String,
    pub channel: Channel,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ControllerDef {
    /// Human-readable name of the toggled device; unique per config.
    pub device: String,
    /// Human-readable measure name used as the metric label.
    pub quantity: String,
    pub source: SourceDef,
    pub rule: RuleDef,
    /// Device name of the peer controller whose activity suppresses this
    /// one. Must be declared earlier in the list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gated_by: Option<String>,
}

/// Where a controller's measure value comes from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceDef {
    Sensor { sensor: String, channel: Channel },
    HourOfDay,
}

/// Decision rule definition, using the configuration vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleDef {
    Band {
        direction: Direction,
        threshold: f64,
        /// How far past the threshold the value must get before the
        /// device activates. Nonzero values stop the device rapidly
        /// cycling around its threshold.
        #[serde(default)]
        zero_energy_band: f64,
    },
    Schedule {
        active_hour_ranges: Vec<(u32, u32)>,
    },
}

impl RuleDef {
    /// Build the runtime rule, running the rule constructors'
    /// validation.
    pub fn to_rule(&self) -> ControlResult<Rule> {
        match self {
            RuleDef::Band {
                direction,
                threshold,
                zero_energy_band,
            } => Ok(Rule::Band(BandRule::new(
                *threshold,
                *direction,
                *zero_energy_band,
            )?)),
            RuleDef::Schedule { active_hour_ranges } => Ok(Rule::Schedule(ScheduleRule::new(
                active_hour_ranges.clone(),
            )?)),
        }
    }
}

fn default_tick_interval() -> f64 {
    10.0
}

fn default_poll_interval() -> f64 {
    5.0
}

fn default_read_timeout() -> f64 {
    120.0
}
