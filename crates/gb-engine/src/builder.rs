//! Engine construction: resolving a validated configuration against
//! registered transports and actuator drivers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use gb_config::{validate_config, Config};
use gb_controls::{Actuator, Controller};
use gb_core::MetricsSink;
use gb_sensor::{PollConfig, ReadingCache, SensorTransport};

use crate::engine::{ControllerSlot, Engine, MonitorSlot, SensorSlot, Source};
use crate::error::{EngineError, EngineResult};

/// Wires configuration ids to concrete transports and actuator drivers.
///
/// The hardware side registers capabilities by id; `build` resolves
/// every string reference to an index once, so the tick loop never does
/// name lookups.
pub struct EngineBuilder {
    metrics: Arc<dyn MetricsSink>,
    transports: HashMap<String, Box<dyn SensorTransport>>,
    actuators: HashMap<String, Box<dyn Actuator>>,
}

impl EngineBuilder {
    pub fn new(metrics: Arc<dyn MetricsSink>) -> Self {
        Self {
            metrics,
            transports: HashMap::new(),
            actuators: HashMap::new(),
        }
    }

    /// Register the transport for a configured sensor id.
    pub fn transport(mut self, id: impl Into<String>, transport: Box<dyn SensorTransport>) -> Self {
        self.transports.insert(id.into(), transport);
        self
    }

    /// Register the actuator driver for a configured device name.
    pub fn actuator(mut self, device: impl Into<String>, actuator: Box<dyn Actuator>) -> Self {
        self.actuators.insert(device.into(), actuator);
        self
    }

    /// Validate the configuration and assemble the runtime.
    pub fn build(mut self, config: &Config) -> EngineResult<Engine> {
        validate_config(config)?;

        let mut sensors = Vec::with_capacity(config.sensors.len());
        let mut sensor_index = HashMap::new();
        for def in &config.sensors {
            let transport =
                self.transports
                    .remove(&def.id)
                    .ok_or_else(|| EngineError::MissingTransport {
                        id: def.id.clone(),
                    })?;
            let poll = PollConfig::new(
                Duration::from_secs_f64(def.poll_interval_seconds),
                Duration::from_secs_f64(def.read_timeout_seconds),
            );
            sensor_index.insert(def.id.clone(), sensors.len());
            sensors.push(SensorSlot {
                kind: def.kind,
                cache: ReadingCache::new(def.id.clone(), transport, poll),
            });
        }

        let monitors = config
            .monitors
            .iter()
            .map(|def| MonitorSlot {
                quantity: def.quantity.clone(),
                sensor: sensor_index[&def.sensor],
                channel: def.channel,
            })
            .collect();

        let mut controllers: Vec<ControllerSlot> = Vec::with_capacity(config.controllers.len());
        for def in &config.controllers {
            let actuator =
                self.actuators
                    .remove(&def.device)
                    .ok_or_else(|| EngineError::MissingActuator {
                        device: def.device.clone(),
                    })?;
            let source = resolve_source(&def.source, &sensor_index);
            // Validation guarantees the peer is declared earlier.
            let gated_by = def.gated_by.as_ref().map(|peer| {
                controllers
                    .iter()
                    .position(|slot| slot.controller.device() == peer)
                    .expect("validated gate peer")
            });
            controllers.push(ControllerSlot {
                controller: Controller::new(def.quantity.clone(), def.device.clone(), def.rule.to_rule()?),
                source,
                gated_by,
                actuator,
            });
        }

        let engine = Engine::assemble(
            Duration::from_secs_f64(config.tick_interval_seconds),
            sensors,
            monitors,
            controllers,
            self.metrics,
        );
        engine.emit_rule_gauges();
        Ok(engine)
    }
}

pub(crate) fn resolve_source(
    def: &gb_config::SourceDef,
    sensor_index: &HashMap<String, usize>,
) -> Source {
    match def {
        gb_config::SourceDef::Sensor { sensor, channel } => Source::Sensor {
            sensor: sensor_index[sensor],
            channel: *channel,
        },
        gb_config::SourceDef::HourOfDay => Source::HourOfDay,
    }
}
