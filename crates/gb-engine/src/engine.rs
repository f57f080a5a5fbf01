//! The control engine and its tick cycle.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::Timelike;
use gb_config::{validate_config, Config, ConfigCell};
use gb_controls::{gate, Actuator, Controller, Rule};
use gb_core::metrics::{
    DEVICE_ACTIVE, DEVICE_GATED, DEVICE_THRESHOLD, DEVICE_ZERO_ENERGY_BAND, MEASURE_VALUE,
};
use gb_core::{Channel, MetricsSink, SensorKind};
use gb_sensor::{PollConfig, ReadingCache, SensorResult};
use tracing::{debug, info, warn};

use crate::builder::resolve_source;
use crate::error::{EngineError, EngineResult};

/// One physical sensor: its kind plus the cache that owns its snapshot.
pub(crate) struct SensorSlot {
    pub(crate) kind: SensorKind,
    pub(crate) cache: ReadingCache,
}

/// Read-only quantity observer bound to a cache and channel.
pub(crate) struct MonitorSlot {
    pub(crate) quantity: String,
    pub(crate) sensor: usize,
    pub(crate) channel: Channel,
}

/// Where a controller's measure value comes from.
pub(crate) enum Source {
    Sensor { sensor: usize, channel: Channel },
    HourOfDay,
}

/// One controlled device with its value source, optional gating peer
/// (an index of an earlier controller), and actuator driver.
pub(crate) struct ControllerSlot {
    pub(crate) controller: Controller,
    pub(crate) source: Source,
    pub(crate) gated_by: Option<usize>,
    pub(crate) actuator: Box<dyn Actuator>,
}

/// Single-threaded control loop state.
///
/// All caches and controller bits are owned here and touched only inside
/// [`Engine::tick`]; the sole cross-thread objects are the stop flag and
/// the [`ConfigCell`] consumed at tick boundaries.
pub struct Engine {
    tick_interval: Duration,
    sensors: Vec<SensorSlot>,
    monitors: Vec<MonitorSlot>,
    controllers: Vec<ControllerSlot>,
    metrics: Arc<dyn MetricsSink>,
    ticks: u64,
}

impl Engine {
    pub(crate) fn assemble(
        tick_interval: Duration,
        sensors: Vec<SensorSlot>,
        monitors: Vec<MonitorSlot>,
        controllers: Vec<ControllerSlot>,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            tick_interval,
            sensors,
            monitors,
            controllers,
            metrics,
            ticks: 0,
        }
    }

    /// Number of completed ticks.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Stored `active` bit of a controller, by device name.
    pub fn controller_active(&self, device: &str) -> Option<bool> {
        self.controllers
            .iter()
            .find(|slot| slot.controller.device() == device)
            .map(|slot| slot.controller.active())
    }

    /// Run one complete cycle: refresh, observe, decide, actuate.
    pub fn tick(&mut self) {
        // Refresh every distinct sensor exactly once. A timeout is not
        // fatal: consumers bound to that sensor hold their last state.
        for slot in &mut self.sensors {
            if let Err(err) = slot.cache.refresh() {
                warn!(sensor = %slot.cache.id(), error = %err, "sensor refresh failed");
            }
        }

        for monitor in &self.monitors {
            match self.sensors[monitor.sensor].cache.read(monitor.channel) {
                Ok(value) => {
                    self.metrics
                        .observe(MEASURE_VALUE, &[("measure", &monitor.quantity)], value);
                    info!(measure = %monitor.quantity, value, "observed");
                }
                Err(err) => {
                    warn!(measure = %monitor.quantity, error = %err, "failed to read measure");
                }
            }
        }

        for i in 0..self.controllers.len() {
            self.evaluate_controller(i);
        }

        self.ticks += 1;
    }

    /// Run the steady-state loop until `stop` is set or `max_ticks`
    /// completes, applying any pending configuration at tick boundaries.
    pub fn run(&mut self, stop: &AtomicBool, reload: &ConfigCell, max_ticks: Option<u64>) {
        while !stop.load(Ordering::Relaxed) {
            self.tick();
            if let Some(max) = max_ticks {
                if self.ticks >= max {
                    break;
                }
            }
            self.sleep_until_boundary(stop);
            if let Some(config) = reload.take() {
                match self.apply_config(&config) {
                    Ok(()) => info!("applied reloaded configuration"),
                    Err(err) => {
                        warn!(error = %err, "rejected reloaded configuration, keeping previous")
                    }
                }
            }
        }
    }

    /// Sleep out the tick interval in short slices so a stop request is
    /// honored promptly.
    fn sleep_until_boundary(&self, stop: &AtomicBool) {
        let slice = Duration::from_millis(100);
        let mut remaining = self.tick_interval;
        while remaining > Duration::ZERO && !stop.load(Ordering::Relaxed) {
            let nap = remaining.min(slice);
            thread::sleep(nap);
            remaining -= nap;
        }
    }

    fn evaluate_controller(&mut self, index: usize) {
        let value = match self.source_value(&self.controllers[index].source) {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    measure = %self.controllers[index].controller.quantity(),
                    error = %err,
                    "failed to read a new measure value, remaining in current state"
                );
                return;
            }
        };

        let slot = &self.controllers[index];
        self.metrics.observe(
            MEASURE_VALUE,
            &[("measure", slot.controller.quantity())],
            value,
        );
        info!(measure = %slot.controller.quantity(), value, "observed");

        let base = slot.controller.evaluate(value);
        let peer_decision = slot.gated_by.and_then(|peer| self.peer_decision(peer));
        let decision = gate(base, peer_decision);

        if decision.suppressed {
            debug!(
                device = %slot.controller.device(),
                "waiting to activate, but suppressed while gating peer runs"
            );
        }
        if slot.gated_by.is_some() {
            self.metrics.observe(
                DEVICE_GATED,
                &[
                    ("device", slot.controller.device()),
                    ("measure", slot.controller.quantity()),
                ],
                if decision.suppressed { 1.0 } else { 0.0 },
            );
        }
        self.metrics.observe(
            DEVICE_ACTIVE,
            &[
                ("device", slot.controller.device()),
                ("measure", slot.controller.quantity()),
            ],
            if decision.active { 1.0 } else { 0.0 },
        );

        let slot = &mut self.controllers[index];
        if let Err(err) = slot.controller.apply(decision, slot.actuator.as_mut()) {
            warn!(
                device = %slot.controller.device(),
                error = %err,
                "actuator write failed, state unchanged; will retry next tick"
            );
        }
    }

    /// The gating peer's decision against its own most recent reading.
    /// `None` when the peer's value source cannot be read this tick.
    fn peer_decision(&self, peer: usize) -> Option<gb_controls::Decision> {
        let slot = &self.controllers[peer];
        let value = self.source_value(&slot.source).ok()?;
        Some(slot.controller.evaluate(value))
    }

    fn source_value(&self, source: &Source) -> SensorResult<f64> {
        match source {
            Source::Sensor { sensor, channel } => self.sensors[*sensor].cache.read(*channel),
            Source::HourOfDay => Ok(f64::from(chrono::Local::now().hour())),
        }
    }

    /// Export threshold and band gauges for every band-ruled device.
    /// Called at build time and again after each reconfiguration.
    pub(crate) fn emit_rule_gauges(&self) {
        for slot in &self.controllers {
            if let Rule::Band(band) = slot.controller.rule() {
                let labels = [
                    ("device", slot.controller.device()),
                    ("measure", slot.controller.quantity()),
                    ("target", band.direction.as_str()),
                ];
                self.metrics
                    .observe(DEVICE_THRESHOLD, &labels, band.threshold);
                self.metrics
                    .observe(DEVICE_ZERO_ENERGY_BAND, &labels, band.band);
            }
        }
    }

    /// Apply a complete replacement configuration between ticks.
    ///
    /// Parameters (rules, poll intervals, tick interval, monitor
    /// bindings) change in place; controller `active` bits and cached
    /// readings survive. A change to the sensor or device topology is
    /// rejected wholesale and the previous configuration stays in force.
    pub fn apply_config(&mut self, config: &Config) -> EngineResult<()> {
        validate_config(config)?;

        if config.sensors.len() != self.sensors.len() {
            return Err(EngineError::TopologyChanged {
                what: format!(
                    "sensor count {} -> {}",
                    self.sensors.len(),
                    config.sensors.len()
                ),
            });
        }
        for (slot, def) in self.sensors.iter().zip(&config.sensors) {
            if slot.cache.id() != def.id || slot.kind != def.kind {
                return Err(EngineError::TopologyChanged {
                    what: format!("sensor '{}' replaced by '{}'", slot.cache.id(), def.id),
                });
            }
        }

        if config.controllers.len() != self.controllers.len() {
            return Err(EngineError::TopologyChanged {
                what: format!(
                    "controller count {} -> {}",
                    self.controllers.len(),
                    config.controllers.len()
                ),
            });
        }
        for (slot, def) in self.controllers.iter().zip(&config.controllers) {
            if slot.controller.device() != def.device {
                return Err(EngineError::TopologyChanged {
                    what: format!(
                        "device '{}' replaced by '{}'",
                        slot.controller.device(),
                        def.device
                    ),
                });
            }
        }

        // Construct every new rule before mutating anything, so a bad
        // rule cannot leave the engine half-reconfigured.
        let mut rules = Vec::with_capacity(config.controllers.len());
        for def in &config.controllers {
            rules.push(def.rule.to_rule()?);
        }

        let sensor_index: HashMap<String, usize> = self
            .sensors
            .iter()
            .enumerate()
            .map(|(i, slot)| (slot.cache.id().to_string(), i))
            .collect();

        for (slot, def) in self.sensors.iter_mut().zip(&config.sensors) {
            slot.cache.set_poll(PollConfig::new(
                Duration::from_secs_f64(def.poll_interval_seconds),
                Duration::from_secs_f64(def.read_timeout_seconds),
            ));
        }

        self.monitors = config
            .monitors
            .iter()
            .map(|def| MonitorSlot {
                quantity: def.quantity.clone(),
                sensor: sensor_index[&def.sensor],
                channel: def.channel,
            })
            .collect();

        for ((slot, def), rule) in self.controllers.iter_mut().zip(&config.controllers).zip(rules) {
            slot.controller.set_rule(rule);
            slot.source = resolve_source(&def.source, &sensor_index);
            slot.gated_by = def.gated_by.as_ref().map(|peer| {
                config
                    .controllers
                    .iter()
                    .position(|c| &c.device == peer)
                    .expect("validated gate peer")
            });
        }

        self.tick_interval = Duration::from_secs_f64(config.tick_interval_seconds);
        self.emit_rule_gauges();
        Ok(())
    }
}
