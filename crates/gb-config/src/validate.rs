//! Configuration validation logic.
//!
//! Everything rejected here is a load-time error; decision-time code
//! assumes a validated configuration and never re-checks.

use std::collections::HashSet;

use gb_core::SensorKind;

use crate::schema::{Config, ControllerDef, SensorDef, SourceDef};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("invalid value: {field} ({reason})")]
    InvalidValue { field: String, reason: String },

    /// A gating reference must point at a controller declared earlier,
    /// which also rules out cycles.
    #[error("controller '{device}' is gated by '{peer}', which is not declared before it")]
    GateOrdering { device: String, peer: String },
}

pub fn validate_config(config: &Config) -> Result<(), ValidationError> {
    require_positive(config.tick_interval_seconds, "tick_interval_seconds")?;

    let mut sensor_kinds = std::collections::HashMap::new();
    let mut sensor_ids = HashSet::new();
    for sensor in &config.sensors {
        if !sensor_ids.insert(&sensor.id) {
            return Err(ValidationError::DuplicateId {
                id: sensor.id.clone(),
                context: "sensors".to_string(),
            });
        }
        validate_sensor(sensor)?;
        sensor_kinds.insert(sensor.id.as_str(), sensor.kind);
    }

    for monitor in &config.monitors {
        let kind = lookup_sensor(&sensor_kinds, &monitor.sensor, "monitor sensor")?;
        require_channel(kind, monitor.channel, &monitor.sensor)?;
    }

    let mut devices: Vec<&str> = Vec::new();
    for controller in &config.controllers {
        if devices.contains(&controller.device.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: controller.device.clone(),
                context: "controllers".to_string(),
            });
        }
        validate_controller(controller, &sensor_kinds, &devices)?;
        devices.push(&controller.device);
    }

    Ok(())
}

fn validate_sensor(sensor: &SensorDef) -> Result<(), ValidationError> {
    require_positive(
        sensor.poll_interval_seconds,
        &format!("sensors[{}].poll_interval_seconds", sensor.id),
    )?;
    require_positive(
        sensor.read_timeout_seconds,
        &format!("sensors[{}].read_timeout_seconds", sensor.id),
    )?;
    Ok(())
}

fn validate_controller(
    controller: &ControllerDef,
    sensor_kinds: &std::collections::HashMap<&str, SensorKind>,
    earlier_devices: &[&str],
) -> Result<(), ValidationError> {
    if let SourceDef::Sensor { sensor, channel } = &controller.source {
        let kind = lookup_sensor(sensor_kinds, sensor, "controller source")?;
        require_channel(kind, *channel, sensor)?;
    }

    controller
        .rule
        .to_rule()
        .map_err(|err| ValidationError::InvalidValue {
            field: format!("controllers[{}].rule", controller.device),
            reason: err.to_string(),
        })?;

    if let Some(peer) = &controller.gated_by {
        if !earlier_devices.contains(&peer.as_str()) {
            return Err(ValidationError::GateOrdering {
                device: controller.device.clone(),
                peer: peer.clone(),
            });
        }
    }

    Ok(())
}

fn lookup_sensor(
    sensor_kinds: &std::collections::HashMap<&str, SensorKind>,
    id: &str,
    context: &str,
) -> Result<SensorKind, ValidationError> {
    sensor_kinds
        .get(id)
        .copied()
        .ok_or_else(|| ValidationError::MissingReference {
            id: id.to_string(),
            context: context.to_string(),
        })
}

fn require_channel(
    kind: SensorKind,
    channel: gb_core::Channel,
    sensor_id: &str,
) -> Result<(), ValidationError> {
    if kind.provides(channel) {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: format!("sensor '{sensor_id}' channel"),
            reason: format!("{kind} does not provide {channel}"),
        })
    }
}

fn require_positive(value: f64, field: &str) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.to_string(),
            reason: format!("must be positive and finite, got {value}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{MonitorDef, RuleDef};
    use gb_controls::Direction;
    use gb_core::Channel;

    fn scd41() -> SensorDef {
        SensorDef {
            id: "scd41".to_string(),
            kind: SensorKind::Scd41,
            poll_interval_seconds: 5.0,
            read_timeout_seconds: 120.0,
        }
    }

    fn band_controller(device: &str, gated_by: Option<&str>) -> ControllerDef {
        ControllerDef {
            device: device.to_string(),
            quantity: "co2".to_string(),
            source: SourceDef::Sensor {
                sensor: "scd41".to_string(),
                channel: Channel::Co2Ppm,
            },
            rule: RuleDef::Band {
                direction: Direction::Below,
                threshold: 800.0,
                zero_energy_band: 100.0,
            },
            gated_by: gated_by.map(str::to_string),
        }
    }

    fn config(controllers: Vec<ControllerDef>) -> Config {
        Config {
            tick_interval_seconds: 10.0,
            sensors: vec![scd41()],
            monitors: vec![],
            controllers,
        }
    }

    #[test]
    fn valid_config_passes() {
        validate_config(&config(vec![band_controller("exhaust_fan", None)])).unwrap();
    }

    #[test]
    fn negative_band_rejected_at_load() {
        let mut cfg = config(vec![band_controller("exhaust_fan", None)]);
        cfg.controllers[0].rule = RuleDef::Band {
            direction: Direction::Below,
            threshold: 800.0,
            zero_energy_band: -1.0,
        };
        assert!(matches!(
            validate_config(&cfg),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn duplicate_sensor_id_rejected() {
        let mut cfg = config(vec![]);
        cfg.sensors.push(scd41());
        assert!(matches!(
            validate_config(&cfg),
            Err(ValidationError::DuplicateId { .. })
        ));
    }

    #[test]
    fn duplicate_device_rejected() {
        let cfg = config(vec![
            band_controller("exhaust_fan", None),
            band_controller("exhaust_fan", None),
        ]);
        assert!(matches!(
            validate_config(&cfg),
            Err(ValidationError::DuplicateId { .. })
        ));
    }

    #[test]
    fn dangling_sensor_reference_rejected() {
        let mut cfg = config(vec![]);
        cfg.monitors.push(MonitorDef {
            quantity: "temp".to_string(),
            sensor: "aht20".to_string(),
            channel: Channel::TempC,
        });
        assert!(matches!(
            validate_config(&cfg),
            Err(ValidationError::MissingReference { .. })
        ));
    }

    #[test]
    fn channel_not_provided_by_kind_rejected() {
        let mut cfg = config(vec![]);
        cfg.sensors[0].kind = SensorKind::Aht20;
        cfg.monitors.push(MonitorDef {
            quantity: "co2".to_string(),
            sensor: "scd41".to_string(),
            channel: Channel::Co2Ppm,
        });
        assert!(matches!(
            validate_config(&cfg),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn gate_must_reference_earlier_controller() {
        // Peer declared after the gated controller.
        let cfg = config(vec![
            band_controller("exhaust_fan", Some("humidifier")),
            band_controller("humidifier", None),
        ]);
        assert!(matches!(
            validate_config(&cfg),
            Err(ValidationError::GateOrdering { .. })
        ));
    }

    #[test]
    fn self_gating_rejected() {
        let cfg = config(vec![band_controller("exhaust_fan", Some("exhaust_fan"))]);
        assert!(matches!(
            validate_config(&cfg),
            Err(ValidationError::GateOrdering { .. })
        ));
    }

    #[test]
    fn gate_referencing_earlier_controller_passes() {
        let cfg = config(vec![
            band_controller("humidifier", None),
            band_controller("exhaust_fan", Some("humidifier")),
        ]);
        validate_config(&cfg).unwrap();
    }

    #[test]
    fn zero_tick_interval_rejected() {
        let mut cfg = config(vec![]);
        cfg.tick_interval_seconds = 0.0;
        assert!(matches!(
            validate_config(&cfg),
            Err(ValidationError::InvalidValue { .. })
        ));
    }
}
