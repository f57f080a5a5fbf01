//! gb-config: chamber configuration format, validation, and hot-reload
//! buffering.
//!
//! Configuration is an immutable value: parsed from YAML, validated once
//! at load/reload time, then consumed read-only by the engine. Every
//! structural error (negative band, dangling reference, gating cycle) is
//! rejected here, never mid-tick.

pub mod cell;
pub mod schema;
pub mod validate;

pub use cell::ConfigCell;
pub use schema::{Config, ControllerDef, MonitorDef, RuleDef, SensorDef, SourceDef};
pub use validate::{validate_config, ValidationError};

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Load and validate a chamber configuration from a YAML file.
pub fn load_yaml(path: &std::path::Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = serde_yaml::from_str(&content)?;
    validate_config(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_validate_full_config() {
        let yaml = r#"
tick_interval_seconds: 10.0
sensors:
  - id: scd41
    kind: scd41
    poll_interval_seconds: 5.0
    read_timeout_seconds: 120.0
monitors:
  - quantity: temp
    sensor: scd41
    channel: temp_c
controllers:
  - device: humidifier
    quantity: relative_humidity
    source:
      type: sensor
      sensor: scd41
      channel: relative_humidity_pct
    rule:
      type: band
      direction: above
      threshold: 80.0
      zero_energy_band: 2.0
  - device: exhaust_fan
    quantity: co2
    source:
      type: sensor
      sensor: scd41
      channel: co2_ppm
    rule:
      type: band
      direction: below
      threshold: 800.0
      zero_energy_band: 100.0
    gated_by: humidifier
  - device: lights
    quantity: hour_of_day
    source:
      type: hour_of_day
    rule:
      type: schedule
      active_hour_ranges: [[6, 22]]
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        validate_config(&config).unwrap();
        assert_eq!(config.sensors.len(), 1);
        assert_eq!(config.controllers.len(), 3);
        assert_eq!(config.controllers[1].gated_by.as_deref(), Some("humidifier"));
    }

    #[test]
    fn defaults_applied() {
        let yaml = r#"
sensors:
  - id: scd41
    kind: scd41
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.tick_interval_seconds, 10.0);
        assert_eq!(config.sensors[0].poll_interval_seconds, 5.0);
        assert_eq!(config.sensors[0].read_timeout_seconds, 120.0);
        assert!(config.monitors.is_empty());
        assert!(config.controllers.is_empty());
    }
}
