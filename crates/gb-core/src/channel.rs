//! Measurement channel identifiers and sensor kinds.
//!
//! A channel names one scalar quantity a physical sensor reports. Each
//! sensor kind documents the channel set it samples atomically; binding a
//! consumer to a channel its sensor does not provide is a configuration
//! error caught at load time, never at read time.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Identifier for one scalar measurement channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Carbon dioxide concentration in parts per million.
    Co2Ppm,
    /// Relative humidity on the 0-100 scale.
    RelativeHumidityPct,
    /// Temperature in degrees Celsius.
    TempC,
}

impl Channel {
    /// Stable snake_case name, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Co2Ppm => "co2_ppm",
            Channel::RelativeHumidityPct => "relative_humidity_pct",
            Channel::TempC => "temp_c",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported physical sensor models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    /// Sensirion SCD41: CO2 + relative humidity + temperature.
    Scd41,
    /// ASAIR AHT20: relative humidity + temperature.
    Aht20,
}

impl SensorKind {
    /// The channels one poll of this sensor samples in a single
    /// hardware transaction.
    pub fn channels(self) -> &'static [Channel] {
        match self {
            SensorKind::Scd41 => &[
                Channel::Co2Ppm,
                Channel::RelativeHumidityPct,
                Channel::TempC,
            ],
            SensorKind::Aht20 => &[Channel::RelativeHumidityPct, Channel::TempC],
        }
    }

    /// Whether this sensor kind reports the given channel.
    pub fn provides(self, channel: Channel) -> bool {
        self.channels().contains(&channel)
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorKind::Scd41 => f.write_str("scd41"),
            SensorKind::Aht20 => f.write_str("aht20"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_names_are_stable() {
        assert_eq!(Channel::Co2Ppm.as_str(), "co2_ppm");
        assert_eq!(Channel::RelativeHumidityPct.as_str(), "relative_humidity_pct");
        assert_eq!(Channel::TempC.as_str(), "temp_c");
    }

    #[test]
    fn channel_serde_matches_as_str() {
        for ch in [Channel::Co2Ppm, Channel::RelativeHumidityPct, Channel::TempC] {
            let yaml = serde_yaml::to_string(&ch).unwrap();
            assert_eq!(yaml.trim(), ch.as_str());
        }
    }

    #[test]
    fn scd41_provides_all_three_channels() {
        assert!(SensorKind::Scd41.provides(Channel::Co2Ppm));
        assert!(SensorKind::Scd41.provides(Channel::RelativeHumidityPct));
        assert!(SensorKind::Scd41.provides(Channel::TempC));
    }

    #[test]
    fn aht20_has_no_co2_channel() {
        assert!(!SensorKind::Aht20.provides(Channel::Co2Ppm));
        assert!(SensorKind::Aht20.provides(Channel::TempC));
    }
}
