//! Simulated chamber transport.
//!
//! A deterministic first-order model of the grow chamber, used by the CLI
//! and integration tests in place of real hardware. Actuator state is
//! shared through plain `Arc<AtomicBool>` switches so the controller side
//! can flip them without depending on this crate's internals.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use gb_core::{Channel, SensorKind};

use crate::reading::Reading;
use crate::transport::SensorTransport;

/// Physical state of the simulated chamber.
///
/// Humidity relaxes toward 95% while the fogger runs, toward ambient 40%
/// otherwise. CO2 is produced continuously by the substrate and vented
/// toward ambient 420 ppm while the exhaust runs. Temperature relaxes
/// slowly toward ambient.
#[derive(Debug)]
pub struct ChamberState {
    pub co2_ppm: f64,
    pub rh_pct: f64,
    pub temp_c: f64,
    humidifier_on: Arc<AtomicBool>,
    exhaust_on: Arc<AtomicBool>,
}

const AMBIENT_CO2_PPM: f64 = 420.0;
const AMBIENT_RH_PCT: f64 = 40.0;
const AMBIENT_TEMP_C: f64 = 21.0;
const FOG_RH_PCT: f64 = 95.0;
const CO2_PRODUCTION_PPM_PER_S: f64 = 2.0;

impl ChamberState {
    pub fn new(humidifier_on: Arc<AtomicBool>, exhaust_on: Arc<AtomicBool>) -> Self {
        Self {
            co2_ppm: AMBIENT_CO2_PPM,
            rh_pct: AMBIENT_RH_PCT,
            temp_c: AMBIENT_TEMP_C,
            humidifier_on,
            exhaust_on,
        }
    }

    /// Advance the chamber dynamics by `dt_s` seconds of simulated time.
    pub fn step(&mut self, dt_s: f64) {
        let rh_target = if self.humidifier_on.load(Ordering::Relaxed) {
            FOG_RH_PCT
        } else {
            AMBIENT_RH_PCT
        };
        // First-order relaxation, explicit Euler.
        self.rh_pct += (rh_target - self.rh_pct) / 60.0 * dt_s;

        self.co2_ppm += CO2_PRODUCTION_PPM_PER_S * dt_s;
        if self.exhaust_on.load(Ordering::Relaxed) {
            self.co2_ppm += (AMBIENT_CO2_PPM - self.co2_ppm) / 30.0 * dt_s;
        }

        self.temp_c += (AMBIENT_TEMP_C - self.temp_c) / 600.0 * dt_s;
    }

    fn value(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Co2Ppm => self.co2_ppm,
            Channel::RelativeHumidityPct => self.rh_pct,
            Channel::TempC => self.temp_c,
        }
    }
}

/// Transport serving one simulated sensor attached to a shared chamber.
///
/// Always data-ready; each sample advances the shared dynamics by the
/// configured timestep and snapshots the channels of the sensor kind.
pub struct SimulatedChamber {
    state: Arc<Mutex<ChamberState>>,
    kind: SensorKind,
    dt_s: f64,
}

impl SimulatedChamber {
    pub fn new(state: Arc<Mutex<ChamberState>>, kind: SensorKind, dt_s: f64) -> Self {
        Self { state, kind, dt_s }
    }
}

impl SensorTransport for SimulatedChamber {
    fn data_ready(&mut self) -> bool {
        true
    }

    fn sample(&mut self) -> Reading {
        let mut state = self.state.lock().expect("chamber lock poisoned");
        state.step(self.dt_s);
        let values: Vec<(Channel, f64)> = self
            .kind
            .channels()
            .iter()
            .map(|ch| (*ch, state.value(*ch)))
            .collect();
        Reading::new(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chamber() -> (Arc<Mutex<ChamberState>>, Arc<AtomicBool>, Arc<AtomicBool>) {
        let humidifier = Arc::new(AtomicBool::new(false));
        let exhaust = Arc::new(AtomicBool::new(false));
        let state = Arc::new(Mutex::new(ChamberState::new(
            humidifier.clone(),
            exhaust.clone(),
        )));
        (state, humidifier, exhaust)
    }

    #[test]
    fn humidity_rises_while_fogger_runs() {
        let (state, humidifier, _) = chamber();
        humidifier.store(true, Ordering::Relaxed);
        let before = state.lock().unwrap().rh_pct;
        for _ in 0..100 {
            state.lock().unwrap().step(10.0);
        }
        assert!(state.lock().unwrap().rh_pct > before);
        assert!(state.lock().unwrap().rh_pct <= FOG_RH_PCT);
    }

    #[test]
    fn co2_accumulates_without_exhaust() {
        let (state, _, _) = chamber();
        let before = state.lock().unwrap().co2_ppm;
        state.lock().unwrap().step(60.0);
        assert!(state.lock().unwrap().co2_ppm > before);
    }

    #[test]
    fn exhaust_pulls_co2_toward_ambient() {
        let (state, _, exhaust) = chamber();
        state.lock().unwrap().co2_ppm = 1200.0;
        exhaust.store(true, Ordering::Relaxed);
        for _ in 0..100 {
            state.lock().unwrap().step(10.0);
        }
        let co2 = state.lock().unwrap().co2_ppm;
        assert!(co2 < 1200.0);
    }

    #[test]
    fn scd41_sample_carries_all_channels() {
        let (state, _, _) = chamber();
        let mut transport = SimulatedChamber::new(state, SensorKind::Scd41, 1.0);
        assert!(transport.data_ready());
        let reading = transport.sample();
        assert!(reading.get(Channel::Co2Ppm).is_some());
        assert!(reading.get(Channel::RelativeHumidityPct).is_some());
        assert!(reading.get(Channel::TempC).is_some());
    }

    #[test]
    fn aht20_sample_has_no_co2() {
        let (state, _, _) = chamber();
        let mut transport = SimulatedChamber::new(state, SensorKind::Aht20, 1.0);
        let reading = transport.sample();
        assert!(reading.get(Channel::Co2Ppm).is_none());
        assert!(reading.get(Channel::TempC).is_some());
    }
}
