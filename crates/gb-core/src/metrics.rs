//! Metrics sink trait and labeled gauge registry.
//!
//! The control engine emits named, labeled numeric observations; how they
//! are exposed (pull endpoint, push, format) belongs to an external
//! transport. `GaugeRegistry` is the in-process implementation: last-value
//! gauges keyed by name + label set, with a snapshot API and a
//! Prometheus-style text rendering for exporters to serve.
//!
//! Handles are passed explicitly into the components that observe; there
//! are no process-wide singletons.

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::Serialize;

/// Reported value for a measure. Labels: `measure`.
pub const MEASURE_VALUE: &str = "measure_value";
/// Whether a device managing a measure is active. Labels: `device`, `measure`.
pub const DEVICE_ACTIVE: &str = "device_active";
/// The measure threshold at which a device activates/deactivates.
/// Labels: `device`, `measure`, `target`.
pub const DEVICE_THRESHOLD: &str = "device_threshold";
/// Width of the zero-energy band guarding activation.
/// Labels: `device`, `measure`, `target`.
pub const DEVICE_ZERO_ENERGY_BAND: &str = "device_zero_energy_band";
/// Whether a device's activation is currently suppressed by its gating
/// peer. Labels: `device`, `measure`.
pub const DEVICE_GATED: &str = "device_gated";

/// Capability to record one named, labeled numeric observation.
pub trait MetricsSink: Send + Sync {
    /// Record `value` for the gauge `name` with the given label pairs.
    fn observe(&self, name: &str, labels: &[(&str, &str)], value: f64);
}

/// Sink that discards every observation. Useful in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl MetricsSink for NullSink {
    fn observe(&self, _name: &str, _labels: &[(&str, &str)], _value: f64) {}
}

/// One gauge sample from a registry snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaugeSample {
    pub name: String,
    pub labels: Vec<(String, String)>,
    pub value: f64,
}

/// Last-value gauge store keyed by metric name and label set.
#[derive(Debug, Default)]
pub struct GaugeRegistry {
    // BTreeMap keeps snapshot/render output deterministically ordered.
    gauges: Mutex<BTreeMap<GaugeKey, f64>>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct GaugeKey {
    name: String,
    labels: Vec<(String, String)>,
}

impl GaugeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a gauge, if it has ever been observed.
    pub fn get(&self, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
        let key = GaugeKey {
            name: name.to_string(),
            labels: labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        };
        self.gauges.lock().expect("gauge lock poisoned").get(&key).copied()
    }

    /// Ordered snapshot of every gauge.
    pub fn snapshot(&self) -> Vec<GaugeSample> {
        self.gauges
            .lock()
            .expect("gauge lock poisoned")
            .iter()
            .map(|(key, value)| GaugeSample {
                name: key.name.clone(),
                labels: key.labels.clone(),
                value: *value,
            })
            .collect()
    }

    /// Render gauges in the Prometheus text exposition format.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for sample in self.snapshot() {
            out.push_str(&sample.name);
            if !sample.labels.is_empty() {
                out.push('{');
                for (i, (k, v)) in sample.labels.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push_str(k);
                    out.push_str("=\"");
                    out.push_str(v);
                    out.push('"');
                }
                out.push('}');
            }
            out.push(' ');
            out.push_str(&format!("{}", sample.value));
            out.push('\n');
        }
        out
    }
}

impl MetricsSink for GaugeRegistry {
    fn observe(&self, name: &str, labels: &[(&str, &str)], value: f64) {
        let key = GaugeKey {
            name: name.to_string(),
            labels: labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        };
        self.gauges.lock().expect("gauge lock poisoned").insert(key, value);
    }
}
